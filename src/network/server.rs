//! Line-Oriented Request Driver
//!
//! Reads one JSON request per line and writes one JSON response per line.
//! Requests are handled in arrival order; the host is responsible for
//! authenticating senders and delivering each message exactly once.

use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};
use tracing::{debug, info, instrument, warn};

use crate::network::dispatch::Dispatcher;
use crate::network::protocol::{ServerRequest, ServerResponse};
use crate::proof::commitment::DEFAULT_MAX_NONCE_LEN;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Maximum nonce length in bytes.
    pub max_nonce_len: usize,
    /// Longer request lines are refused without parsing.
    pub max_request_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_nonce_len: DEFAULT_MAX_NONCE_LEN,
            max_request_bytes: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_nonce_len: env_usize("ARENA_MAX_NONCE_LEN").unwrap_or(defaults.max_nonce_len),
            max_request_bytes: env_usize("ARENA_MAX_REQUEST_BYTES")
                .unwrap_or(defaults.max_request_bytes),
        }
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Driver errors. Only I/O on the streams is fatal.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Reading or writing a stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A response could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The request driver.
pub struct ArenaServer {
    /// Server configuration.
    config: ServerConfig,
    /// Request router.
    dispatcher: Arc<Dispatcher>,
}

impl ArenaServer {
    /// Create a new server with an empty registry.
    pub fn new(config: ServerConfig) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(config.max_nonce_len));
        Self { config, dispatcher }
    }

    /// Shared handle to the dispatcher.
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.clone()
    }

    /// Serve until `reader` reaches end of input.
    ///
    /// Never buffers more than one request's worth of input: an oversized
    /// line is answered with an error and skipped up to its newline.
    /// Returns the number of lines answered.
    #[instrument(skip_all)]
    pub async fn run<R, W>(&self, mut reader: R, mut writer: W) -> Result<u64, ServerError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Arena server accepting requests");
        let mut codec = LinesCodec::new_with_max_length(self.config.max_request_bytes);
        let mut buf = BytesMut::with_capacity(8 * 1024);
        let mut eof = false;
        let mut handled = 0u64;

        loop {
            let frame = if eof {
                codec.decode_eof(&mut buf)
            } else {
                codec.decode(&mut buf)
            };

            let response = match frame {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    self.handle_line(line).await
                }
                Ok(None) if eof => break,
                Ok(None) => {
                    if reader.read_buf(&mut buf).await? == 0 {
                        eof = true;
                    }
                    continue;
                }
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    warn!("Request exceeds {} byte limit", self.config.max_request_bytes);
                    self.oversized()
                }
                // Reads happen above, so this is a bad line, not a broken stream
                Err(LinesCodecError::Io(e)) => {
                    debug!("Unreadable request line: {}", e);
                    ServerResponse::Error {
                        message: format!("invalid request: {}", e),
                    }
                }
            };

            let mut text = response.to_json()?;
            text.push('\n');
            writer.write_all(text.as_bytes()).await?;
            writer.flush().await?;
            handled += 1;
        }

        info!("Input closed after {} requests", handled);
        Ok(handled)
    }

    fn oversized(&self) -> ServerResponse {
        ServerResponse::Error {
            message: format!(
                "request exceeds limit of {} bytes",
                self.config.max_request_bytes
            ),
        }
    }

    /// Turn one input line into one response.
    pub async fn handle_line(&self, line: &str) -> ServerResponse {
        if line.len() > self.config.max_request_bytes {
            warn!("Request of {} bytes exceeds limit", line.len());
            return self.oversized();
        }

        let request = match ServerRequest::from_json(line) {
            Ok(r) => r,
            Err(e) => {
                debug!("Invalid request line: {}", e);
                return ServerResponse::Error {
                    message: format!("invalid request: {}", e),
                };
            }
        };

        match request {
            ServerRequest::Advance(req) => ServerResponse::Advance(self.dispatcher.advance(req).await),
            ServerRequest::Inspect(_) => match self.dispatcher.inspect().await {
                Ok(resp) => ServerResponse::Inspect(resp),
                Err(e) => ServerResponse::Error { message: e.to_string() },
            },
        }
    }
}
