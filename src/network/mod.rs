//! Host Interface
//!
//! Request decoding, method routing and the line-oriented driver.
//! The game core never sees JSON; everything here translates to and from it.

pub mod dispatch;
pub mod protocol;
pub mod server;

pub use dispatch::{Dispatcher, DispatchError};
pub use protocol::{
    AdvanceRequest, AdvanceResponse, ArenaRequest, InspectResponse, Output,
    ServerRequest, ServerResponse, Status,
};
pub use server::{ArenaServer, ServerConfig, ServerError};
