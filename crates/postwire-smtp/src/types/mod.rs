//! Core SMTP types.

mod address;
mod capabilities;
mod reply;

pub use address::wrap_address;
pub use capabilities::Capabilities;
pub use reply::{Reply, ReplyCode};
