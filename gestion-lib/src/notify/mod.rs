//! Notification channel.
//!
//! A [`NotificationClient`] keeps one WebSocket open in a background task,
//! reconnecting with exponential backoff per [`ReconnectPolicy`]. The socket
//! sits behind the [`Transport`] trait so tests can swap it out.

mod client;
mod message;
mod policy;
mod transport;

pub use client::ConnectionState;
pub use client::NotificationClient;
pub use message::Notification;
pub use message::NotificationKind;
pub use policy::ReconnectPolicy;
pub use transport::Connection;
pub use transport::Transport;
pub use transport::WsTransport;
