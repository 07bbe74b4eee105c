//! Notification channel error types

/// Errors raised by the notification WebSocket client.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The notification URL is not a valid `ws://` or `wss://` URL.
    #[error("Invalid notification URL: {0}")]
    InvalidUrl(String),

    /// Opening the connection failed.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Writing a frame failed.
    #[error("Send failed: {0}")]
    Send(String),

    /// Reading a frame failed.
    #[error("Receive failed: {0}")]
    Receive(String),

    /// An inbound frame is not a notification object.
    #[error("Malformed notification: {0}")]
    Malformed(String),

    /// The connection is closed.
    #[error("Connection closed")]
    Closed,
}
