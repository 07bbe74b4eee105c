//! Socket abstraction for the notification client.

use async_trait::async_trait;
use futures::SinkExt;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::MaybeTlsStream;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::error::NotifyError;

/// Opens connections.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn Connection>, NotifyError>;
}

/// One open text-frame connection.
#[async_trait]
pub trait Connection: Send {
    /// Sends one text frame.
    async fn send(&mut self, text: String) -> Result<(), NotifyError>;

    /// Next text frame. `None` once the peer has closed.
    ///
    /// Must be cancel-safe: it is raced against other events.
    async fn recv(&mut self) -> Option<Result<String, NotifyError>>;

    /// Closes the connection, ignoring errors.
    async fn close(&mut self);
}

/// WebSocket transport over `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsTransport;

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self, url: &str) -> Result<Box<dyn Connection>, NotifyError> {
        let parsed = url::Url::parse(url).map_err(|e| NotifyError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(NotifyError::InvalidUrl(format!("unsupported scheme '{}'", parsed.scheme())));
        }

        let (stream, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| NotifyError::Connect(e.to_string()))?;
        Ok(Box::new(WsConnection { stream }))
    }
}

struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connection for WsConnection {
    async fn send(&mut self, text: String) -> Result<(), NotifyError> {
        self.stream
            .send(Message::text(text))
            .await
            .map_err(|e| NotifyError::Send(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, NotifyError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Close(_)) => return None,
                // Ping/pong are answered by tungstenite; binary frames carry nothing for us
                Ok(_) => continue,
                Err(e) => return Some(Err(NotifyError::Receive(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}
