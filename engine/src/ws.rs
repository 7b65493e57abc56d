//! WebSocket transport for the supervisor, using `tokio-tungstenite`.
//!

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::trace;

use crate::{Connector, Incoming, Link, StreamError};

/// Connects to one `ws://` or `wss://` URL.
///
#[derive(Clone, Debug)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: &str) -> Self {
        WsConnector {
            url: url.to_string(),
        }
    }
}

impl Connector for WsConnector {
    type Link = WsLink;

    async fn connect(&mut self) -> Result<WsLink, StreamError> {
        let (ws, resp) = connect_async(self.url.as_str())
            .await
            .map_err(|e| StreamError::Connect(self.url.clone(), e.to_string()))?;
        trace!("handshake: {}", resp.status());
        Ok(WsLink { ws })
    }

    fn target(&self) -> String {
        self.url.clone()
    }
}

#[derive(Debug)]
pub struct WsLink {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Link for WsLink {
    async fn recv(&mut self) -> Option<Result<Incoming, StreamError>> {
        while let Some(msg) = self.ws.next().await {
            match msg {
                Ok(Message::Text(text)) => return Some(Ok(Incoming::Text(text))),
                Ok(Message::Binary(data)) => return Some(Ok(Incoming::Binary(data))),
                Ok(Message::Close(frame)) => {
                    trace!("close: {frame:?}");
                    return None;
                }
                // Ping/pong are answered by tungstenite itself
                //
                Ok(_) => continue,
                Err(e) => return Some(Err(StreamError::Transport(e.to_string()))),
            }
        }
        None
    }

    async fn send(&mut self, text: String) -> Result<(), StreamError> {
        self.ws
            .send(Message::Text(text))
            .await
            .map_err(|e| StreamError::Transport(e.to_string()))
    }
}
