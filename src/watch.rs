//! Realtime client for the `/ws` sync channel.
//!
//! [`BoardWatcher`] keeps a [`ClientProjection`] in step with the server:
//! every `board-update` replaces the local mirror, and local edits made
//! through [`BoardWatcher::projection_mut`] are sent back as `update-board`
//! with [`BoardWatcher::publish`].

use futures_util::{SinkExt, StreamExt};
use taskboard_common::{Board, ClientProjection, SyncMessage};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use crate::client::ClientError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// `http://host:port` → `ws://host:port/ws`.
pub fn ws_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    format!("{}/ws", base)
}

pub struct BoardWatcher {
    projection: ClientProjection,
    stream: WsStream,
}

impl BoardWatcher {
    pub async fn connect(base_url: &str) -> Result<Self, ClientError> {
        let url = ws_url(base_url);
        let (stream, _response) = tokio_tungstenite::connect_async(url.as_str()).await?;
        info!(%url, "connected to sync channel");

        let mut projection = ClientProjection::new();
        projection.set_connected(true);
        Ok(Self { projection, stream })
    }

    pub fn board(&self) -> &Board {
        self.projection.board()
    }

    pub fn projection(&self) -> &ClientProjection {
        &self.projection
    }

    pub fn projection_mut(&mut self) -> &mut ClientProjection {
        &mut self.projection
    }

    /// Wait for the next `board-update` and fold it into the mirror.
    /// `None` once the server closes the channel.
    pub async fn next_update(&mut self) -> Result<Option<&Board>, ClientError> {
        while let Some(frame) = self.stream.next().await {
            match frame? {
                Message::Text(text) => {
                    let msg = SyncMessage::from_json(text.as_str())?;
                    if self.projection.apply_remote(msg) {
                        return Ok(Some(self.projection.board()));
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        debug!("sync channel closed");
        self.projection.set_connected(false);
        Ok(None)
    }

    /// Send the outbound half of a local edit. `None` is a no-op.
    pub async fn publish(&mut self, msg: Option<SyncMessage>) -> Result<(), ClientError> {
        if let Some(msg) = msg {
            self.stream.send(Message::text(msg.to_json()?)).await?;
        }
        Ok(())
    }

    pub async fn close(mut self) -> Result<(), ClientError> {
        self.projection.set_connected(false);
        self.stream.close(None).await?;
        Ok(())
    }
}
