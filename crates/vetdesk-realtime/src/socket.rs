// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket client for the clinic's real-time event stream.
//!
//! Server -> client frames are JSON text, in either of two shapes:
//! ```json
//! {"event": "testResultReady", "data": {"testId": 15}}
//! ["testResultReady", {"testId": 15}]
//! ```
//!
//! Every frame is emitted on the [`EventBus`] in arrival order. When the
//! connection drops the client waits a fixed delay and reconnects, until
//! its [`CancellationToken`] fires.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vetdesk_bus::EventBus;
use vetdesk_config::model::RealtimeConfig;
use vetdesk_core::{TokenStore, VetdeskError, ACCESS_TOKEN_KEY};

/// Splits a text frame into its event name and payload.
pub fn parse_frame(text: &str) -> Result<(String, Value), VetdeskError> {
    let frame: Value = serde_json::from_str(text).map_err(|e| VetdeskError::Decode {
        message: "socket frame is not JSON".to_string(),
        source: Some(Box::new(e)),
    })?;

    let malformed = || VetdeskError::Decode {
        message: format!("unrecognized socket frame: {text}"),
        source: None,
    };

    match frame {
        Value::Object(mut fields) => {
            let event = match fields.remove("event") {
                Some(Value::String(event)) => event,
                _ => return Err(malformed()),
            };
            let data = fields
                .remove("data")
                .or_else(|| fields.remove("payload"))
                .unwrap_or(Value::Null);
            Ok((event, data))
        }
        Value::Array(items) => {
            let mut items = items.into_iter();
            match (items.next(), items.next()) {
                (Some(Value::String(event)), data) => Ok((event, data.unwrap_or(Value::Null))),
                _ => Err(malformed()),
            }
        }
        _ => Err(malformed()),
    }
}

/// How one connection ended.
#[derive(Debug, PartialEq, Eq)]
enum Disconnect {
    Cancelled,
    Closed,
}

pub struct SocketClient {
    url: String,
    tokens: Arc<dyn TokenStore>,
    bus: Arc<EventBus>,
    reconnect_delay: Duration,
}

impl SocketClient {
    pub fn new(
        url: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
        bus: Arc<EventBus>,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            tokens,
            bus,
            reconnect_delay,
        }
    }

    pub fn from_config(config: &RealtimeConfig, tokens: Arc<dyn TokenStore>, bus: Arc<EventBus>) -> Self {
        Self::new(config.url.clone(), tokens, bus, config.reconnect_delay())
    }

    /// Runs the client on its own task.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<Result<(), VetdeskError>> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    /// Connects and forwards events until `cancel` fires.
    ///
    /// Fails only when there is no access token to connect with; every other
    /// failure leads to a reconnect after the configured delay.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), VetdeskError> {
        let mut attempt: u64 = 0;
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }
            attempt += 1;

            match self.connect_once(&cancel).await {
                Ok(Disconnect::Cancelled) => {
                    info!("real-time socket stopped");
                    return Ok(());
                }
                Ok(Disconnect::Closed) => {
                    info!(delay_secs = self.reconnect_delay.as_secs(), "real-time socket closed, reconnecting");
                    attempt = 0;
                }
                Err(e @ VetdeskError::MissingCredential(_)) => return Err(e),
                Err(e) => {
                    warn!(attempt, error = %e, "real-time socket failed, reconnecting");
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }
    }

    async fn connect_once(&self, cancel: &CancellationToken) -> Result<Disconnect, VetdeskError> {
        let token = self
            .tokens
            .get(ACCESS_TOKEN_KEY)
            .ok_or_else(|| VetdeskError::MissingCredential("real-time socket needs an access token".into()))?;

        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| VetdeskError::Config(format!("invalid realtime url `{}`: {e}", self.url)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| VetdeskError::Internal(format!("access token is not a valid header: {e}")))?;
        request.headers_mut().insert(AUTHORIZATION, bearer);

        let (stream, _) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| VetdeskError::Network {
                message: format!("connecting to {}", self.url),
                source: Some(Box::new(e)),
            })?;
        info!(url = %self.url, "real-time socket connected");

        let (mut sink, mut source) = stream.split();
        loop {
            let frame = tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    return Ok(Disconnect::Cancelled);
                }
                frame = source.next() => frame,
            };

            match frame {
                Some(Ok(Message::Text(text))) => self.forward(text.as_str()),
                Some(Ok(Message::Ping(data))) => {
                    if sink.send(Message::Pong(data)).await.is_err() {
                        return Ok(Disconnect::Closed);
                    }
                }
                Some(Ok(Message::Close(_))) | None => return Ok(Disconnect::Closed),
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    return Err(VetdeskError::Network {
                        message: "reading from real-time socket".to_string(),
                        source: Some(Box::new(e)),
                    });
                }
            }
        }
    }

    fn forward(&self, text: &str) {
        match parse_frame(text) {
            Ok((event, payload)) => {
                let listeners = self.bus.emit(&event, &payload);
                debug!(event, listeners, "socket event emitted");
            }
            Err(e) => warn!(error = %e, "ignoring socket frame"),
        }
    }
}
