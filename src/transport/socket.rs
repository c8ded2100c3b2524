use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::error::TransportError;
use crate::transport::packet::{self, Handshake, Packet};
use crate::transport::{EventRegistry, Subscription, Transport};
use crate::utils::socket_endpoint;

/// socket.io client over a single WebSocket. One background task owns the
/// socket; this handle only queues outbound packets and hands out
/// subscriptions.
pub struct SocketClient {
    namespace: String,
    handshake: Handshake,
    outbound: mpsc::UnboundedSender<String>,
    registry: EventRegistry,
}

impl SocketClient {
    /// Open the socket and join the namespace named by the URL path.
    /// There is no retry: a failed handshake is returned as is.
    pub async fn connect(base_url: &str) -> Result<Self, TransportError> {
        let (url, namespace) = socket_endpoint(base_url)?;
        log::info!("Connecting to {} (namespace {})", url, namespace);
        let (ws_stream, _) = connect_async(url.as_str()).await?;
        let (mut write, mut read) = ws_stream.split();

        let handshake = loop {
            match next_packet(&mut read).await? {
                Packet::Open(hs) => break hs,
                other => log::debug!("ignoring {:?} before open", other),
            }
        };

        write.send(Message::Text(packet::encode(&Packet::connect(&namespace))?)).await?;
        loop {
            match next_packet(&mut read).await? {
                Packet::Connect { namespace: ns, .. } if ns == namespace => break,
                Packet::ConnectError { namespace: ns, data } if ns == namespace => {
                    let reason = data
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| data.to_string());
                    return Err(TransportError::ConnectRefused { namespace, reason });
                }
                Packet::Ping => write.send(Message::Text(packet::encode(&Packet::Pong)?)).await?,
                other => log::debug!("ignoring {:?} while joining {}", other, namespace),
            }
        }
        log::info!("WebSocket connected (sid {})", handshake.sid);

        let registry = EventRegistry::new();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_connection(write, read, outbound_rx, registry.clone(), namespace.clone()));

        Ok(Self { namespace, handshake, outbound, registry })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn sid(&self) -> &str {
        &self.handshake.sid
    }

    /// False once the connection task has exited.
    pub fn is_connected(&self) -> bool {
        !self.outbound.is_closed()
    }
}

impl Transport for SocketClient {
    fn emit(&self, event: &str, payload: Value) -> Result<(), TransportError> {
        let text = packet::encode(&Packet::event(&self.namespace, event, payload))?;
        log::debug!("emit {}", text);
        self.outbound.send(text).map_err(|_| TransportError::Closed)
    }

    fn on(&self, event: &str) -> Subscription {
        self.registry.subscribe(event)
    }
}

async fn next_packet<R>(read: &mut R) -> Result<Packet, TransportError>
where
    R: Stream<Item = Result<Message, WsError>> + Unpin,
{
    while let Some(frame) = read.next().await {
        match frame? {
            Message::Text(text) => return packet::decode(&text),
            Message::Close(_) => return Err(TransportError::Closed),
            _ => {}
        }
    }
    Err(TransportError::Closed)
}

async fn run_connection<W, R>(
    mut write: W,
    mut read: R,
    mut outbound: mpsc::UnboundedReceiver<String>,
    registry: EventRegistry,
    namespace: String,
) where
    W: Sink<Message, Error = WsError> + Unpin,
    R: Stream<Item = Result<Message, WsError>> + Unpin,
{
    loop {
        tokio::select! {
            queued = outbound.recv() => match queued {
                Some(text) => {
                    if let Err(e) = write.send(Message::Text(text)).await {
                        log::warn!("WebSocket write failed: {}", e);
                        break;
                    }
                }
                None => {
                    // every handle is gone
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            },
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => match packet::decode(&text) {
                    Ok(Packet::Ping) => {
                        let pong = Message::Text("3".to_string());
                        if write.send(pong).await.is_err() {
                            break;
                        }
                    }
                    Ok(Packet::Event { namespace: ns, event, .. }) if ns == namespace => {
                        let delivered = registry.deliver(&event.event_type, &event.data);
                        log::debug!("{} delivered to {} handler(s)", event.event_type, delivered);
                    }
                    Ok(Packet::Disconnect { namespace: ns }) if ns == namespace => {
                        log::info!("Server disconnected namespace {}", ns);
                        break;
                    }
                    Ok(Packet::Close) => break,
                    Ok(other) => log::debug!("ignoring {:?}", other),
                    Err(e) => log::warn!("Dropping malformed packet: {}", e),
                },
                Some(Ok(Message::Close(_))) | None => {
                    log::info!("WebSocket closed");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    log::warn!("WebSocket read failed: {}", e);
                    break;
                }
            },
        }
    }
}
