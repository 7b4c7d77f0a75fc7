//! Pub/sub transport used to reach displays and controllers.
//!
//! The simulation only needs two things from the bus: a fire-and-forget
//! `publish` and a stream of inbound messages on the topics it subscribed to.
//! [`UdpBus`] talks to a relay over UDP with small JSON envelopes;
//! [`MemoryBus`] keeps everything in process for tests.

use crate::error::TransportError;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

/// One message received from or sent to the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub topic: String,
    pub payload: String,
}

impl BusMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Outbound half of a bus connection.
pub trait Transport: Send + Sync {
    /// Queues a message for delivery. Delivery itself is best effort.
    fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError>;
}

/// Datagram exchanged with the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Envelope {
    Subscribe { topic: String },
    Publish { topic: String, payload: String },
}

/// UDP connection to a pub/sub relay.
pub struct UdpBus {
    outgoing: mpsc::UnboundedSender<Envelope>,
    local_addr: SocketAddr,
}

impl UdpBus {
    /// Binds a local socket, points it at the relay and subscribes to `topics`.
    ///
    /// Any failure here means nobody can observe or control the game, so the
    /// caller treats it as fatal.
    pub async fn connect(
        bind: &str,
        broker: &str,
        topics: &[String],
    ) -> Result<(Self, mpsc::UnboundedReceiver<BusMessage>), TransportError> {
        let socket = UdpSocket::bind(bind)
            .await
            .map_err(|source| TransportError::Bind {
                addr: bind.to_string(),
                source,
            })?;
        socket
            .connect(broker)
            .await
            .map_err(|source| TransportError::Connect {
                addr: broker.to_string(),
                source,
            })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| TransportError::Bind {
                addr: bind.to_string(),
                source,
            })?;

        for topic in topics {
            let data = serde_json::to_vec(&Envelope::Subscribe {
                topic: topic.clone(),
            })?;
            socket
                .send(&data)
                .await
                .map_err(|source| TransportError::Subscribe {
                    topic: topic.clone(),
                    source,
                })?;
        }
        info!("Connected to broker {} from {}", broker, local_addr);

        let socket = Arc::new(socket);
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();

        Self::spawn_receiver(Arc::clone(&socket), inbound_tx);
        Self::spawn_sender(socket, outgoing_rx);

        Ok((
            Self {
                outgoing: outgoing_tx,
                local_addr,
            },
            inbound_rx,
        ))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Spawns task that continuously listens for relayed messages
    fn spawn_receiver(socket: Arc<UdpSocket>, inbound: mpsc::UnboundedSender<BusMessage>) {
        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];

            loop {
                match socket.recv(&mut buffer).await {
                    Ok(len) => match serde_json::from_slice::<Envelope>(&buffer[..len]) {
                        Ok(Envelope::Publish { topic, payload }) => {
                            if inbound.send(BusMessage { topic, payload }).is_err() {
                                debug!("Inbound channel closed, stopping receiver");
                                break;
                            }
                        }
                        Ok(other) => warn!("Ignoring unexpected envelope {:?}", other),
                        Err(e) => warn!("Failed to decode envelope: {}", e),
                    },
                    Err(e) => {
                        error!("Error receiving from broker: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that drains the outgoing queue
    fn spawn_sender(socket: Arc<UdpSocket>, mut outgoing: mpsc::UnboundedReceiver<Envelope>) {
        tokio::spawn(async move {
            while let Some(envelope) = outgoing.recv().await {
                let data = match serde_json::to_vec(&envelope) {
                    Ok(data) => data,
                    Err(e) => {
                        error!("Failed to encode envelope: {}", e);
                        continue;
                    }
                };
                if let Err(e) = socket.send(&data).await {
                    error!("Failed to send to broker: {}", e);
                }
            }
        });
    }
}

impl Transport for UdpBus {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError> {
        self.outgoing
            .send(Envelope::Publish {
                topic: topic.to_string(),
                payload: payload.to_string(),
            })
            .map_err(|_| TransportError::Closed)
    }
}

/// In-process bus. Publications go to the [`MemoryBusHandle`]; messages the
/// handle injects arrive on the inbound receiver.
pub struct MemoryBus {
    published: mpsc::UnboundedSender<BusMessage>,
    failing: AtomicBool,
}

/// Remote end of a [`MemoryBus`], standing in for displays and controllers.
pub struct MemoryBusHandle {
    pub inbound: mpsc::UnboundedSender<BusMessage>,
    pub published: mpsc::UnboundedReceiver<BusMessage>,
}

impl MemoryBusHandle {
    /// Sends a control message as if a remote device had published it.
    pub fn inject(&self, topic: &str, payload: &str) -> Result<(), TransportError> {
        self.inbound
            .send(BusMessage::new(topic, payload))
            .map_err(|_| TransportError::Closed)
    }
}

impl MemoryBus {
    pub fn pair() -> (Arc<Self>, mpsc::UnboundedReceiver<BusMessage>, MemoryBusHandle) {
        let (published_tx, published_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let bus = Arc::new(Self {
            published: published_tx,
            failing: AtomicBool::new(false),
        });
        let handle = MemoryBusHandle {
            inbound: inbound_tx,
            published: published_rx,
        };
        (bus, inbound_rx, handle)
    }

    /// Makes every publish fail until cleared.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Transport for MemoryBus {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Rejected);
        }
        self.published
            .send(BusMessage::new(topic, payload))
            .map_err(|_| TransportError::Closed)
    }
}
