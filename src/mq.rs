//! The request channel: a bounded queue of textual emergency requests,
//! matching the external message-queue contract (§6). The scheduler core
//! only depends on the `RequestChannel` trait; which facility backs it is
//! an engineering choice left to the binary that wires things up.

use std::time::Duration;

use crate::error::DispatchError;

/// Maximum message size in bytes, per the external interface contract.
pub const MESSAGE_SIZE: usize = 256;
/// Queue capacity, per the external interface contract.
pub const QUEUE_CAPACITY: usize = 10;
/// The literal sentinel message requesting shutdown.
pub const EXIT_SENTINEL: &str = "exit";

/// A bounded channel of ASCII request messages, receivable with a timeout
/// so the consumer can observe shutdown promptly (§5).
pub trait RequestChannel: Send + Sync {
    fn send(&self, message: &str) -> Result<(), DispatchError>;
    fn recv_timeout(&self, timeout: Duration) -> Result<Option<String>, DispatchError>;
}

/// In-process bounded channel, used by default and by every test: the
/// request channel's OS backing is explicitly out of scope for the
/// scheduler core (§1), so the core must not require a real POSIX queue
/// to run.
pub struct InMemoryChannel {
    tx: crossbeam_channel::Sender<String>,
    rx: crossbeam_channel::Receiver<String>,
}

impl InMemoryChannel {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::bounded(QUEUE_CAPACITY);
        Self { tx, rx }
    }

    /// A cheap, independent handle to the same channel for producers.
    pub fn sender(&self) -> InMemorySender {
        InMemorySender { tx: self.tx.clone() }
    }
}

impl Default for InMemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestChannel for InMemoryChannel {
    fn send(&self, message: &str) -> Result<(), DispatchError> {
        if message.len() > MESSAGE_SIZE {
            return Err(DispatchError::MessageTooLarge { len: message.len() });
        }
        self.tx
            .send(message.to_string())
            .map_err(|_| DispatchError::ChannelClosed)
    }

    fn recv_timeout(&self, timeout: Duration) -> Result<Option<String>, DispatchError> {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => Ok(Some(msg)),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => Ok(None),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => Err(DispatchError::ChannelClosed),
        }
    }
}

/// A producer-side handle to an `InMemoryChannel`.
#[derive(Clone)]
pub struct InMemorySender {
    tx: crossbeam_channel::Sender<String>,
}

impl InMemorySender {
    pub fn send(&self, message: &str) -> Result<(), DispatchError> {
        if message.len() > MESSAGE_SIZE {
            return Err(DispatchError::MessageTooLarge { len: message.len() });
        }
        self.tx
            .send(message.to_string())
            .map_err(|_| DispatchError::ChannelClosed)
    }
}

/// A named POSIX message queue (Linux only), the literal facility named
/// in the external interface contract (§6).
#[cfg(feature = "posix-mq")]
pub struct PosixMqChannel {
    mq: posixmq::PosixMq,
}

#[cfg(feature = "posix-mq")]
impl PosixMqChannel {
    pub fn create(name: &str) -> Result<Self, DispatchError> {
        let mq = posixmq::OpenOptions::readwrite()
            .create()
            .max_msg_len(MESSAGE_SIZE)
            .capacity(QUEUE_CAPACITY as u32)
            .open(name)
            .map_err(|e| DispatchError::ConfigParse {
                file: name.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { mq })
    }
}

#[cfg(feature = "posix-mq")]
impl RequestChannel for PosixMqChannel {
    fn send(&self, message: &str) -> Result<(), DispatchError> {
        if message.len() > MESSAGE_SIZE {
            return Err(DispatchError::MessageTooLarge { len: message.len() });
        }
        self.mq
            .send(0, message.as_bytes())
            .map_err(|e| DispatchError::ConfigParse {
                file: "<posix-mq>".to_string(),
                reason: e.to_string(),
            })
    }

    fn recv_timeout(&self, timeout: Duration) -> Result<Option<String>, DispatchError> {
        let mut buf = vec![0u8; MESSAGE_SIZE];
        match self.mq.receive_timeout(&mut buf, timeout) {
            Ok((len, _priority)) => Ok(Some(String::from_utf8_lossy(&buf[..len]).into_owned())),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(DispatchError::ConfigParse {
                file: "<posix-mq>".to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_and_receive_round_trip() {
        let chan = InMemoryChannel::new();
        chan.send("Incidente 20 0 1").unwrap();
        let msg = chan.recv_timeout(Duration::from_millis(50)).unwrap();
        assert_eq!(msg.as_deref(), Some("Incidente 20 0 1"));
    }

    #[test]
    fn recv_times_out_when_empty() {
        let chan = InMemoryChannel::new();
        let msg = chan.recv_timeout(Duration::from_millis(10)).unwrap();
        assert!(msg.is_none());
    }

    #[test]
    fn rejects_oversized_message() {
        let chan = InMemoryChannel::new();
        let huge = "x".repeat(MESSAGE_SIZE + 1);
        assert!(matches!(chan.send(&huge), Err(DispatchError::MessageTooLarge { .. })));
    }
}
