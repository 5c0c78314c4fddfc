use serde_json::Value;
use std::sync::Arc;
use std::sync::Mutex;

/// Opaque sink owned by the transport layer.
///
/// The engine never reads from subscribers; its only capability is sending
/// a JSON message, which may fail. A failed send drops the subscriber from
/// the game after the current broadcast completes.
#[async_trait::async_trait]
pub trait Subscriber: Send {
    async fn send(&mut self, message: &Value) -> anyhow::Result<()>;
}

/// In-memory subscriber capturing every broadcast message.
/// Useful as a test double and as the reference sink implementation.
#[derive(Clone, Default)]
pub struct Recorder {
    messages: Arc<Mutex<Vec<Value>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }
    /// Everything received so far.
    pub fn messages(&self) -> Vec<Value> {
        self.messages.lock().expect("recorder lock").clone()
    }
    /// Received messages with the given `type` tag.
    pub fn of_type(&self, tag: &str) -> Vec<Value> {
        self.messages()
            .into_iter()
            .filter(|m| m["type"] == tag)
            .collect()
    }
}

#[async_trait::async_trait]
impl Subscriber for Recorder {
    async fn send(&mut self, message: &Value) -> anyhow::Result<()> {
        self.messages.lock().expect("recorder lock").push(message.clone());
        Ok(())
    }
}

/// Subscriber whose sends always fail; exercises the drop-on-failure path.
pub struct Severed;

#[async_trait::async_trait]
impl Subscriber for Severed {
    async fn send(&mut self, _: &Value) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("connection closed"))
    }
}
