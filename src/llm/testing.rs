// Scripted engine doubles shared by the unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::LlmError;
use crate::llm::config::ModelSource;
use crate::llm::engine::{ChatEngine, ChatMessage, Device, EngineFactory};

/// Counters observed by tests after the engine has been moved into the manager
#[derive(Debug, Default)]
pub struct EngineProbe {
    pub builds: AtomicUsize,
    pub chats: AtomicUsize,
    pub drops: AtomicUsize,
    pub devices: Mutex<Vec<Device>>,
    pub last_messages: Mutex<Vec<ChatMessage>>,
}

impl EngineProbe {
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn chats(&self) -> usize {
        self.chats.load(Ordering::SeqCst)
    }

    pub fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }
}

/// Engine that replays canned replies in order, then repeats the last one
pub struct ScriptedEngine {
    model_id: String,
    replies: Mutex<VecDeque<Result<Option<String>, LlmError>>>,
    probe: Arc<EngineProbe>,
}

#[async_trait]
impl ChatEngine for ScriptedEngine {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<Option<String>, LlmError> {
        self.probe.chats.fetch_add(1, Ordering::SeqCst);
        *self.probe.last_messages.lock().unwrap() = messages.to_vec();

        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies.front().cloned().unwrap_or(Ok(None))
        }
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        self.probe.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Factory producing `ScriptedEngine`s, optionally failing on some devices
pub struct ScriptedFactory {
    replies: Vec<Result<Option<String>, LlmError>>,
    failing_devices: Vec<Device>,
    pub probe: Arc<EngineProbe>,
}

impl ScriptedFactory {
    pub fn replying(replies: Vec<Result<Option<String>, LlmError>>) -> Self {
        Self {
            replies,
            failing_devices: Vec::new(),
            probe: Arc::new(EngineProbe::default()),
        }
    }

    pub fn with_text(text: &str) -> Self {
        Self::replying(vec![Ok(Some(text.to_string()))])
    }

    pub fn failing_on(mut self, devices: &[Device]) -> Self {
        self.failing_devices = devices.to_vec();
        self
    }
}

#[async_trait]
impl EngineFactory for ScriptedFactory {
    async fn build(
        &self,
        source: &ModelSource,
        device: Device,
    ) -> Result<Arc<dyn ChatEngine>, LlmError> {
        self.probe.builds.fetch_add(1, Ordering::SeqCst);
        self.probe.devices.lock().unwrap().push(device);

        if self.failing_devices.contains(&device) {
            return Err(LlmError::EngineConstruction(format!(
                "{} unavailable on {}",
                source.id,
                device.as_str()
            )));
        }

        Ok(Arc::new(ScriptedEngine {
            model_id: source.id.clone(),
            replies: Mutex::new(self.replies.iter().cloned().collect()),
            probe: Arc::clone(&self.probe),
        }))
    }
}
