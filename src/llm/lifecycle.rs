// Engine Lifecycle - Owns the single inference engine for the process
//
// Lifecycle: Uninitialized -> Ready -> Terminated. Construction happens once
// at startup; request handlers only borrow a short-lived handle via `get`.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::LlmError;
use crate::llm::config::{default_model_id, get_model_config, ModelSource};
use crate::llm::engine::{ChatEngine, Device, EngineFactory};

enum EngineState {
    Uninitialized,
    Ready(Arc<dyn ChatEngine>),
    Terminated,
}

/// Observable lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Uninitialized,
    Ready,
    Terminated,
}

/// Owner of the process-wide engine handle
pub struct EngineManager {
    state: RwLock<EngineState>,
    factory: Box<dyn EngineFactory>,
}

impl EngineManager {
    pub fn new(factory: impl EngineFactory + 'static) -> Self {
        Self {
            state: RwLock::new(EngineState::Uninitialized),
            factory: Box::new(factory),
        }
    }

    /// Build the engine, falling back to CPU if the automatic device fails.
    ///
    /// A no-op when already ready. The write lock is held for the whole
    /// construction, so concurrent callers can never build two engines.
    pub async fn initialize(&self, model_id: Option<&str>) -> Result<(), LlmError> {
        let mut state = self.state.write().await;
        if let EngineState::Ready(engine) = &*state {
            tracing::warn!(
                "Engine already initialized with model {}, skipping re-initialization",
                engine.model_id()
            );
            return Ok(());
        }

        let source = ModelSource::resolve(model_id.unwrap_or(default_model_id()))?;
        tracing::info!(
            "Initializing engine with model {} ({}/{})",
            source.id,
            source.repo,
            source.filename
        );
        if let Some(config) = get_model_config(&source.id) {
            tracing::info!("Model: {}", config.summary());
        }

        let engine = match self.factory.build(&source, Device::Auto).await {
            Ok(engine) => engine,
            Err(primary) => {
                tracing::error!("Error initializing engine on auto device: {primary}");
                self.factory
                    .build(&source, Device::Cpu)
                    .await
                    .map_err(|fallback| {
                        LlmError::EngineConstruction(format!(
                            "auto device: {primary}; cpu fallback: {fallback}"
                        ))
                    })?
            }
        };

        *state = EngineState::Ready(engine);
        tracing::info!("Engine initialized successfully");
        Ok(())
    }

    /// Borrow the engine for one request. Never waits on the lock.
    pub fn get(&self) -> Result<Arc<dyn ChatEngine>, LlmError> {
        match self.state.try_read().as_deref() {
            Ok(EngineState::Ready(engine)) => Ok(Arc::clone(engine)),
            _ => Err(LlmError::NotInitialized),
        }
    }

    /// Release the engine. Does nothing unless ready.
    pub async fn terminate(&self) {
        let mut state = self.state.write().await;
        if !matches!(&*state, EngineState::Ready(_)) {
            tracing::debug!("Engine not ready, nothing to terminate");
            return;
        }

        tracing::info!("Terminating engine...");
        // Weights are freed once in-flight requests drop their handles
        *state = EngineState::Terminated;
        tracing::info!("Engine terminated successfully");
    }

    pub async fn status(&self) -> EngineStatus {
        match &*self.state.read().await {
            EngineState::Uninitialized => EngineStatus::Uninitialized,
            EngineState::Ready(_) => EngineStatus::Ready,
            EngineState::Terminated => EngineStatus::Terminated,
        }
    }

    /// Get the currently loaded model ID
    pub async fn loaded_model_id(&self) -> Option<String> {
        match &*self.state.read().await {
            EngineState::Ready(engine) => Some(engine.model_id().to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedFactory;

    #[tokio::test]
    async fn test_get_before_initialize() {
        let manager = EngineManager::new(ScriptedFactory::with_text("[]"));

        assert_eq!(manager.get().err(), Some(LlmError::NotInitialized));
        assert_eq!(manager.status().await, EngineStatus::Uninitialized);
    }

    #[tokio::test]
    async fn test_initialize_twice_builds_once() {
        let factory = ScriptedFactory::with_text("[]");
        let probe = Arc::clone(&factory.probe);
        let manager = EngineManager::new(factory);

        manager.initialize(None).await.unwrap();
        manager.initialize(Some("tinyllama-1.1b")).await.unwrap();

        assert_eq!(probe.builds(), 1);
        assert_eq!(manager.status().await, EngineStatus::Ready);
        // The second call must not swap the model
        assert_eq!(manager.loaded_model_id().await.as_deref(), Some("qwen3-0.6b"));
        assert_eq!(manager.get().unwrap().model_id(), "qwen3-0.6b");
    }

    #[tokio::test]
    async fn test_concurrent_initialize_builds_once() {
        let factory = ScriptedFactory::with_text("[]");
        let probe = Arc::clone(&factory.probe);
        let manager = Arc::new(EngineManager::new(factory));

        let a = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move { manager.initialize(None).await }
        });
        let b = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move { manager.initialize(None).await }
        });

        assert!(a.await.unwrap().is_ok());
        assert!(b.await.unwrap().is_ok());
        assert_eq!(probe.builds(), 1);
    }

    #[tokio::test]
    async fn test_falls_back_to_cpu() {
        let factory = ScriptedFactory::with_text("[]").failing_on(&[Device::Auto]);
        let probe = Arc::clone(&factory.probe);
        let manager = EngineManager::new(factory);

        manager.initialize(None).await.unwrap();

        assert_eq!(*probe.devices.lock().unwrap(), vec![Device::Auto, Device::Cpu]);
        assert!(manager.get().is_ok());
    }

    #[tokio::test]
    async fn test_both_devices_fail() {
        let factory =
            ScriptedFactory::with_text("[]").failing_on(&[Device::Auto, Device::Cpu]);
        let probe = Arc::clone(&factory.probe);
        let manager = EngineManager::new(factory);

        let result = manager.initialize(None).await;

        assert!(matches!(result, Err(LlmError::EngineConstruction(_))));
        assert_eq!(probe.builds(), 2);
        assert_eq!(manager.status().await, EngineStatus::Uninitialized);
        assert_eq!(manager.get().err(), Some(LlmError::NotInitialized));
    }

    #[tokio::test]
    async fn test_unknown_model_is_rejected_before_building() {
        let factory = ScriptedFactory::with_text("[]");
        let probe = Arc::clone(&factory.probe);
        let manager = EngineManager::new(factory);

        let result = manager.initialize(Some("not-a-model")).await;

        assert_eq!(result, Err(LlmError::UnknownModel("not-a-model".to_string())));
        assert_eq!(probe.builds(), 0);
    }

    #[tokio::test]
    async fn test_get_after_terminate() {
        let manager = EngineManager::new(ScriptedFactory::with_text("[]"));
        manager.initialize(None).await.unwrap();

        manager.terminate().await;

        assert_eq!(manager.get().err(), Some(LlmError::NotInitialized));
        assert_eq!(manager.status().await, EngineStatus::Terminated);
        assert_eq!(manager.loaded_model_id().await, None);
    }

    #[tokio::test]
    async fn test_terminate_twice_releases_once() {
        let factory = ScriptedFactory::with_text("[]");
        let probe = Arc::clone(&factory.probe);
        let manager = EngineManager::new(factory);
        manager.initialize(None).await.unwrap();

        manager.terminate().await;
        manager.terminate().await;

        assert_eq!(probe.drops(), 1);
        assert_eq!(manager.status().await, EngineStatus::Terminated);
    }

    #[tokio::test]
    async fn test_terminate_before_initialize_is_noop() {
        let manager = EngineManager::new(ScriptedFactory::with_text("[]"));

        manager.terminate().await;

        assert_eq!(manager.status().await, EngineStatus::Uninitialized);
    }

    #[tokio::test]
    async fn test_in_flight_handle_outlives_terminate() {
        let factory = ScriptedFactory::with_text("[]");
        let probe = Arc::clone(&factory.probe);
        let manager = EngineManager::new(factory);
        manager.initialize(None).await.unwrap();

        let handle = manager.get().unwrap();
        manager.terminate().await;
        assert_eq!(probe.drops(), 0);

        drop(handle);
        assert_eq!(probe.drops(), 1);
    }
}
