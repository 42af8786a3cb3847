use crate::error::WorkerError;
use crate::model::{MODEL_REPO, ModelLoader};
use std::sync::{Arc, Mutex};

/// Lazily constructs and memoizes the loaded model.
///
/// The first `get` in the process's lifetime checks the accelerator
/// precondition, constructs the model, and stores it; every later call
/// returns the stored handle. The slot's mutex is held across construction,
/// so concurrent first calls serialize and the load runs at most once.
/// There is no unload path: the handle lives for the rest of the process.
pub struct ModelCache<L: ModelLoader> {
    loader: L,
    slot: Mutex<Option<Arc<L::Model>>>,
}

impl<L: ModelLoader> ModelCache<L> {
    /// Creates an empty cache. Nothing is loaded until the first `get`.
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            slot: Mutex::new(None),
        }
    }

    /// Returns the ready model handle, loading it on the first call.
    ///
    /// Fails with [`WorkerError::HardwarePrecondition`] when no accelerator
    /// is present, and with [`WorkerError::ModelLoad`] when construction
    /// itself fails. A failed load leaves the cache uninitialized, so the
    /// next job reports the failure again rather than a stale handle.
    pub fn get(&self) -> Result<Arc<L::Model>, WorkerError> {
        let mut slot = self.slot.lock().unwrap();
        if let Some(model) = slot.as_ref() {
            return Ok(model.clone());
        }

        if !self.loader.accelerator_available() {
            return Err(WorkerError::HardwarePrecondition(format!(
                "CUDA is required for {MODEL_REPO}"
            )));
        }

        log::info!("Loading {MODEL_REPO} on {}", self.loader.describe());
        let model = Arc::new(self.loader.load().map_err(|e| WorkerError::ModelLoad {
            source: Box::new(e),
        })?);
        log::info!("Model loaded successfully");

        *slot = Some(model.clone());
        Ok(model)
    }

    /// Whether the model has been constructed and stored.
    pub fn is_ready(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EditModel, EditOutput, EditRequest};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct StubError(String);

    #[derive(Debug)]
    struct StubModel;

    impl EditModel for StubModel {
        type Error = StubError;

        fn edit(&self, request: EditRequest) -> Result<EditOutput, Self::Error> {
            Ok(EditOutput {
                images: request.images,
            })
        }
    }

    struct StubLoader {
        accelerator: bool,
        loads: Arc<AtomicUsize>,
    }

    impl ModelLoader for StubLoader {
        type Model = StubModel;
        type Error = StubError;

        fn accelerator_available(&self) -> bool {
            self.accelerator
        }

        fn describe(&self) -> String {
            "stub device".to_string()
        }

        fn load(&self) -> Result<StubModel, StubError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(StubModel)
        }
    }

    #[test]
    fn second_get_reuses_the_loaded_model() {
        let loads = Arc::new(AtomicUsize::new(0));
        let cache = ModelCache::new(StubLoader {
            accelerator: true,
            loads: loads.clone(),
        });

        assert!(!cache.is_ready());
        let first = cache.get().unwrap();
        let second = cache.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(cache.is_ready());
    }

    #[test]
    fn missing_accelerator_fails_without_loading() {
        let loads = Arc::new(AtomicUsize::new(0));
        let cache = ModelCache::new(StubLoader {
            accelerator: false,
            loads: loads.clone(),
        });

        let err = cache.get().unwrap_err();
        assert_eq!(err.to_string(), "CUDA is required for Qwen/Qwen-Image-Edit-2511");
        assert_eq!(loads.load(Ordering::SeqCst), 0);
        assert!(!cache.is_ready());
    }

    #[test]
    fn concurrent_first_calls_load_exactly_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(ModelCache::new(StubLoader {
            accelerator: true,
            loads: loads.clone(),
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.get().map(|_| ()))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}
