use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;

use crate::worker::TempoWorker;

/// Workers keyed by configuration id, owned by the composition root.
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    workers: BTreeMap<String, Arc<TempoWorker>>,
}

impl WorkerRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `worker` under `id`.
    ///
    /// A different worker previously registered under the same id is stopped
    /// and returned. Registering the same worker again leaves it running.
    pub fn insert(&mut self, id: impl Into<String>, worker: Arc<TempoWorker>) -> Option<Arc<TempoWorker>> {
        let id = id.into();
        let displaced = self.workers.insert(id, Arc::clone(&worker));
        if let Some(old) = &displaced
            && !Arc::ptr_eq(old, &worker)
        {
            old.signalstop("replaced");
        }
        displaced
    }

    /// Worker registered under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<TempoWorker>> {
        self.workers.get(id)
    }

    /// Unregister and stop the worker under `id`.
    pub fn remove(&mut self, id: &str, reason: &str) -> Option<Arc<TempoWorker>> {
        let worker = self.workers.remove(id)?;
        worker.signalstop(reason);
        Some(worker)
    }

    /// Stop every registered worker without unregistering it.
    pub fn stop_all(&self, reason: &str) {
        for worker in self.workers.values() {
            worker.signalstop(reason);
        }
    }

    /// Stop and unregister every worker, then wait for their tasks to exit.
    pub async fn shutdown(&mut self, reason: &str) {
        let workers = std::mem::take(&mut self.workers);
        for worker in workers.values() {
            worker.signalstop(reason);
        }
        join_all(workers.values().map(|w| w.join())).await;
    }

    /// Number of registered workers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Returns true if no worker is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.workers.keys().map(String::as_str)
    }
}
