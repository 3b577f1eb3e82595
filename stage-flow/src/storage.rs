use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::error::Result;

/// Trait for storing and retrieving pipeline runs
///
/// `R` is whatever run representation the caller persists, typically a
/// record wrapping the stage results plus domain state.
#[async_trait]
pub trait RunStorage<R>: Send + Sync
where
    R: Send,
{
    async fn save(&self, id: String, run: R) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<R>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// In-memory implementation of RunStorage
pub struct InMemoryRunStorage<R> {
    runs: Arc<DashMap<String, R>>,
}

impl<R> InMemoryRunStorage<R> {
    pub fn new() -> Self {
        Self {
            runs: Arc::new(DashMap::new()),
        }
    }
}

impl<R> Default for InMemoryRunStorage<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R> RunStorage<R> for InMemoryRunStorage<R>
where
    R: Clone + Send + Sync + 'static,
{
    async fn save(&self, id: String, run: R) -> Result<()> {
        self.runs.insert(id, run);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<R>> {
        Ok(self.runs.get(id).map(|entry| entry.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.runs.remove(id);
        Ok(())
    }
}
