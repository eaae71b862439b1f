//! In-process repositories for handler and router tests.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{ReadingKind, RepositoryError, SensorRepository};

/// Stores readings in a `Vec`, assigning ids from 1 like a `BIGSERIAL`.
pub struct MemoryRepository<R> {
    rows: RwLock<Vec<R>>,
    next_id: AtomicI64,
}

impl<R> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl<R: ReadingKind> MemoryRepository<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn rows(&self) -> Vec<R> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl<R: ReadingKind> SensorRepository<R> for MemoryRepository<R> {
    async fn create(&self, reading: R::New) -> Result<R, RepositoryError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let row = R::assemble(id, Utc::now(), reading);
        self.rows.write().await.push(row.clone());
        Ok(row)
    }
}

/// Fails every insert as if the store were unreachable, counting attempts.
#[derive(Default)]
pub struct FailingRepository {
    attempts: AtomicUsize,
}

impl FailingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<R: ReadingKind> SensorRepository<R> for FailingRepository {
    async fn create(&self, _reading: R::New) -> Result<R, RepositoryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }
}
