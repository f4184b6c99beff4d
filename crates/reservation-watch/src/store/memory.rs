use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{validate_lengths, MonitoringStore, StoreError};
use crate::domain::{MonitoringRequest, MonitoringRequestId, NewMonitoringRequest};

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    records: Vec<MonitoringRequest>,
}

/// Process-local store with sequential ids, used by tests and offline runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMonitoringStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryMonitoringStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored record in insertion order.
    pub fn snapshot(&self) -> Result<Vec<MonitoringRequest>, StoreError> {
        Ok(self.lock()?.records.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("monitoring store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl MonitoringStore for InMemoryMonitoringStore {
    async fn create(
        &self,
        request: NewMonitoringRequest,
    ) -> Result<MonitoringRequest, StoreError> {
        validate_lengths(&request)?;

        let mut state = self.lock()?;
        state.next_id += 1;
        let record = MonitoringRequest {
            id: MonitoringRequestId(state.next_id),
            email: request.email().to_string(),
            month: request.month().to_string(),
            active: true,
            created_at: Utc::now(),
        };
        state.records.push(record.clone());
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<MonitoringRequest>, StoreError> {
        let mut records = self.lock()?.records.clone();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    async fn list_active(&self) -> Result<Vec<MonitoringRequest>, StoreError> {
        let mut records: Vec<_> = self
            .lock()?
            .records
            .iter()
            .filter(|record| record.active)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.id);
        Ok(records)
    }

    async fn deactivate(&self, id: MonitoringRequestId) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let record = state
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(StoreError::NotFound)?;
        record.active = false;
        Ok(())
    }
}
