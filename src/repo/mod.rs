/// In-memory snapshot store for fetched collections
use crate::domain::{County, VaccinationCentres};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Latest collection fetched for a department
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub fetched_at: DateTime<Utc>,
    pub centres: Arc<VaccinationCentres>,
}

impl Snapshot {
    /// Whether the snapshot is at least `max_age` old
    pub fn is_stale(&self, max_age: Duration) -> bool {
        (Utc::now() - self.fetched_at)
            .to_std()
            .map_or(false, |age| age >= max_age)
    }
}

/// Centre snapshots keyed by department code
#[derive(Clone, Default)]
pub struct SnapshotRepo {
    snapshots: Arc<RwLock<HashMap<String, Snapshot>>>,
}

impl SnapshotRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot of a department; last write wins
    pub async fn write(&self, department: &str, centres: VaccinationCentres) -> Snapshot {
        let snapshot = Snapshot {
            fetched_at: Utc::now(),
            centres: Arc::new(centres),
        };
        self.snapshots
            .write()
            .await
            .insert(department.to_string(), snapshot.clone());
        snapshot
    }

    /// Get latest snapshot for a department
    pub async fn get_latest(&self, department: &str) -> Option<Snapshot> {
        self.snapshots.read().await.get(department).cloned()
    }
}

/// Department catalogue, fetched once and then served from memory
#[derive(Clone, Default)]
pub struct CountyRepo {
    counties: Arc<RwLock<Option<Arc<Vec<County>>>>>,
}

impl CountyRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn write(&self, counties: Vec<County>) -> Arc<Vec<County>> {
        let counties = Arc::new(counties);
        *self.counties.write().await = Some(counties.clone());
        counties
    }

    pub async fn get(&self) -> Option<Arc<Vec<County>>> {
        self.counties.read().await.clone()
    }
}
