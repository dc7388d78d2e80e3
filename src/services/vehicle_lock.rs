use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// In-process locks keyed by vehicle id.
///
/// Held across an availability check and the write that depends on it, so two
/// requests for the same vehicle cannot both pass the check.
///
/// Entries are never removed. The map holds at most one mutex per vehicle id
/// that was ever booked, so it is bounded by the size of the fleet.
#[derive(Clone, Default)]
pub struct VehicleLocks {
    locks: Arc<DashMap<i32, Arc<Mutex<()>>>>,
}

impl VehicleLocks {
    pub async fn acquire(&self, vehicle_id: i32) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(vehicle_id).or_default().clone();
        lock.lock_owned().await
    }

    /// Acquire only when `enabled`
    pub async fn acquire_if(&self, enabled: bool, vehicle_id: i32) -> Option<OwnedMutexGuard<()>> {
        if enabled {
            Some(self.acquire(vehicle_id).await)
        } else {
            None
        }
    }
}
