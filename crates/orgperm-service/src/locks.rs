//! Per-department write lock registry.
//!
//! Serializes writes touching the same department while letting writes
//! to unrelated departments proceed concurrently. Multi-department
//! operations acquire their locks in ascending department-id order,
//! which rules out lock-order deadlocks between concurrent cascades.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of one async mutex per department.
#[derive(Debug, Default)]
pub struct DepartmentLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl DepartmentLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the write lock for one department.
    pub async fn acquire(&self, department_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(department_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Acquire the write locks for several departments, in ascending id
    /// order. Duplicate ids are collapsed.
    pub async fn acquire_many(&self, department_ids: &[Uuid]) -> Vec<OwnedMutexGuard<()>> {
        let mut ids: Vec<Uuid> = department_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.acquire(id).await);
        }
        guards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_lock_serializes_same_department() {
        let locks = Arc::new(DepartmentLocks::new());
        let dept = Uuid::new_v4();
        let inside = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let inside = inside.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(dept).await;
                // No other task may be inside the critical section.
                assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                tokio::task::yield_now().await;
                assert_eq!(inside.fetch_sub(1, Ordering::SeqCst), 1);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_acquire_many_collapses_duplicates() {
        let locks = DepartmentLocks::new();
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let guards = locks.acquire_many(&[b, a, b, a]).await;
        assert_eq!(guards.len(), 2);
    }
}
