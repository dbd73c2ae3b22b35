//! Per-aggregate mutual exclusion

use dashmap::DashMap;
use disclosure_types::ApplicationId;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per Application. Every mutating operation holds its
/// Application's lock from load to commit.
///
/// An entry lives only while someone holds or waits on it.
#[derive(Debug, Default)]
pub struct AggregateLocks {
    locks: DashMap<ApplicationId, Arc<Mutex<()>>>,
}

impl AggregateLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, id: &ApplicationId) -> AggregateGuard<'_> {
        let lock = Arc::clone(
            self.locks
                .entry(id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        AggregateGuard {
            locks: &self.locks,
            id: id.clone(),
            guard: Some(lock.lock_owned().await),
        }
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Held lock on one Application. Dropping it releases the lock and evicts
/// the entry when no other task is waiting.
#[derive(Debug)]
pub struct AggregateGuard<'a> {
    locks: &'a DashMap<ApplicationId, Arc<Mutex<()>>>,
    id: ApplicationId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for AggregateGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters hold a clone, so a count of one means only the map is left
        self.locks
            .remove_if(&self.id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_id_serializes() {
        let locks = Arc::new(AggregateLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));
        let id = ApplicationId::new("app-1");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let inside = inside.clone();
            let max_inside = max_inside.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(&id).await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_ids_do_not_block() {
        let locks = AggregateLocks::new();
        let _a = locks.acquire(&ApplicationId::new("a")).await;
        let _b = locks.acquire(&ApplicationId::new("b")).await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_entry_evicted_on_release() {
        let locks = Arc::new(AggregateLocks::new());
        let id = ApplicationId::new("app-1");

        let held = locks.acquire(&id).await;
        let waiter = {
            let locks = locks.clone();
            let id = id.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&id).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;

        // The waiter keeps the entry alive past the first release
        drop(held);
        assert_eq!(locks.len(), 1);
        waiter.await.unwrap();
        assert!(locks.is_empty());

        for n in 0..16 {
            let _guard = locks.acquire(&ApplicationId::new(format!("app-{n}"))).await;
        }
        assert!(locks.is_empty());
    }
}
