//! Pool size maintenance.

use crate::decoy::decoy_entry;
use rollcall_store::{PoolStats, PoolStore, StoreError};
use rollcall_types::{SessionId, SessionParams, Timestamp};
use rollcall_utils::Clock;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("pool store error: {0}")]
    Store(#[from] StoreError),
}

/// Keeps a session's display pool at its minimum size.
///
/// The balancer only ever adds or removes decoys; real entries belong to
/// the attendance service. With no real-entry churn in between, repeated
/// calls to [`PoolBalancer::balance`] are no-ops after the first.
pub struct PoolBalancer {
    pool: Arc<dyn PoolStore>,
    clock: Arc<dyn Clock>,
    params: SessionParams,
}

impl PoolBalancer {
    pub fn new(pool: Arc<dyn PoolStore>, clock: Arc<dyn Clock>, params: SessionParams) -> Self {
        Self { pool, clock, params }
    }

    /// Decoys required to pad `real` entries up to the minimum pool size.
    pub fn fakes_needed(&self, real: usize) -> usize {
        self.params.min_pool_size.saturating_sub(real)
    }

    /// Move the pool toward its target composition.
    ///
    /// Adds decoys when the pool is short, removes surplus decoys when real
    /// entries have grown past the minimum. Returns the resulting stats.
    pub fn balance(&self, session: &SessionId) -> Result<PoolStats, PoolError> {
        let stats = self.pool.stats(session)?;
        let target = self.fakes_needed(stats.students);

        if stats.fakes < target {
            let missing = target - stats.fakes;
            self.inject_fakes(session, missing)?;
            tracing::debug!(session = %session, added = missing, "padded display pool");
        } else if stats.fakes > target {
            let surplus = stats.fakes - target;
            let removed = self.pool.remove_decoys(session, surplus)?;
            tracing::debug!(session = %session, removed, "trimmed display pool");
        }

        Ok(self.pool.stats(session)?)
    }

    /// Add `count` decoys unconditionally.
    pub fn inject_fakes(&self, session: &SessionId, count: usize) -> Result<(), PoolError> {
        let now = self.now();
        for _ in 0..count {
            self.pool.add(decoy_entry(session, &self.params, now))?;
        }
        Ok(())
    }

    fn now(&self) -> Timestamp {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_nullables::NullClock;
    use rollcall_store::PoolEntry;
    use rollcall_store_memory::MemoryStore;
    use rollcall_types::StudentId;

    fn setup() -> (Arc<MemoryStore>, PoolBalancer, SessionId) {
        let clock = Arc::new(NullClock::new(5_000));
        let store = Arc::new(MemoryStore::with_clock(clock.clone()));
        let balancer = PoolBalancer::new(store.clone(), clock, SessionParams::default());
        (store, balancer, SessionId::new("lab-1"))
    }

    fn real_entry(session: &SessionId, student: u64) -> PoolEntry {
        PoolEntry {
            session_id: session.clone(),
            owner: Some(StudentId::new(student)),
            ciphertext: format!("iv.ct{student}.tag"),
            round: 1,
        }
    }

    #[test]
    fn fakes_needed_saturates_at_zero() {
        let (_, balancer, _) = setup();
        assert_eq!(balancer.fakes_needed(0), 8);
        assert_eq!(balancer.fakes_needed(3), 5);
        assert_eq!(balancer.fakes_needed(8), 0);
        assert_eq!(balancer.fakes_needed(20), 0);
    }

    #[test]
    fn empty_pool_is_padded_to_minimum() {
        let (_, balancer, session) = setup();
        let stats = balancer.balance(&session).unwrap();
        assert_eq!(stats.total, 8);
        assert_eq!(stats.students, 0);
        assert_eq!(stats.fakes, 8);
    }

    #[test]
    fn balance_is_idempotent_without_real_churn() {
        let (store, balancer, session) = setup();
        balancer.balance(&session).unwrap();
        let before = store.entries(&session).unwrap();

        let stats = balancer.balance(&session).unwrap();
        assert_eq!(stats.total, 8);
        assert_eq!(store.entries(&session).unwrap(), before);
    }

    #[test]
    fn real_entries_reduce_the_decoy_target() {
        let (store, balancer, session) = setup();
        for id in 1..=3 {
            store.add(real_entry(&session, id)).unwrap();
        }

        let stats = balancer.balance(&session).unwrap();
        assert_eq!(stats.students, 3);
        assert_eq!(stats.fakes, 5);
        assert_eq!(stats.total, 8);
    }

    #[test]
    fn surplus_decoys_are_trimmed_as_students_join() {
        let (store, balancer, session) = setup();
        balancer.balance(&session).unwrap();

        for id in 1..=6 {
            store.add(real_entry(&session, id)).unwrap();
        }
        let stats = balancer.balance(&session).unwrap();
        assert_eq!(stats.students, 6);
        assert_eq!(stats.fakes, 2);
    }

    #[test]
    fn balance_never_removes_real_entries() {
        let (store, balancer, session) = setup();
        for id in 1..=12 {
            store.add(real_entry(&session, id)).unwrap();
        }

        let stats = balancer.balance(&session).unwrap();
        assert_eq!(stats.students, 12);
        assert_eq!(stats.fakes, 0);
        assert_eq!(stats.total, 12);
    }

    #[test]
    fn inject_fakes_bypasses_the_target() {
        let (store, balancer, session) = setup();
        balancer.inject_fakes(&session, 3).unwrap();
        let stats = store.stats(&session).unwrap();
        assert_eq!(stats.fakes, 3);
    }

    #[test]
    fn sessions_are_balanced_independently() {
        let (store, balancer, session) = setup();
        let other = SessionId::new("lab-2");
        balancer.balance(&session).unwrap();

        assert_eq!(store.stats(&other).unwrap().total, 0);
    }
}
