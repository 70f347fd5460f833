//! The `MemoryStore` — every storage trait over mutex-guarded maps.

use rollcall_session::StudentSessionState;
use rollcall_store::{
    PoolEntry, PoolStats, PoolStore, QrStore, StoreError, StoredPayload, StudentStateStore,
    Versioned,
};
use rollcall_types::{SessionId, StudentId, Timestamp};
use rollcall_utils::{Clock, SystemClock};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

struct QrSlot {
    record: StoredPayload,
    expires_at_ms: u64,
}

/// In-memory implementation of [`QrStore`], [`StudentStateStore`] and
/// [`PoolStore`] with lazy TTL expiry against an injectable clock.
pub struct MemoryStore {
    clock: Arc<dyn Clock>,
    qr: Mutex<HashMap<String, QrSlot>>,
    students: Mutex<HashMap<(SessionId, StudentId), Versioned<StudentSessionState>>>,
    pool: Mutex<Vec<PoolEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Construct with a caller-supplied clock (deterministic tests).
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            qr: Mutex::new(HashMap::new()),
            students: Mutex::new(HashMap::new()),
            pool: Mutex::new(Vec::new()),
        }
    }

    /// Drop all expired QR records eagerly. `get` already treats expired
    /// records as absent; this reclaims the memory.
    pub fn purge_expired(&self) {
        let now = self.clock.now().as_millis();
        self.qr
            .lock()
            .expect("qr lock poisoned")
            .retain(|_, slot| slot.expires_at_ms > now);
    }

    fn now_ms(&self) -> u64 {
        self.clock.now().as_millis()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl QrStore for MemoryStore {
    fn put(&self, record: StoredPayload, ttl_secs: u64) -> Result<(), StoreError> {
        let expires_at_ms = self.now_ms().saturating_add(ttl_secs.saturating_mul(1_000));
        let nonce = record.nonce().to_string();
        self.qr
            .lock()
            .expect("qr lock poisoned")
            .insert(nonce, QrSlot {
                record,
                expires_at_ms,
            });
        Ok(())
    }

    fn get(&self, nonce: &str) -> Result<Option<StoredPayload>, StoreError> {
        let now = self.now_ms();
        let map = self.qr.lock().expect("qr lock poisoned");
        Ok(map
            .get(nonce)
            .filter(|slot| slot.expires_at_ms > now)
            .map(|slot| slot.record.clone()))
    }

    fn mark_consumed(
        &self,
        nonce: &str,
        by: StudentId,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        let now = self.now_ms();
        let mut map = self.qr.lock().expect("qr lock poisoned");
        let slot = map
            .get_mut(nonce)
            .filter(|slot| slot.expires_at_ms > now)
            .ok_or_else(|| StoreError::NotFound(nonce.to_string()))?;

        if slot.record.consumed {
            return Err(StoreError::AlreadyConsumed(nonce.to_string()));
        }
        slot.record.consumed = true;
        slot.record.consumed_by = Some(by);
        slot.record.consumed_at = Some(at);
        Ok(())
    }

    fn remove(&self, nonce: &str) -> Result<(), StoreError> {
        self.qr.lock().expect("qr lock poisoned").remove(nonce);
        Ok(())
    }

    fn ttl_ms(&self, nonce: &str) -> Result<Option<u64>, StoreError> {
        let now = self.now_ms();
        let map = self.qr.lock().expect("qr lock poisoned");
        Ok(map
            .get(nonce)
            .map(|slot| slot.expires_at_ms.saturating_sub(now))
            .filter(|&remaining| remaining > 0))
    }
}

impl StudentStateStore for MemoryStore {
    fn get(
        &self,
        session: &SessionId,
        student: StudentId,
    ) -> Result<Option<Versioned<StudentSessionState>>, StoreError> {
        let map = self.students.lock().expect("student lock poisoned");
        Ok(map.get(&(session.clone(), student)).cloned())
    }

    fn insert(
        &self,
        state: StudentSessionState,
    ) -> Result<Versioned<StudentSessionState>, StoreError> {
        let key = (state.session_id.clone(), state.student_id);
        let mut map = self.students.lock().expect("student lock poisoned");
        if map.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "{}/{}",
                key.0, key.1
            )));
        }
        let versioned = Versioned {
            value: state,
            version: 1,
        };
        map.insert(key, versioned.clone());
        Ok(versioned)
    }

    fn compare_and_put(
        &self,
        state: StudentSessionState,
        expected_version: u64,
    ) -> Result<Versioned<StudentSessionState>, StoreError> {
        let key = (state.session_id.clone(), state.student_id);
        let mut map = self.students.lock().expect("student lock poisoned");
        let current = map
            .get(&key)
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", key.0, key.1)))?;

        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                key: format!("{}/{}", key.0, key.1),
                expected: expected_version,
                found: current.version,
            });
        }
        let next = Versioned {
            value: state,
            version: expected_version + 1,
        };
        map.insert(key, next.clone());
        Ok(next)
    }

    fn all_for_session(
        &self,
        session: &SessionId,
    ) -> Result<Vec<Versioned<StudentSessionState>>, StoreError> {
        let map = self.students.lock().expect("student lock poisoned");
        Ok(map
            .iter()
            .filter(|((sid, _), _)| sid == session)
            .map(|(_, v)| v.clone())
            .collect())
    }
}

impl PoolStore for MemoryStore {
    fn add(&self, entry: PoolEntry) -> Result<(), StoreError> {
        self.pool.lock().expect("pool lock poisoned").push(entry);
        Ok(())
    }

    fn entries(&self, session: &SessionId) -> Result<Vec<PoolEntry>, StoreError> {
        let pool = self.pool.lock().expect("pool lock poisoned");
        Ok(pool
            .iter()
            .filter(|e| &e.session_id == session)
            .cloned()
            .collect())
    }

    fn stats(&self, session: &SessionId) -> Result<PoolStats, StoreError> {
        let pool = self.pool.lock().expect("pool lock poisoned");
        let mut stats = PoolStats {
            total: 0,
            students: 0,
            fakes: 0,
        };
        for entry in pool.iter().filter(|e| &e.session_id == session) {
            stats.total += 1;
            if entry.is_decoy() {
                stats.fakes += 1;
            } else {
                stats.students += 1;
            }
        }
        Ok(stats)
    }

    fn remove_decoys(&self, session: &SessionId, count: usize) -> Result<usize, StoreError> {
        let mut pool = self.pool.lock().expect("pool lock poisoned");
        let mut removed = 0;
        pool.retain(|e| {
            if removed < count && &e.session_id == session && e.is_decoy() {
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    fn replace_student_entry(&self, entry: PoolEntry) -> Result<(), StoreError> {
        if entry.owner.is_none() {
            return Err(StoreError::Backend(
                "replace_student_entry requires an owner".to_string(),
            ));
        }
        let mut pool = self.pool.lock().expect("pool lock poisoned");
        pool.retain(|e| !(e.session_id == entry.session_id && e.owner == entry.owner));
        pool.push(entry);
        Ok(())
    }

    fn remove_student_entry(
        &self,
        session: &SessionId,
        student: StudentId,
    ) -> Result<(), StoreError> {
        let mut pool = self.pool.lock().expect("pool lock poisoned");
        pool.retain(|e| !(&e.session_id == session && e.owner == Some(student)));
        Ok(())
    }

    fn clear_session(&self, session: &SessionId) -> Result<(), StoreError> {
        let mut pool = self.pool.lock().expect("pool lock poisoned");
        pool.retain(|e| &e.session_id != session);
        Ok(())
    }
}
