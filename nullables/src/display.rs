//! Display sink double that records everything pushed to it.

use rollcall_store::{DisplaySink, PoolEntry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct RecordingDisplay {
    ticks: Mutex<Vec<u64>>,
    frames: Mutex<Vec<Vec<PoolEntry>>>,
    emit_attempts: AtomicUsize,
    fail_countdown: bool,
    fail_emit: bool,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self {
            ticks: Mutex::new(Vec::new()),
            frames: Mutex::new(Vec::new()),
            emit_attempts: AtomicUsize::new(0),
            fail_countdown: false,
            fail_emit: false,
        }
    }

    /// Every countdown tick fails.
    pub fn failing_countdown() -> Self {
        Self {
            fail_countdown: true,
            ..Self::new()
        }
    }

    /// Every emission fails (attempts are still counted).
    pub fn failing_emit() -> Self {
        Self {
            fail_emit: true,
            ..Self::new()
        }
    }

    pub fn ticks(&self) -> Vec<u64> {
        self.ticks.lock().expect("display lock poisoned").clone()
    }

    pub fn frames(&self) -> Vec<Vec<PoolEntry>> {
        self.frames.lock().expect("display lock poisoned").clone()
    }

    pub fn emit_attempts(&self) -> usize {
        self.emit_attempts.load(Ordering::SeqCst)
    }
}

impl Default for RecordingDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySink for RecordingDisplay {
    fn countdown_tick(&self, remaining_secs: u64) -> anyhow::Result<()> {
        if self.fail_countdown {
            anyhow::bail!("display disconnected");
        }
        self.ticks
            .lock()
            .expect("display lock poisoned")
            .push(remaining_secs);
        Ok(())
    }

    fn emit(&self, entries: &[PoolEntry]) -> anyhow::Result<()> {
        self.emit_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_emit {
            anyhow::bail!("display disconnected");
        }
        self.frames
            .lock()
            .expect("display lock poisoned")
            .push(entries.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_types::SessionId;
    use std::sync::Arc;

    fn entry(round: u32) -> PoolEntry {
        PoolEntry {
            session_id: SessionId::new("lecture-1"),
            owner: None,
            ciphertext: "aGVsbG8=.d29ybGQ=.dGFn".into(),
            round,
        }
    }

    #[test]
    fn records_through_a_trait_object() {
        let display = Arc::new(RecordingDisplay::new());
        let sink: Arc<dyn DisplaySink> = display.clone();

        sink.countdown_tick(3).unwrap();
        sink.countdown_tick(2).unwrap();
        sink.emit(&[entry(1), entry(2)]).unwrap();

        assert_eq!(display.ticks(), vec![3, 2]);
        assert_eq!(display.frames().len(), 1);
        assert_eq!(display.frames()[0].len(), 2);
        assert_eq!(display.emit_attempts(), 1);
    }

    #[test]
    fn failing_emit_still_counts_attempts() {
        let display = RecordingDisplay::failing_emit();
        assert!(display.emit(&[entry(1)]).is_err());
        assert!(display.emit(&[]).is_err());
        assert_eq!(display.emit_attempts(), 2);
        assert!(display.frames().is_empty());
    }

    #[test]
    fn failing_countdown_records_nothing() {
        let display = RecordingDisplay::failing_countdown();
        assert!(display.countdown_tick(5).is_err());
        assert!(display.ticks().is_empty());
    }
}
