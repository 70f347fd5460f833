//! The projection phase machine.

use rollcall_pool::{PoolBalancer, PoolError};
use rollcall_store::{DisplaySink, PoolStore};
use rollcall_types::{SessionId, SessionParams};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The display rejected a countdown tick. The projection cannot start
    /// without a working display, so this aborts the run.
    #[error("countdown display failed: {0}")]
    Countdown(#[source] anyhow::Error),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ProjectionPhase {
    Countdown = 0,
    Balancing = 1,
    Emitting = 2,
    Stopped = 3,
}

impl ProjectionPhase {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Countdown,
            1 => Self::Balancing,
            2 => Self::Emitting,
            _ => Self::Stopped,
        }
    }
}

/// Runs one session's projection lifecycle.
///
/// The stop flag is shared with whoever controls the session; it is polled
/// before every tick and before every emission, so cancellation takes
/// effect within one tick of the current phase.
pub struct ProjectionOrchestrator {
    session_id: SessionId,
    params: SessionParams,
    pool: Arc<dyn PoolStore>,
    balancer: PoolBalancer,
    sink: Arc<dyn DisplaySink>,
    stop: Arc<AtomicBool>,
    phase: AtomicU8,
}

impl ProjectionOrchestrator {
    pub fn new(
        session_id: SessionId,
        params: SessionParams,
        pool: Arc<dyn PoolStore>,
        balancer: PoolBalancer,
        sink: Arc<dyn DisplaySink>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            session_id,
            params,
            pool,
            balancer,
            sink,
            stop,
            phase: AtomicU8::new(ProjectionPhase::Countdown as u8),
        }
    }

    pub fn phase(&self) -> ProjectionPhase {
        ProjectionPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn set_phase(&self, phase: ProjectionPhase) {
        self.phase.store(phase as u8, Ordering::Release);
        tracing::debug!(session = %self.session_id, ?phase, "projection phase");
    }

    /// Run the full lifecycle. Returns when stopped or on a fatal error.
    pub async fn run(&self) -> Result<(), ProjectionError> {
        if let Err(e) = self.countdown().await {
            self.set_phase(ProjectionPhase::Stopped);
            return Err(e);
        }
        if self.stopped() {
            self.set_phase(ProjectionPhase::Stopped);
            return Ok(());
        }

        self.set_phase(ProjectionPhase::Balancing);
        self.balancer.balance(&self.session_id)?;

        self.set_phase(ProjectionPhase::Emitting);
        self.emission_loop().await;

        self.set_phase(ProjectionPhase::Stopped);
        Ok(())
    }

    async fn countdown(&self) -> Result<(), ProjectionError> {
        for remaining in (1..=self.params.countdown_secs).rev() {
            if self.stopped() {
                return Ok(());
            }
            self.sink
                .countdown_tick(remaining)
                .map_err(ProjectionError::Countdown)?;
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        Ok(())
    }

    async fn emission_loop(&self) {
        let interval = Duration::from_millis(self.params.emit_interval_ms.max(1));
        loop {
            if self.stopped() {
                return;
            }
            match self.pool.entries(&self.session_id) {
                Ok(entries) => {
                    if let Err(e) = self.sink.emit(&entries) {
                        tracing::warn!(session = %self.session_id, error = %e, "display emission failed");
                    }
                }
                Err(e) => {
                    tracing::warn!(session = %self.session_id, error = %e, "pool snapshot failed");
                }
            }
            tokio::time::sleep(interval).await;
        }
    }
}
