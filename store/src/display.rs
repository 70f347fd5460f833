//! Display output collaborator.

use crate::PoolEntry;

/// Receiver for what the projector should show.
///
/// Implementations push frames over whatever transport the deployment uses
/// (websocket, SSE, a local window). Countdown errors are fatal to the
/// projection; emission errors are not.
pub trait DisplaySink: Send + Sync {
    /// One countdown tick, with the seconds remaining.
    fn countdown_tick(&self, remaining_secs: u64) -> anyhow::Result<()>;

    /// One pool snapshot for the display grid.
    fn emit(&self, entries: &[PoolEntry]) -> anyhow::Result<()>;
}
