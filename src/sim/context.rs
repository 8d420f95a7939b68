use super::signal::Signal;
use super::stage::TickStage;
use crate::model::World;

/// Context passed to each system on every tick.
///
/// Bundled so we can add fields later without changing the `WeeklySystem`
/// trait signature. Ledger and effect deltas accumulate in `stage` and are
/// committed by the runner after every system has run, so an aborted tick
/// never leaves partial numeric mutations visible.
pub struct TickContext<'a> {
    pub world: &'a mut World,
    pub stage: &'a mut TickStage,
    /// Systems push signals here during tick/handle_signals.
    pub signals: &'a mut Vec<Signal>,
    /// Signals emitted by other systems in the previous pass (read-only).
    pub inbox: &'a [Signal],
}
