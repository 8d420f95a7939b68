use super::EngineError;
use super::context::TickContext;

/// A pluggable engine system that runs once per weekly tick.
///
/// Object-safe so systems can be stored as `Box<dyn WeeklySystem>`.
pub trait WeeklySystem {
    fn name(&self) -> &str;

    /// Phase 1 work for the week. Numeric state changes go through
    /// `ctx.stage`; lifecycle transitions (offer/agreement status) apply to
    /// the world directly.
    fn tick(&mut self, ctx: &mut TickContext) -> Result<(), EngineError>;

    /// React to signals emitted by other systems during Phase 1 (`tick()`).
    ///
    /// Called once per dispatch cycle with the full signal buffer in
    /// `ctx.inbox`. Signals pushed to `ctx.signals` here are **not**
    /// re-delivered (single-pass). Default: no-op.
    fn handle_signals(&mut self, ctx: &mut TickContext) -> Result<(), EngineError> {
        let _ = ctx;
        Ok(())
    }
}
