mod agreements;
mod alerts;
mod context;
mod effects;
mod ledger;
mod runner;
mod shortage;
mod signal;
mod stage;
mod system;
mod trade;

pub use agreements::AgreementSystem;
pub use alerts::{AlertDecision, AlertKind, AlertSettings, AlertSystem};
pub use context::TickContext;
pub use effects::{EffectSystem, ShortageEffect, shortage_effect};
pub use ledger::LedgerSystem;
pub use runner::{SimConfig, WeekReport, default_systems, dispatch_week, run};
pub use shortage::{ResourceStatus, ShortageReport, ShortageSystem, analyze_nation, analyze_resource};
pub use signal::{Signal, SignalKind};
pub use stage::{NationDelta, ProvinceDelta, TickStage};
pub use system::WeeklySystem;
pub use trade::{
    Fulfillment, MissingResource, OfferDecision, RejectReason, TradeSystem, TradeValuation,
    accept_offer, calculate_trade_value, can_fulfill_offer, create_offer, evaluate_ai_offer,
    generate_ai_offer,
};

use thiserror::Error;

use crate::model::{CatalogError, NationId, WorldError};

/// Errors surfaced by the engine. A referenced resource with no catalog
/// entry means the ingestion layer fed us inconsistent data, so catalog
/// misses are hard errors rather than zero-priced fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    World(#[from] WorldError),
    #[error("nation {0} not found")]
    UnknownNation(NationId),
    #[error("offer {0} not found")]
    UnknownOffer(u64),
    #[error("offer {0} is not pending")]
    OfferNotPending(u64),
}
