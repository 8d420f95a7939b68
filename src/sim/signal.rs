use serde::{Deserialize, Serialize};

use crate::model::NationId;

/// A signal emitted by one system and consumed by others (and by the
/// calling game shell, which receives the full buffer in the week report).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// Week the signal was emitted, for provenance in exported logs.
    pub week: u32,
    pub kind: SignalKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalKind {
    /// A resource fell below two weeks of supply.
    ShortageCritical {
        nation: NationId,
        resource: String,
        severity: f64,
    },

    /// A new trade offer entered the pending queue.
    OfferCreated {
        offer_id: u64,
        from: NationId,
        to: NationId,
    },

    /// A pending offer was accepted, producing an agreement.
    OfferAccepted { offer_id: u64, agreement_id: u64 },

    /// A pending offer was turned down by its recipient.
    OfferRejected { offer_id: u64, by: NationId },

    /// A pending offer sat unanswered past its expiry date.
    OfferExpired { offer_id: u64 },

    /// An agreement settled this week's transfers in full.
    AgreementExecuted { agreement_id: u64, value: f64 },

    /// An embargo between the parties put an agreement on hold.
    AgreementSuspended {
        agreement_id: u64,
        nations: (NationId, NationId),
    },

    /// The embargo lifted and the agreement went back to active.
    AgreementResumed { agreement_id: u64 },

    /// An agreement ran out its full duration.
    AgreementExpired { agreement_id: u64 },

    /// One side could not cover its exports; nothing moved this week.
    TransferFailed {
        agreement_id: u64,
        nation: NationId,
        missing: Vec<(String, f64)>,
    },
}
