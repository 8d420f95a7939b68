use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::nation::NationId;
use super::timestamp::SimTimestamp;

/// Days a pending offer stays open before it expires unanswered.
pub const OFFER_EXPIRY_DAYS: u32 = 7;

/// Agreement length when the offer does not specify one.
pub const DEFAULT_OFFER_DURATION_WEEKS: u32 = 52;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

/// A bilateral trade proposal. `offering` is what `from` would export to
/// `to` every week of the agreement; `requesting` flows the other way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeOffer {
    pub id: u64,
    pub from: NationId,
    pub to: NationId,
    pub offering: BTreeMap<String, f64>,
    pub requesting: BTreeMap<String, f64>,
    pub duration_weeks: u32,
    pub status: OfferStatus,
    pub created: SimTimestamp,
    pub expires: SimTimestamp,
}

impl TradeOffer {
    pub fn is_pending(&self) -> bool {
        self.status == OfferStatus::Pending
    }

    /// What `nation` would have to export each week under this offer.
    ///
    /// # Panics
    /// Panics if `nation` is not a party to the offer.
    pub fn exports_of(&self, nation: NationId) -> &BTreeMap<String, f64> {
        if nation == self.from {
            &self.offering
        } else if nation == self.to {
            &self.requesting
        } else {
            panic!("nation {nation} is not a party to offer {}", self.id)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementStatus {
    Active,
    /// Embargo in force between the parties; no transfers, no countdown.
    Suspended,
    /// Cancelled by one of the parties before running out.
    Cancelled,
    /// Ran its full duration.
    Expired,
}

/// One nation's half of an agreement's terms.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TradeSide {
    pub exports: BTreeMap<String, f64>,
    pub imports: BTreeMap<String, f64>,
}

/// An accepted, weekly-settling trade agreement between two nations.
///
/// Terms are symmetric by construction: each side's exports are the other
/// side's imports. The pair is stored low id first so agreements sort and
/// lock in a fixed total order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeAgreement {
    pub id: u64,
    pub nations: (NationId, NationId),
    pub terms: BTreeMap<NationId, TradeSide>,
    pub weeks_remaining: u32,
    pub status: AgreementStatus,
    /// Weekly value of the offered bundle at catalog prices.
    pub value: f64,
}

impl TradeAgreement {
    pub fn involves(&self, nation: NationId) -> bool {
        self.nations.0 == nation || self.nations.1 == nation
    }

    pub fn counterpart(&self, nation: NationId) -> Option<NationId> {
        if self.nations.0 == nation {
            Some(self.nations.1)
        } else if self.nations.1 == nation {
            Some(self.nations.0)
        } else {
            None
        }
    }

    pub fn side(&self, nation: NationId) -> Option<&TradeSide> {
        self.terms.get(&nation)
    }

    pub fn is_active(&self) -> bool {
        self.status == AgreementStatus::Active
    }

    /// Each side's exports must equal the counterpart's imports, resource
    /// for resource.
    pub fn terms_are_symmetric(&self) -> bool {
        let (a, b) = self.nations;
        match (self.terms.get(&a), self.terms.get(&b)) {
            (Some(side_a), Some(side_b)) => {
                side_a.exports == side_b.imports && side_b.exports == side_a.imports
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries
            .iter()
            .map(|(resource, amount)| (resource.to_string(), *amount))
            .collect()
    }

    #[test]
    fn symmetric_terms_detected() {
        let mut terms = BTreeMap::new();
        terms.insert(
            1,
            TradeSide {
                exports: bundle(&[("oil", 10.0)]),
                imports: bundle(&[("food", 5.0)]),
            },
        );
        terms.insert(
            2,
            TradeSide {
                exports: bundle(&[("food", 5.0)]),
                imports: bundle(&[("oil", 10.0)]),
            },
        );
        let agreement = TradeAgreement {
            id: 7,
            nations: (1, 2),
            terms,
            weeks_remaining: 26,
            status: AgreementStatus::Active,
            value: 600.0,
        };
        assert!(agreement.terms_are_symmetric());
        assert_eq!(agreement.counterpart(1), Some(2));
        assert_eq!(agreement.counterpart(3), None);
    }

    #[test]
    fn asymmetric_terms_detected() {
        let mut terms = BTreeMap::new();
        terms.insert(
            1,
            TradeSide {
                exports: bundle(&[("oil", 10.0)]),
                imports: bundle(&[("food", 5.0)]),
            },
        );
        terms.insert(
            2,
            TradeSide {
                exports: bundle(&[("food", 4.0)]),
                imports: bundle(&[("oil", 10.0)]),
            },
        );
        let agreement = TradeAgreement {
            id: 7,
            nations: (1, 2),
            terms,
            weeks_remaining: 26,
            status: AgreementStatus::Active,
            value: 600.0,
        };
        assert!(!agreement.terms_are_symmetric());
    }
}
