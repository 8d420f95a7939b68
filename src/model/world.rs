use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::nation::{Nation, NationId};
use super::province::{Province, ProvinceId};
use super::resource::{CatalogError, ResourceCatalog};
use super::timestamp::SimTimestamp;
use super::trade::{TradeAgreement, TradeOffer};
use crate::id::IdGenerator;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("province {province} is owned by unknown nation {owner}")]
    OrphanProvince { province: ProvinceId, owner: NationId },
    #[error("offer {offer} references unknown nation {nation}")]
    OfferNation { offer: u64, nation: NationId },
    #[error("agreement {agreement} references unknown nation {nation}")]
    AgreementNation { agreement: u64, nation: NationId },
    #[error("agreement {agreement} terms are not symmetric")]
    AsymmetricTerms { agreement: u64 },
}

/// The full engine state: every nation, province, offer, and agreement,
/// plus the validated resource catalog and the game clock.
///
/// Offers and agreements live in world-level maps rather than inside the
/// nations they involve; `BTreeMap` keys give deterministic iteration and
/// the ascending-id order the settlement pass relies on.
#[derive(Debug, Serialize, Deserialize)]
pub struct World {
    pub nations: BTreeMap<NationId, Nation>,
    pub provinces: BTreeMap<ProvinceId, Province>,
    pub offers: BTreeMap<u64, TradeOffer>,
    pub agreements: BTreeMap<u64, TradeAgreement>,
    pub catalog: ResourceCatalog,
    pub current_time: SimTimestamp,
    pub id_gen: IdGenerator,
}

impl World {
    pub fn new(catalog: ResourceCatalog) -> Self {
        Self {
            nations: BTreeMap::new(),
            provinces: BTreeMap::new(),
            offers: BTreeMap::new(),
            agreements: BTreeMap::new(),
            catalog,
            current_time: SimTimestamp::default(),
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a nation, assigning it a unique ID. Returns the assigned ID.
    pub fn add_nation(&mut self, name: impl Into<String>) -> NationId {
        let id = self.id_gen.next_id();
        self.nations.insert(id, Nation::new(id, name));
        id
    }

    /// Add a province owned by `owner`. Returns the assigned ID.
    ///
    /// # Panics
    /// Panics if `owner` does not exist in the world.
    pub fn add_province(&mut self, name: impl Into<String>, owner: NationId) -> ProvinceId {
        assert!(
            self.nations.contains_key(&owner),
            "add_province: nation {owner} not found"
        );
        let id = self.id_gen.next_id();
        self.provinces.insert(id, Province::new(id, name, owner));
        id
    }

    /// # Panics
    /// Panics if the nation does not exist. Use `nations.get` when absence
    /// is an expected case.
    pub fn nation(&self, id: NationId) -> &Nation {
        self.nations
            .get(&id)
            .unwrap_or_else(|| panic!("nation {id} not found"))
    }

    /// # Panics
    /// Panics if the nation does not exist.
    pub fn nation_mut(&mut self, id: NationId) -> &mut Nation {
        self.nations
            .get_mut(&id)
            .unwrap_or_else(|| panic!("nation {id} not found"))
    }

    pub fn provinces_of(&self, owner: NationId) -> impl Iterator<Item = &Province> {
        self.provinces.values().filter(move |p| p.owner == owner)
    }

    /// Pending offers addressed to `nation`, ascending id order.
    pub fn pending_offers_to(&self, nation: NationId) -> Vec<u64> {
        self.offers
            .values()
            .filter(|o| o.is_pending() && o.to == nation)
            .map(|o| o.id)
            .collect()
    }

    /// Whether `nation` already has an outgoing offer awaiting an answer.
    pub fn has_pending_offer_from(&self, nation: NationId) -> bool {
        self.offers
            .values()
            .any(|o| o.is_pending() && o.from == nation)
    }

    pub fn active_agreements_of(&self, nation: NationId) -> Vec<u64> {
        self.agreements
            .values()
            .filter(|a| a.is_active() && a.involves(nation))
            .map(|a| a.id)
            .collect()
    }

    /// Referential check run once at engine construction: every ledger,
    /// offer, and agreement resource must exist in the catalog, every
    /// cross-reference must resolve, and agreement terms must be symmetric.
    pub fn validate(&self) -> Result<(), WorldError> {
        for nation in self.nations.values() {
            for resource in nation.ledger_resources() {
                self.catalog.get(resource)?;
            }
        }
        for province in self.provinces.values() {
            if !self.nations.contains_key(&province.owner) {
                return Err(WorldError::OrphanProvince {
                    province: province.id,
                    owner: province.owner,
                });
            }
        }
        for offer in self.offers.values() {
            for nation in [offer.from, offer.to] {
                if !self.nations.contains_key(&nation) {
                    return Err(WorldError::OfferNation {
                        offer: offer.id,
                        nation,
                    });
                }
            }
            for resource in offer.offering.keys().chain(offer.requesting.keys()) {
                self.catalog.get(resource)?;
            }
        }
        for agreement in self.agreements.values() {
            for nation in [agreement.nations.0, agreement.nations.1] {
                if !self.nations.contains_key(&nation) {
                    return Err(WorldError::AgreementNation {
                        agreement: agreement.id,
                        nation,
                    });
                }
            }
            if !agreement.terms_are_symmetric() {
                return Err(WorldError::AsymmetricTerms {
                    agreement: agreement.id,
                });
            }
            for side in agreement.terms.values() {
                for resource in side.exports.keys().chain(side.imports.keys()) {
                    self.catalog.get(resource)?;
                }
            }
        }
        Ok(())
    }
}
