use std::collections::BTreeMap;

use serde::Serialize;

use super::EngineError;
use super::context::TickContext;
use super::shortage::{ResourceStatus, analyze_nation};
use super::signal::{Signal, SignalKind};
use super::system::WeeklySystem;
use crate::model::{
    AgreementStatus, CatalogError, Nation, NationId, OFFER_EXPIRY_DAYS, OfferStatus,
    ResourceCatalog, TradeAgreement, TradeOffer, TradeSide, World,
};

/// Weeks of consumption an AI keeps in reserve before exporting.
pub const EXPORT_BUFFER_WEEKS: f64 = 8.0;
/// Production must exceed this multiple of consumption to export at all.
pub const EXPORT_PRODUCTION_RATIO: f64 = 1.2;
/// A partner's exportable surplus is capped at this many weeks of its production.
pub const PARTNER_SURPLUS_CAP_WEEKS: f64 = 4.0;
/// Share of a surplus the AI is willing to put on the table.
pub const SURPLUS_OFFER_SHARE: f64 = 0.5;
/// Severity above which a shortage makes a resource worth trading for.
pub const TRADE_INTEREST_SEVERITY: f64 = 0.2;
pub const AI_OFFER_DURATION_WEEKS: u32 = 26;

/// Fairness band the AI will propose within.
pub const AI_FAIRNESS_MIN: f64 = 0.7;
pub const AI_FAIRNESS_MAX: f64 = 1.4;
/// Wider fairness band the AI will still accept.
pub const EVAL_FAIRNESS_MIN: f64 = 0.5;
pub const EVAL_FAIRNESS_MAX: f64 = 2.0;

const PRIORITY_PER_UNIT: f64 = 0.1;
const ALLY_PRIORITY_BONUS: f64 = 0.5;
/// Exports that would leave fewer weeks of supply than this count against
/// an offer.
const SUPPLY_COMFORT_WEEKS: f64 = 12.0;

/// Catalog-priced value of both sides of a proposed exchange.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct TradeValuation {
    pub offering_value: f64,
    pub requesting_value: f64,
    /// Offered value over requested value; 1.0 when nothing is requested.
    pub fairness: f64,
}

pub fn calculate_trade_value(
    catalog: &ResourceCatalog,
    offering: &BTreeMap<String, f64>,
    requesting: &BTreeMap<String, f64>,
) -> Result<TradeValuation, CatalogError> {
    let offering_value = bundle_value(catalog, offering)?;
    let requesting_value = bundle_value(catalog, requesting)?;
    let fairness = if requesting_value > 0.0 {
        offering_value / requesting_value
    } else {
        1.0
    };
    Ok(TradeValuation {
        offering_value,
        requesting_value,
        fairness,
    })
}

fn bundle_value(
    catalog: &ResourceCatalog,
    bundle: &BTreeMap<String, f64>,
) -> Result<f64, CatalogError> {
    let mut value = 0.0;
    for (resource, amount) in bundle {
        value += amount * catalog.price(resource)?;
    }
    Ok(value)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MissingResource {
    pub resource: String,
    pub required: f64,
    pub available: f64,
}

/// Structured fulfillment check result — a shortfall is data, not an error.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Fulfillment {
    pub fulfillable: bool,
    pub missing: Vec<MissingResource>,
}

/// Whether `nation` holds enough stock to cover its export side of `offer`.
pub fn can_fulfill_offer(nation: &Nation, offer: &TradeOffer) -> Fulfillment {
    let mut missing = Vec::new();
    for (resource, &required) in offer.exports_of(nation.id) {
        let available = nation.stockpile(resource);
        if available < required {
            missing.push(MissingResource {
                resource: resource.clone(),
                required,
                available,
            });
        }
    }
    Fulfillment {
        fulfillable: missing.is_empty(),
        missing,
    }
}

/// Create a pending offer from `from` to `to`, expiring in seven days.
/// Validates both parties and every referenced resource up front.
pub fn create_offer(
    world: &mut World,
    from: NationId,
    to: NationId,
    offering: BTreeMap<String, f64>,
    requesting: BTreeMap<String, f64>,
    duration_weeks: u32,
) -> Result<u64, EngineError> {
    for nation in [from, to] {
        if !world.nations.contains_key(&nation) {
            return Err(EngineError::UnknownNation(nation));
        }
    }
    for resource in offering.keys().chain(requesting.keys()) {
        world.catalog.get(resource)?;
    }
    let created = world.current_time;
    let id = world.id_gen.next_id();
    world.offers.insert(
        id,
        TradeOffer {
            id,
            from,
            to,
            offering,
            requesting,
            duration_weeks,
            status: OfferStatus::Pending,
            created,
            expires: created.plus_days(OFFER_EXPIRY_DAYS),
        },
    );
    Ok(id)
}

/// Accept a pending offer, producing an active agreement with symmetric
/// terms. The agreement's value is the offered bundle's catalog value.
pub fn accept_offer(world: &mut World, offer_id: u64) -> Result<u64, EngineError> {
    let offer = world
        .offers
        .get(&offer_id)
        .ok_or(EngineError::UnknownOffer(offer_id))?;
    if !offer.is_pending() {
        return Err(EngineError::OfferNotPending(offer_id));
    }
    let valuation = calculate_trade_value(&world.catalog, &offer.offering, &offer.requesting)?;
    let offer = world.offers.get_mut(&offer_id).expect("offer just read");
    offer.status = OfferStatus::Accepted;

    let mut terms = BTreeMap::new();
    terms.insert(
        offer.from,
        TradeSide {
            exports: offer.offering.clone(),
            imports: offer.requesting.clone(),
        },
    );
    terms.insert(
        offer.to,
        TradeSide {
            exports: offer.requesting.clone(),
            imports: offer.offering.clone(),
        },
    );
    let nations = if offer.from < offer.to {
        (offer.from, offer.to)
    } else {
        (offer.to, offer.from)
    };
    let weeks_remaining = offer.duration_weeks;

    let agreement_id = world.id_gen.next_id();
    world.agreements.insert(
        agreement_id,
        TradeAgreement {
            id: agreement_id,
            nations,
            terms,
            weeks_remaining,
            status: AgreementStatus::Active,
            value: valuation.offering_value,
        },
    );
    Ok(agreement_id)
}

/// Stock beyond the reserve buffer, for resources produced comfortably
/// above consumption. Empty for a nation with nothing to spare.
fn exportable_surplus(nation: &Nation) -> BTreeMap<String, f64> {
    let mut surplus = BTreeMap::new();
    for resource in nation.ledger_resources() {
        let production = nation.production_of(resource);
        let consumption = nation.consumption_of(resource);
        let stockpile = nation.stockpile(resource);
        let buffer = EXPORT_BUFFER_WEEKS * consumption;
        if production > EXPORT_PRODUCTION_RATIO * consumption && stockpile > buffer {
            surplus.insert(resource.to_string(), stockpile - buffer);
        }
    }
    surplus
}

/// Severity of the nation's current shortage per resource (shortage and
/// critical states only).
fn shortage_severities(nation: &Nation) -> BTreeMap<String, f64> {
    analyze_nation(nation)
        .into_values()
        .filter(|r| {
            matches!(
                r.status,
                ResourceStatus::Shortage | ResourceStatus::Critical
            )
        })
        .map(|r| (r.resource, r.severity))
        .collect()
}

/// Propose a trade on behalf of an AI nation.
///
/// Walks `candidates` in order, skipping enemies and embargoed partners,
/// and emits one pending offer for the first candidate where both sides
/// have something the other needs and the terms land in the fairness band.
/// Returns the offer id, or `None` when no candidate qualifies.
pub fn generate_ai_offer(
    world: &mut World,
    nation_id: NationId,
    candidates: &[NationId],
) -> Result<Option<u64>, EngineError> {
    let nation = world
        .nations
        .get(&nation_id)
        .ok_or(EngineError::UnknownNation(nation_id))?;
    let own_surplus = exportable_surplus(nation);
    let own_needs = shortage_severities(nation);

    for &candidate in candidates {
        if candidate == nation_id {
            continue;
        }
        let partner = world
            .nations
            .get(&candidate)
            .ok_or(EngineError::UnknownNation(candidate))?;
        let nation = world.nation(nation_id);
        if nation.is_enemy(candidate) || nation.trade_blocked_with(partner) {
            continue;
        }

        let partner_needs = shortage_severities(partner);
        let mut partner_surplus = exportable_surplus(partner);
        for (resource, amount) in partner_surplus.iter_mut() {
            let cap = PARTNER_SURPLUS_CAP_WEEKS * partner.production_of(resource);
            *amount = amount.min(cap);
        }

        let offering: BTreeMap<String, f64> = own_surplus
            .iter()
            .filter(|(resource, _)| {
                partner_needs
                    .get(*resource)
                    .is_some_and(|&s| s > TRADE_INTEREST_SEVERITY)
            })
            .map(|(resource, &surplus)| (resource.clone(), SURPLUS_OFFER_SHARE * surplus))
            .collect();
        let requesting: BTreeMap<String, f64> = partner_surplus
            .iter()
            .filter(|(resource, _)| {
                own_needs
                    .get(*resource)
                    .is_some_and(|&s| s > TRADE_INTEREST_SEVERITY)
            })
            .map(|(resource, &surplus)| (resource.clone(), SURPLUS_OFFER_SHARE * surplus))
            .collect();
        if offering.is_empty() || requesting.is_empty() {
            continue;
        }

        let valuation = calculate_trade_value(&world.catalog, &offering, &requesting)?;
        if valuation.fairness < AI_FAIRNESS_MIN || valuation.fairness > AI_FAIRNESS_MAX {
            continue;
        }

        let offer_id = create_offer(
            world,
            nation_id,
            candidate,
            offering,
            requesting,
            AI_OFFER_DURATION_WEEKS,
        )?;
        return Ok(Some(offer_id));
    }
    Ok(None)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    CannotFulfill,
    Enemy,
    UnfairTerms,
}

/// An AI nation's verdict on an incoming offer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OfferDecision {
    pub accept: bool,
    pub priority: f64,
    pub reason: Option<RejectReason>,
}

impl OfferDecision {
    fn reject(reason: RejectReason) -> Self {
        Self {
            accept: false,
            priority: 0.0,
            reason: Some(reason),
        }
    }
}

/// Evaluate an incoming offer from `nation`'s point of view.
///
/// Hard rejections first (can't cover the exports, counterpart is an
/// enemy, terms outside the acceptance band); otherwise the offer is
/// scored by how badly the offered resources are needed against how much
/// the requested exports strain the nation's own supply.
pub fn evaluate_ai_offer(
    world: &World,
    nation_id: NationId,
    offer: &TradeOffer,
) -> Result<OfferDecision, EngineError> {
    let nation = world
        .nations
        .get(&nation_id)
        .ok_or(EngineError::UnknownNation(nation_id))?;

    let fulfillment = can_fulfill_offer(nation, offer);
    if !fulfillment.fulfillable {
        return Ok(OfferDecision::reject(RejectReason::CannotFulfill));
    }
    let counterpart = if nation_id == offer.to {
        offer.from
    } else {
        offer.to
    };
    if nation.is_enemy(counterpart) {
        return Ok(OfferDecision::reject(RejectReason::Enemy));
    }
    let valuation = calculate_trade_value(&world.catalog, &offer.offering, &offer.requesting)?;
    if valuation.fairness < EVAL_FAIRNESS_MIN || valuation.fairness > EVAL_FAIRNESS_MAX {
        return Ok(OfferDecision::reject(RejectReason::UnfairTerms));
    }

    let needs = shortage_severities(nation);
    let mut priority = 0.0;
    for (resource, &amount) in &offer.offering {
        if let Some(&severity) = needs.get(resource) {
            if severity > TRADE_INTEREST_SEVERITY {
                priority += severity * amount * PRIORITY_PER_UNIT;
            }
        }
    }
    for (resource, &amount) in &offer.requesting {
        let consumption = nation.consumption_of(resource);
        if consumption > 0.0 {
            let weeks_after = (nation.stockpile(resource) - amount) / consumption;
            if weeks_after < SUPPLY_COMFORT_WEEKS {
                priority -= amount * PRIORITY_PER_UNIT;
            }
        }
    }
    if nation.is_ally(counterpart) {
        priority += ALLY_PRIORITY_BONUS;
    }

    Ok(OfferDecision {
        accept: priority > 0.0,
        priority,
        reason: None,
    })
}

/// Weekly negotiation pass: AI nations answer the offers addressed to
/// them, stale offers expire, and idle AI nations put new offers on the
/// table. Answers run before expiry so an offer created exactly one tick
/// ago still gets its hearing.
pub struct TradeSystem;

impl WeeklySystem for TradeSystem {
    fn name(&self) -> &str {
        "trade"
    }

    fn tick(&mut self, ctx: &mut TickContext) -> Result<(), EngineError> {
        let week = ctx.world.current_time.week();
        let nation_ids: Vec<NationId> = ctx.world.nations.keys().copied().collect();

        // AI nations answer their mail.
        for &id in &nation_ids {
            if !ctx.world.nation(id).ai_controlled {
                continue;
            }
            for offer_id in ctx.world.pending_offers_to(id) {
                let offer = ctx.world.offers[&offer_id].clone();
                let decision = evaluate_ai_offer(ctx.world, id, &offer)?;
                if decision.accept {
                    let agreement_id = accept_offer(ctx.world, offer_id)?;
                    tracing::debug!(offer_id, agreement_id, nation = id, "offer accepted");
                    ctx.signals.push(Signal {
                        week,
                        kind: SignalKind::OfferAccepted {
                            offer_id,
                            agreement_id,
                        },
                    });
                } else {
                    let offer = ctx.world.offers.get_mut(&offer_id).expect("offer exists");
                    offer.status = OfferStatus::Rejected;
                    tracing::debug!(offer_id, nation = id, reason = ?decision.reason, "offer rejected");
                    ctx.signals.push(Signal {
                        week,
                        kind: SignalKind::OfferRejected { offer_id, by: id },
                    });
                }
            }
        }

        // Unanswered offers past their expiry date lapse.
        let now = ctx.world.current_time;
        let stale: Vec<u64> = ctx
            .world
            .offers
            .values()
            .filter(|o| o.is_pending() && now >= o.expires)
            .map(|o| o.id)
            .collect();
        for offer_id in stale {
            ctx.world.offers.get_mut(&offer_id).expect("offer exists").status =
                OfferStatus::Expired;
            ctx.signals.push(Signal {
                week,
                kind: SignalKind::OfferExpired { offer_id },
            });
        }

        // Idle AI nations look for a new partner.
        for &id in &nation_ids {
            let nation = ctx.world.nation(id);
            if !nation.ai_controlled || ctx.world.has_pending_offer_from(id) {
                continue;
            }
            let candidates: Vec<NationId> =
                nation_ids.iter().copied().filter(|&c| c != id).collect();
            if let Some(offer_id) = generate_ai_offer(ctx.world, id, &candidates)? {
                let offer = &ctx.world.offers[&offer_id];
                ctx.signals.push(Signal {
                    week,
                    kind: SignalKind::OfferCreated {
                        offer_id,
                        from: offer.from,
                        to: offer.to,
                    },
                });
            }
        }
        Ok(())
    }
}
