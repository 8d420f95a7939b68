use super::EngineError;
use super::context::TickContext;
use super::signal::{Signal, SignalKind};
use super::system::WeeklySystem;
use crate::model::{AgreementStatus, NationId, TradeAgreement, World};

/// Weekly settlement of active trade agreements.
///
/// Agreements settle in ascending id order, which doubles as the fixed
/// total order on nation pairs: any parallel split of this pass must take
/// the pair locks in the same sequence.
///
/// Settlement is two-phase: feasibility of BOTH sides is checked against
/// the staged ledgers before anything is staged, so a failed week moves
/// nothing for either party and the agreement is never half-settled.
pub struct AgreementSystem;

impl WeeklySystem for AgreementSystem {
    fn name(&self) -> &str {
        "agreements"
    }

    fn tick(&mut self, ctx: &mut TickContext) -> Result<(), EngineError> {
        let week = ctx.world.current_time.week();
        let ids: Vec<u64> = ctx.world.agreements.keys().copied().collect();
        for id in ids {
            let agreement = ctx.world.agreements[&id].clone();
            match agreement.status {
                AgreementStatus::Cancelled | AgreementStatus::Expired => continue,
                AgreementStatus::Suspended => {
                    if embargo_between(ctx.world, agreement.nations) {
                        continue;
                    }
                    ctx.world.agreements.get_mut(&id).expect("agreement exists").status =
                        AgreementStatus::Active;
                    ctx.signals.push(Signal {
                        week,
                        kind: SignalKind::AgreementResumed { agreement_id: id },
                    });
                }
                AgreementStatus::Active => {
                    if embargo_between(ctx.world, agreement.nations) {
                        ctx.world
                            .agreements
                            .get_mut(&id)
                            .expect("agreement exists")
                            .status = AgreementStatus::Suspended;
                        tracing::warn!(
                            agreement_id = id,
                            nations = ?agreement.nations,
                            "agreement suspended by embargo"
                        );
                        ctx.signals.push(Signal {
                            week,
                            kind: SignalKind::AgreementSuspended {
                                agreement_id: id,
                                nations: agreement.nations,
                            },
                        });
                        continue;
                    }
                }
            }

            settle(ctx, &agreement, week);

            // The clock runs on every non-suspended week, settled or not.
            let agreement = ctx.world.agreements.get_mut(&id).expect("agreement exists");
            agreement.weeks_remaining = agreement.weeks_remaining.saturating_sub(1);
            if agreement.weeks_remaining == 0 {
                agreement.status = AgreementStatus::Expired;
                ctx.signals.push(Signal {
                    week,
                    kind: SignalKind::AgreementExpired { agreement_id: id },
                });
            }
        }
        Ok(())
    }
}

fn embargo_between(world: &World, nations: (NationId, NationId)) -> bool {
    world
        .nation(nations.0)
        .trade_blocked_with(world.nation(nations.1))
}

/// Phase 1: verify every export of both sides against the effective staged
/// stockpiles. Phase 2 (only if phase 1 passed for both): stage the export
/// subtractions and import additions, one ledger update per nation.
fn settle(ctx: &mut TickContext, agreement: &TradeAgreement, week: u32) {
    let parties = [agreement.nations.0, agreement.nations.1];
    let mut feasible = true;
    for nation in parties {
        let side = agreement
            .side(nation)
            .unwrap_or_else(|| panic!("agreement {} missing side for {nation}", agreement.id));
        let missing: Vec<(String, f64)> = side
            .exports
            .iter()
            .filter_map(|(resource, &amount)| {
                let available = ctx.stage.stocked(ctx.world, nation, resource);
                (available < amount).then(|| (resource.clone(), amount - available))
            })
            .collect();
        if !missing.is_empty() {
            feasible = false;
            tracing::warn!(
                agreement_id = agreement.id,
                nation,
                ?missing,
                "transfer failed: insufficient exports"
            );
            ctx.signals.push(Signal {
                week,
                kind: SignalKind::TransferFailed {
                    agreement_id: agreement.id,
                    nation,
                    missing,
                },
            });
        }
    }
    if !feasible {
        return;
    }

    for nation in parties {
        let side = agreement.side(nation).expect("side checked in phase 1");
        for (resource, &amount) in &side.exports {
            ctx.stage.add_stock(nation, resource, -amount);
        }
        for (resource, &amount) in &side.imports {
            ctx.stage.add_stock(nation, resource, amount);
        }
    }
    ctx.signals.push(Signal {
        week,
        kind: SignalKind::AgreementExecuted {
            agreement_id: agreement.id,
            value: agreement.value,
        },
    });
}
