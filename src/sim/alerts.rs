use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::EngineError;
use super::context::TickContext;
use super::shortage::{ResourceStatus, analyze_nation};
use super::signal::SignalKind;
use super::system::WeeklySystem;
use crate::model::{NationId, SimTimestamp};

/// Severities below this never produce an alert.
const MIN_ALERT_SEVERITY: f64 = 0.3;
/// Ticks a new state must persist before its first alert.
const GRACE_TICKS: u32 = 2;
/// Critical states at or above this severity skip the grace period.
const CRITICAL_BYPASS_SEVERITY: f64 = 0.9;
/// A severity swing of at least this much re-alerts inside the cooldown.
const RENOTIFY_SEVERITY_DELTA: f64 = 0.3;
/// Unchanged states stretch their cooldown, up to this multiplier.
const MAX_COOLDOWN_MULTIPLIER: u32 = 3;
const TICKS_PER_ESCALATION: u32 = 5;

const COOLDOWN_CRITICAL_DAYS: u32 = 5;
const COOLDOWN_SHORTAGE_DAYS: u32 = 10;
const COOLDOWN_SURPLUS_DAYS: u32 = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Critical,
    Shortage,
    Surplus,
    /// A trade agreement was put on hold by an embargo.
    TradeDisruption,
}

impl AlertKind {
    fn cooldown_days(self) -> u32 {
        match self {
            AlertKind::Critical => COOLDOWN_CRITICAL_DAYS,
            AlertKind::Shortage => COOLDOWN_SHORTAGE_DAYS,
            AlertKind::Surplus => COOLDOWN_SURPLUS_DAYS,
            AlertKind::TradeDisruption => 0,
        }
    }
}

fn kind_for(status: ResourceStatus) -> Option<AlertKind> {
    match status {
        ResourceStatus::Critical => Some(AlertKind::Critical),
        ResourceStatus::Shortage => Some(AlertKind::Shortage),
        ResourceStatus::Surplus => Some(AlertKind::Surplus),
        ResourceStatus::Stable => None,
    }
}

/// What to notify, for whom, about which resources. The presentation layer
/// decides how; this struct is the entire contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertDecision {
    pub nation: NationId,
    pub resources: Vec<String>,
    /// Highest severity among the grouped resources.
    pub severity: f64,
    pub kind: AlertKind,
    pub grouped: bool,
}

/// Per-nation notification preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertSettings {
    pub muted: bool,
    pub snoozed_until: Option<SimTimestamp>,
}

impl AlertSettings {
    fn silenced_at(&self, now: SimTimestamp) -> bool {
        self.muted || self.snoozed_until.is_some_and(|until| now < until)
    }
}

#[derive(Debug, Clone)]
struct LastAlert {
    at: SimTimestamp,
    severity: f64,
    kind: AlertKind,
    status: ResourceStatus,
}

#[derive(Debug, Clone)]
struct ResourceAlertState {
    status: ResourceStatus,
    ticks_in_state: u32,
    last_alert: Option<LastAlert>,
}

/// Debounced notification decisions over the shortage analyzer's output.
///
/// Owns all of its history — one instance per game session, constructed and
/// torn down with it. Nothing here is process-wide.
#[derive(Debug)]
pub struct AlertSystem {
    grouping: bool,
    states: BTreeMap<(NationId, String), ResourceAlertState>,
    settings: BTreeMap<NationId, AlertSettings>,
}

impl Default for AlertSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertSystem {
    pub fn new() -> Self {
        Self {
            grouping: true,
            states: BTreeMap::new(),
            settings: BTreeMap::new(),
        }
    }

    pub fn with_grouping(grouping: bool) -> Self {
        Self {
            grouping,
            ..Self::new()
        }
    }

    pub fn set_grouping(&mut self, grouping: bool) {
        self.grouping = grouping;
    }

    pub fn mute(&mut self, nation: NationId, muted: bool) {
        self.settings.entry(nation).or_default().muted = muted;
    }

    /// Suppress all alerts for a nation until the given time.
    pub fn snooze(&mut self, nation: NationId, until: SimTimestamp) {
        self.settings.entry(nation).or_default().snoozed_until = Some(until);
    }

    fn silenced(&self, nation: NationId, now: SimTimestamp) -> bool {
        self.settings
            .get(&nation)
            .is_some_and(|s| s.silenced_at(now))
    }

    /// Decide whether one resource's current report warrants an alert,
    /// updating its debounce state either way.
    fn decide(
        &mut self,
        nation: NationId,
        resource: &str,
        status: ResourceStatus,
        severity: f64,
        now: SimTimestamp,
    ) -> Option<AlertKind> {
        let key = (nation, resource.to_string());
        if severity < MIN_ALERT_SEVERITY || status == ResourceStatus::Stable {
            self.states.remove(&key);
            return None;
        }
        let kind = kind_for(status)?;

        let state = self
            .states
            .entry(key)
            .or_insert_with(|| ResourceAlertState {
                status,
                ticks_in_state: 0,
                last_alert: None,
            });
        if state.status == status {
            state.ticks_in_state += 1;
        } else {
            state.status = status;
            state.ticks_in_state = 1;
        }

        let bypass_grace = status == ResourceStatus::Critical && severity >= CRITICAL_BYPASS_SEVERITY;
        if state.ticks_in_state < GRACE_TICKS && !bypass_grace {
            return None;
        }

        if let Some(last) = &state.last_alert {
            if last.kind == kind {
                let mut cooldown = kind.cooldown_days();
                let state_unchanged = last.status == status;
                if state_unchanged {
                    let multiplier = (state.ticks_in_state / TICKS_PER_ESCALATION + 1)
                        .min(MAX_COOLDOWN_MULTIPLIER);
                    cooldown *= multiplier;
                }
                let within_cooldown = now.days_since(last.at) < cooldown;
                let severity_moved = (severity - last.severity).abs() >= RENOTIFY_SEVERITY_DELTA;
                if within_cooldown && state_unchanged && !severity_moved {
                    return None;
                }
            }
        }

        state.last_alert = Some(LastAlert {
            at: now,
            severity,
            kind,
            status,
        });
        Some(kind)
    }
}

impl WeeklySystem for AlertSystem {
    fn name(&self) -> &str {
        "alerts"
    }

    fn tick(&mut self, ctx: &mut TickContext) -> Result<(), EngineError> {
        let now = ctx.world.current_time;
        let ids: Vec<NationId> = ctx.world.nations.keys().copied().collect();
        for nation in ids {
            if self.silenced(nation, now) {
                continue;
            }
            let reports = analyze_nation(ctx.world.nation(nation));

            let mut critical: Vec<(String, f64)> = Vec::new();
            let mut grouped: BTreeMap<AlertKind, Vec<(String, f64)>> = BTreeMap::new();
            for report in reports.values() {
                let Some(kind) =
                    self.decide(nation, &report.resource, report.status, report.severity, now)
                else {
                    continue;
                };
                match kind {
                    // Critical alerts always go out individually and at once.
                    AlertKind::Critical => critical.push((report.resource.clone(), report.severity)),
                    AlertKind::Shortage | AlertKind::Surplus => grouped
                        .entry(kind)
                        .or_default()
                        .push((report.resource.clone(), report.severity)),
                    AlertKind::TradeDisruption => unreachable!("not a ledger status"),
                }
            }

            for (resource, severity) in critical {
                ctx.stage.alerts.push(AlertDecision {
                    nation,
                    resources: vec![resource],
                    severity,
                    kind: AlertKind::Critical,
                    grouped: false,
                });
            }
            for (kind, entries) in grouped {
                if self.grouping && entries.len() > 1 {
                    let severity = entries.iter().map(|(_, s)| *s).fold(0.0, f64::max);
                    ctx.stage.alerts.push(AlertDecision {
                        nation,
                        resources: entries.into_iter().map(|(r, _)| r).collect(),
                        severity,
                        kind,
                        grouped: true,
                    });
                } else {
                    for (resource, severity) in entries {
                        ctx.stage.alerts.push(AlertDecision {
                            nation,
                            resources: vec![resource],
                            severity,
                            kind,
                            grouped: false,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_signals(&mut self, ctx: &mut TickContext) -> Result<(), EngineError> {
        let now = ctx.world.current_time;
        for signal in ctx.inbox {
            let SignalKind::AgreementSuspended {
                agreement_id,
                nations,
            } = &signal.kind
            else {
                continue;
            };
            let Some(agreement) = ctx.world.agreements.get(agreement_id) else {
                continue;
            };
            for nation in [nations.0, nations.1] {
                if self.silenced(nation, now) {
                    continue;
                }
                let imports: Vec<String> = agreement
                    .side(nation)
                    .map(|side| side.imports.keys().cloned().collect())
                    .unwrap_or_default();
                ctx.stage.alerts.push(AlertDecision {
                    nation,
                    resources: imports,
                    severity: 0.0,
                    kind: AlertKind::TradeDisruption,
                    grouped: false,
                });
            }
        }
        Ok(())
    }
}
