use chrono::NaiveDateTime;
use serde::Serialize;

use crate::curfew::CurfewStatus;
use crate::proximity::HomeStatus;

/// Every decision the monitor makes produces an Event.
/// The CLI prints them as JSON; embedders may forward them anywhere.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    MonitorStarted {
        in_curfew: bool,
        rule_count: usize,
        home_set: bool,
        at: NaiveDateTime,
    },
    CurfewStarted {
        at: NaiveDateTime,
    },
    /// Curfew is over and a new countdown cycle begins.
    CurfewEnded {
        at: NaiveDateTime,
    },
    ReminderSent {
        lead_minutes: u32,
        notification_id: u32,
        body: String,
        /// False when the host refused or failed to post it.
        delivered: bool,
        /// Triggered by hand rather than by the countdown.
        emulated: bool,
        at: NaiveDateTime,
    },
    ProximityUpdated {
        distance_m: f64,
        status: HomeStatus,
        at: NaiveDateTime,
    },
    /// Location tracking was switched off for this run.
    LocationUnavailable {
        reason: String,
        at: NaiveDateTime,
    },
    RulesReloaded {
        rule_count: usize,
        home_set: bool,
        at: NaiveDateTime,
    },
    StatusSnapshot {
        #[serde(flatten)]
        curfew: CurfewStatus,
        home: HomeStatus,
        countdown: String,
        sent_this_cycle: Vec<u32>,
        at: NaiveDateTime,
    },
}
