//! Lead-time reminder scheduling.
//!
//! Each enabled rule fires once per cycle, during the one-minute window
//! `(L - 1, L]` minutes before curfew starts. The set of leads already fired
//! is cleared when curfew ends, which starts the next countdown.
//!
//! ```text
//! Waiting (collecting sent leads) -> InCurfew (silent) -> Waiting (cleared)
//! ```
//!
//! Nothing here is persisted: after a restart the first tick derives the
//! phase from the clock and the sent set starts empty.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::delivery::{NotificationRequest, DEFAULT_REMINDER_TITLE};
use super::rules::RuleSet;
use crate::curfew::{CurfewStatus, CurfewWindow};
use crate::error::ValidationError;

/// Edge detected between two consecutive evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    CurfewStarted,
    /// Also marks the start of a new cycle.
    CurfewEnded,
}

/// A reminder that crossed its threshold on this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct DueReminder {
    pub lead_minutes: u32,
    pub request: NotificationRequest,
}

/// Everything one evaluation decided.
#[derive(Debug, Clone)]
pub struct SchedulerTick {
    pub status: CurfewStatus,
    pub transition: Option<Transition>,
    /// Time left until the next curfew start; `None` while in curfew.
    pub until_start: Option<Duration>,
    pub due: Vec<DueReminder>,
}

#[derive(Debug, Clone)]
pub struct NotificationScheduler {
    window: CurfewWindow,
    title: String,
    sent: BTreeSet<u32>,
    last_in_curfew: Option<bool>,
}

impl NotificationScheduler {
    pub fn new(window: CurfewWindow) -> Self {
        Self {
            window,
            title: DEFAULT_REMINDER_TITLE.to_string(),
            sent: BTreeSet::new(),
            last_in_curfew: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn window(&self) -> &CurfewWindow {
        &self.window
    }

    /// Leads already fired in the current cycle.
    pub fn sent(&self) -> &BTreeSet<u32> {
        &self.sent
    }

    pub fn last_in_curfew(&self) -> Option<bool> {
        self.last_in_curfew
    }

    /// Run one evaluation at `now`.
    ///
    /// Returned reminders are already recorded as sent; delivery failures do
    /// not make them eligible again within the cycle. The sent set is only
    /// cleared when curfew ends, so toggling or editing a rule never re-arms
    /// a lead that already fired.
    pub fn evaluate(&mut self, now: NaiveDateTime, rules: &RuleSet) -> SchedulerTick {
        let status = self.window.status_at(now);
        let in_curfew = status.in_curfew;

        let transition = match (self.last_in_curfew, in_curfew) {
            (Some(true), false) => {
                self.sent.clear();
                debug!("curfew ended; sent reminders cleared for the new cycle");
                Some(Transition::CurfewEnded)
            }
            (Some(false), true) => Some(Transition::CurfewStarted),
            _ => None,
        };
        self.last_in_curfew = Some(in_curfew);

        if in_curfew {
            return SchedulerTick {
                status,
                transition,
                until_start: None,
                due: Vec::new(),
            };
        }

        let until_start = self.window.time_until_start(now.time());
        let mut due = Vec::new();
        for rule in rules.enabled() {
            let lead = rule.lead_minutes;
            if !in_firing_window(until_start, lead) {
                continue;
            }
            if !self.sent.insert(lead) {
                debug!(lead, "reminder already sent this cycle");
                continue;
            }
            due.push(DueReminder {
                lead_minutes: lead,
                request: NotificationRequest::reminder(lead, &self.title, rule.body()),
            });
        }

        SchedulerTick {
            status,
            transition,
            until_start: Some(until_start),
            due,
        }
    }

    /// Build the reminder for `lead` right away, outside the clock.
    ///
    /// Does not touch the sent set.
    pub fn emulate(
        &self,
        rules: &RuleSet,
        lead_minutes: u32,
    ) -> Result<NotificationRequest, ValidationError> {
        let rule = rules
            .get(lead_minutes)
            .ok_or(ValidationError::RuleNotFound(lead_minutes))?;
        if !rule.enabled {
            return Err(ValidationError::RuleDisabled(lead_minutes));
        }
        Ok(NotificationRequest::reminder(
            lead_minutes,
            &self.title,
            rule.emulated_body(),
        ))
    }
}

/// `lead - 1 min < until_start <= lead min`
fn in_firing_window(until_start: Duration, lead_minutes: u32) -> bool {
    let upper = Duration::minutes(i64::from(lead_minutes));
    let lower = Duration::minutes(i64::from(lead_minutes) - 1);
    until_start > lower && until_start <= upper
}
