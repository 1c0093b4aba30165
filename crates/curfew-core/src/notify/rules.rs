//! User-configured lead-time rules.
//!
//! Serialized as the persisted JSON array
//! `[{"minutesBefore": 30, "message": "...", "enabled": true}, ...]`.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One "notify me N minutes before curfew" entry.
///
/// `lead_minutes` is the identity key: a [`RuleSet`] holds at most one rule
/// per lead time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRule {
    #[serde(rename = "minutesBefore")]
    pub lead_minutes: u32,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl NotificationRule {
    pub fn new(lead_minutes: u32, message: impl Into<String>) -> Self {
        Self {
            lead_minutes,
            message: message.into(),
            enabled: true,
        }
    }

    /// The rule's text, or generated text when the message is blank.
    pub fn body(&self) -> String {
        if self.message.trim().is_empty() {
            default_message(self.lead_minutes)
        } else {
            self.message.clone()
        }
    }

    /// Text used when the rule is triggered by hand rather than by the clock.
    pub fn emulated_body(&self) -> String {
        if self.message.trim().is_empty() {
            format!(
                "Emulated notification {} minutes before curfew!",
                self.lead_minutes
            )
        } else {
            self.message.clone()
        }
    }
}

pub fn default_message(lead_minutes: u32) -> String {
    format!("{lead_minutes} minutes left until curfew!")
}

/// Ordered collection of rules with unique lead times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "Vec<NotificationRule>",
    into = "Vec<NotificationRule>"
)]
pub struct RuleSet {
    rules: Vec<NotificationRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an arbitrary list. Later duplicates and zero leads are dropped.
    pub fn from_rules(rules: impl IntoIterator<Item = NotificationRule>) -> Self {
        let mut set = Self::new();
        for rule in rules {
            if rule.lead_minutes == 0 || set.get(rule.lead_minutes).is_some() {
                continue;
            }
            set.rules.push(rule);
        }
        set
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NotificationRule> {
        self.rules.iter()
    }

    pub fn enabled(&self) -> impl Iterator<Item = &NotificationRule> {
        self.rules.iter().filter(|r| r.enabled)
    }

    pub fn get(&self, lead_minutes: u32) -> Option<&NotificationRule> {
        self.rules.iter().find(|r| r.lead_minutes == lead_minutes)
    }

    pub fn as_slice(&self) -> &[NotificationRule] {
        &self.rules
    }

    /// Rules sorted by lead time, longest first (display order).
    pub fn sorted_desc(&self) -> Vec<NotificationRule> {
        let mut rules = self.rules.clone();
        rules.sort_by(|a, b| b.lead_minutes.cmp(&a.lead_minutes));
        rules
    }

    pub fn add(&mut self, lead_minutes: u32, message: &str) -> Result<(), ValidationError> {
        if lead_minutes == 0 {
            return Err(ValidationError::NonPositiveLead(lead_minutes));
        }
        if self.get(lead_minutes).is_some() {
            return Err(ValidationError::DuplicateLead(lead_minutes));
        }
        self.rules.push(NotificationRule::new(lead_minutes, message));
        Ok(())
    }

    /// Change the lead time and message of an existing rule.
    ///
    /// The enabled flag is kept. Moving onto another rule's lead time is
    /// rejected.
    pub fn edit(
        &mut self,
        lead_minutes: u32,
        new_lead_minutes: u32,
        message: &str,
    ) -> Result<(), ValidationError> {
        if new_lead_minutes == 0 {
            return Err(ValidationError::NonPositiveLead(new_lead_minutes));
        }
        if new_lead_minutes != lead_minutes && self.get(new_lead_minutes).is_some() {
            return Err(ValidationError::DuplicateLead(new_lead_minutes));
        }
        let rule = self.get_mut(lead_minutes)?;
        rule.lead_minutes = new_lead_minutes;
        rule.message = message.to_string();
        Ok(())
    }

    pub fn set_enabled(&mut self, lead_minutes: u32, enabled: bool) -> Result<(), ValidationError> {
        self.get_mut(lead_minutes)?.enabled = enabled;
        Ok(())
    }

    pub fn remove(&mut self, lead_minutes: u32) -> Result<NotificationRule, ValidationError> {
        let idx = self
            .rules
            .iter()
            .position(|r| r.lead_minutes == lead_minutes)
            .ok_or(ValidationError::RuleNotFound(lead_minutes))?;
        Ok(self.rules.remove(idx))
    }

    fn get_mut(&mut self, lead_minutes: u32) -> Result<&mut NotificationRule, ValidationError> {
        self.rules
            .iter_mut()
            .find(|r| r.lead_minutes == lead_minutes)
            .ok_or(ValidationError::RuleNotFound(lead_minutes))
    }
}

impl From<Vec<NotificationRule>> for RuleSet {
    fn from(rules: Vec<NotificationRule>) -> Self {
        Self::from_rules(rules)
    }
}

impl From<RuleSet> for Vec<NotificationRule> {
    fn from(set: RuleSet) -> Self {
        set.rules
    }
}

impl FromIterator<NotificationRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = NotificationRule>>(iter: I) -> Self {
        Self::from_rules(iter)
    }
}
