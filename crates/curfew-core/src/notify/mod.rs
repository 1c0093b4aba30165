mod delivery;
mod rules;
mod scheduler;

pub use delivery::{
    rule_notification_id, ConsoleNotifier, MemoryNotifier, NotificationKind, NotificationRequest,
    Notifier, DEFAULT_REMINDER_TITLE, DEFAULT_STATUS_TITLE, STATUS_NOTIFICATION_ID,
};
pub(crate) use delivery::deliver_logged;
pub use rules::{default_message, NotificationRule, RuleSet};
pub use scheduler::{DueReminder, NotificationScheduler, SchedulerTick, Transition};
