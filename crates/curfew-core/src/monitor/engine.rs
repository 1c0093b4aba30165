//! The curfew monitor.
//!
//! Like the rest of the crate it is a clock-driven state machine: `tick()`
//! performs one evaluation and `on_fix()` handles one location fix. `run()`
//! wraps both in a tokio loop that ends when the shutdown signal flips.
//!
//! ## Usage
//!
//! ```ignore
//! let mut monitor = CurfewMonitor::new(settings, clock, prefs, notifier)
//!     .with_location_source(source);
//! monitor.run(shutdown_rx).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::curfew::{Clock, CurfewStatus, CurfewWindow};
use crate::error::{ConfigError, CoreError, LocationError};
use crate::events::Event;
use crate::location::{LocationRequest, LocationSource, LocationSubscription};
use crate::notify::{
    deliver_logged, NotificationRequest, NotificationScheduler, Notifier, RuleSet, Transition,
    DEFAULT_REMINDER_TITLE, DEFAULT_STATUS_TITLE,
};
use crate::proximity::{GeoPoint, ProximitySampler, DEFAULT_HOME_RADIUS_M};
use crate::storage::{Config, PreferenceRepository};

/// Knobs for one monitor instance.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub window: CurfewWindow,
    pub poll_interval: Duration,
    pub rules_refresh: Duration,
    pub location: LocationRequest,
    pub location_enabled: bool,
    pub home_radius_m: f64,
    pub reminder_title: String,
    pub status_title: String,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            window: CurfewWindow::default(),
            poll_interval: Duration::from_secs(1),
            rules_refresh: Duration::from_secs(30),
            location: LocationRequest::default(),
            location_enabled: true,
            home_radius_m: DEFAULT_HOME_RADIUS_M,
            reminder_title: DEFAULT_REMINDER_TITLE.to_string(),
            status_title: DEFAULT_STATUS_TITLE.to_string(),
        }
    }
}

impl MonitorSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            window: config.curfew.window()?,
            poll_interval: Duration::from_millis(config.monitor.poll_interval_ms),
            rules_refresh: Duration::from_secs(config.monitor.rules_refresh_secs.max(1)),
            location: LocationRequest {
                interval: Duration::from_secs(config.location.interval_secs),
                min_displacement_m: config.location.min_displacement_m,
            },
            location_enabled: config.location.enabled,
            home_radius_m: config.location.home_radius_m,
            reminder_title: config.notifications.reminder_title.clone(),
            status_title: config.notifications.status_title.clone(),
        })
    }
}

pub struct CurfewMonitor {
    settings: MonitorSettings,
    clock: Arc<dyn Clock>,
    prefs: Arc<dyn PreferenceRepository>,
    notifier: Arc<dyn Notifier>,
    location: Option<Arc<dyn LocationSource>>,
    scheduler: NotificationScheduler,
    sampler: ProximitySampler,
    rules: RuleSet,
    subscription: Option<LocationSubscription>,
    location_disabled: bool,
}

impl CurfewMonitor {
    /// Build a monitor and load rules and home from `prefs`.
    ///
    /// Nothing is carried over from a previous instance: the first tick
    /// derives the curfew phase from the clock.
    pub fn new(
        settings: MonitorSettings,
        clock: Arc<dyn Clock>,
        prefs: Arc<dyn PreferenceRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let scheduler =
            NotificationScheduler::new(settings.window).with_title(settings.reminder_title.clone());
        let sampler = ProximitySampler::new(prefs.load_home(), settings.home_radius_m);
        let rules = prefs.load_rules();
        Self {
            settings,
            clock,
            prefs,
            notifier,
            location: None,
            scheduler,
            sampler,
            rules,
            subscription: None,
            location_disabled: false,
        }
    }

    pub fn with_location_source(mut self, source: Arc<dyn LocationSource>) -> Self {
        self.location = Some(source);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn scheduler(&self) -> &NotificationScheduler {
        &self.scheduler
    }

    pub fn sampler(&self) -> &ProximitySampler {
        &self.sampler
    }

    pub fn is_tracking_location(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn curfew_status(&self) -> CurfewStatus {
        self.settings.window.status_at(self.clock.now())
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let curfew = self.curfew_status();
        Event::StatusSnapshot {
            countdown: curfew.countdown(),
            curfew,
            home: self.sampler.status(),
            sent_this_cycle: self.scheduler.sent().iter().copied().collect(),
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Re-read rules and home from storage.
    ///
    /// A moved home point is checked against the latest fix right away, since
    /// a stationary device may not publish another one.
    pub fn reload(&mut self) -> Vec<Event> {
        self.rules = self.prefs.load_rules();
        let home = self.prefs.load_home();
        if home.is_none() && self.subscription.take().is_some() {
            debug!("home cleared; location tracking stopped");
        }
        let home_changed = self.sampler.home() != home;
        self.sampler.set_home(home);

        let mut events = vec![Event::RulesReloaded {
            rule_count: self.rules.len(),
            home_set: home.is_some(),
            at: self.clock.now(),
        }];
        if home_changed {
            let latest = self.subscription.as_ref().and_then(|sub| sub.latest());
            if let Some(event) = self.on_fix(latest) {
                events.push(event);
            }
        }
        events
    }

    /// One evaluation of the curfew clock, location subscription and rules.
    ///
    /// # Errors
    /// Fails only when the location source breaks for a reason other than a
    /// missing permission.
    pub fn tick(&mut self) -> Result<Vec<Event>, CoreError> {
        let now = self.clock.now();
        let outcome = self.scheduler.evaluate(now, &self.rules);
        let mut events = Vec::new();

        match outcome.transition {
            Some(Transition::CurfewStarted) => {
                info!("curfew started");
                events.push(Event::CurfewStarted { at: now });
            }
            Some(Transition::CurfewEnded) => {
                info!("curfew ended; new countdown cycle");
                events.push(Event::CurfewEnded { at: now });
            }
            None => {}
        }

        if let Some(event) = self.ensure_subscription()? {
            events.push(event);
        }

        for due in outcome.due {
            let delivered = deliver_logged(self.notifier.as_ref(), &due.request);
            info!(lead = due.lead_minutes, delivered, "reminder due");
            events.push(Event::ReminderSent {
                lead_minutes: due.lead_minutes,
                notification_id: due.request.id,
                body: due.request.body,
                delivered,
                emulated: false,
                at: now,
            });
        }

        Ok(events)
    }

    /// Handle a location fix (or its absence).
    ///
    /// A missing fix keeps the previous verdict and updates nothing.
    pub fn on_fix(&mut self, fix: Option<GeoPoint>) -> Option<Event> {
        if fix.is_none() {
            debug!("location update without a fix");
        }
        let reading = self.sampler.sample(fix)?;
        let curfew = self.curfew_status();
        let body = format!(
            "{} {}",
            self.sampler.status_text(),
            curfew.boundary_line()
        );
        let request = NotificationRequest::status(&self.settings.status_title, body);
        if let Err(e) = self.notifier.update_status(&request) {
            warn!(error = %e, "status notification not updated");
        }
        Some(Event::ProximityUpdated {
            distance_m: reading.distance_m,
            status: reading.status,
            at: self.clock.now(),
        })
    }

    /// Post the reminder for `lead_minutes` immediately.
    ///
    /// Rules are reloaded first when none are loaded yet. The cycle's sent
    /// set is left alone.
    pub fn emulate(&mut self, lead_minutes: u32) -> Result<Event, CoreError> {
        if self.rules.is_empty() {
            self.reload();
        }
        let request = self.scheduler.emulate(&self.rules, lead_minutes)?;
        let delivered = deliver_logged(self.notifier.as_ref(), &request);
        Ok(Event::ReminderSent {
            lead_minutes,
            notification_id: request.id,
            body: request.body,
            delivered,
            emulated: true,
            at: self.clock.now(),
        })
    }

    /// Run until `shutdown` becomes `true` (or its sender is dropped).
    ///
    /// The location subscription is dropped together with the loop.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), CoreError> {
        let started = self.started_event();
        log_event(&started);
        let initial = NotificationRequest::status(
            &self.settings.status_title,
            "Service started".to_string(),
        );
        if let Err(e) = self.notifier.update_status(&initial) {
            warn!(error = %e, "status notification not posted");
        }

        let mut ticker = interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let refresh_every = self.settings.rules_refresh;
        let mut refresh = interval_at(Instant::now() + refresh_every, refresh_every);

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    for event in self.tick()? {
                        log_event(&event);
                    }
                }
                _ = refresh.tick() => {
                    for event in self.reload() {
                        log_event(&event);
                    }
                }
                fix = next_fix(&mut self.subscription) => {
                    match fix {
                        Some(fix) => {
                            if let Some(event) = self.on_fix(fix) {
                                log_event(&event);
                            }
                        }
                        None => {
                            warn!("location source closed");
                            self.subscription = None;
                        }
                    }
                }
            }
        }

        self.subscription = None;
        info!("monitor stopped");
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn started_event(&self) -> Event {
        Event::MonitorStarted {
            in_curfew: self.curfew_status().in_curfew,
            rule_count: self.rules.len(),
            home_set: self.sampler.home().is_some(),
            at: self.clock.now(),
        }
    }

    /// Subscribe once home is known; unsubscribe when it is cleared.
    ///
    /// A fix already held by the source is sampled on subscription.
    fn ensure_subscription(&mut self) -> Result<Option<Event>, CoreError> {
        if self.sampler.home().is_none() {
            if self.subscription.take().is_some() {
                debug!("home not set; location tracking stopped");
            }
            return Ok(None);
        }
        if self.subscription.is_some() || self.location_disabled || !self.settings.location_enabled
        {
            return Ok(None);
        }
        let Some(source) = self.location.as_ref() else {
            return Ok(None);
        };
        match source.subscribe(self.settings.location) {
            Ok(sub) => {
                info!("location updates requested");
                let latest = sub.latest();
                self.subscription = Some(sub);
                Ok(self.on_fix(latest))
            }
            Err(LocationError::PermissionDenied) => {
                warn!("location permission not granted; proximity tracking disabled");
                self.location_disabled = true;
                Ok(Some(Event::LocationUnavailable {
                    reason: LocationError::PermissionDenied.to_string(),
                    at: self.clock.now(),
                }))
            }
            Err(e) => Err(e.into()),
        }
    }
}

async fn next_fix(sub: &mut Option<LocationSubscription>) -> Option<Option<GeoPoint>> {
    match sub {
        Some(sub) => sub.next().await,
        None => std::future::pending().await,
    }
}

fn log_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(json) => debug!(event = %json, "monitor event"),
        Err(e) => warn!(error = %e, "event not serializable"),
    }
}
