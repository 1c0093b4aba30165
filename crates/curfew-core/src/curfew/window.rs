//! Curfew window evaluation.
//!
//! A pure function of local wall-clock time. Both boundaries are exclusive:
//! at exactly the start instant curfew has not begun yet, and at exactly the
//! end instant it is already over.
//!
//! ```text
//! 05:00 ── waiting ──> 23:00 ── in curfew ──> 05:00 (next day)
//! ```

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ValidationError;

/// Which edge of the window comes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    Start,
    End,
}

impl Boundary {
    pub fn label(&self) -> &'static str {
        match self {
            Boundary::Start => "start",
            Boundary::End => "end",
        }
    }
}

/// Daily curfew interval in local time.
///
/// When `start > end` the window wraps past midnight (the default 23:00–05:00).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurfewWindow {
    start: NaiveTime,
    end: NaiveTime,
}

/// Snapshot of the curfew clock at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurfewStatus {
    pub in_curfew: bool,
    /// The upcoming edge: `End` while in curfew, `Start` otherwise.
    pub boundary: Boundary,
    #[serde(serialize_with = "serialize_hhmm")]
    pub boundary_time: NaiveTime,
    pub next_boundary: NaiveDateTime,
    /// Always in `[0, 24h)`.
    #[serde(rename = "remaining_secs", serialize_with = "serialize_secs")]
    pub remaining: Duration,
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// Duration from `from` forward to the next occurrence of `to`, in `[0, 24h)`.
fn wrap_until(from: NaiveTime, to: NaiveTime) -> Duration {
    let delta = to.signed_duration_since(from);
    if delta < Duration::zero() {
        delta + Duration::days(1)
    } else {
        delta
    }
}

impl Default for CurfewWindow {
    fn default() -> Self {
        Self {
            start: hm(23, 0),
            end: hm(5, 0),
        }
    }
}

impl CurfewWindow {
    /// Build a window. Identical start and end would make an empty window.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        if start == end {
            return Err(ValidationError::EmptyWindow(start));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn wraps_midnight(&self) -> bool {
        self.start > self.end
    }

    /// Strictly after start and strictly before end.
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.wraps_midnight() {
            t > self.start || t < self.end
        } else {
            t > self.start && t < self.end
        }
    }

    /// Time left until the upcoming curfew start, regardless of whether
    /// curfew is currently in effect.
    pub fn time_until_start(&self, t: NaiveTime) -> Duration {
        wrap_until(t, self.start)
    }

    pub fn time_until_end(&self, t: NaiveTime) -> Duration {
        wrap_until(t, self.end)
    }

    /// Evaluate the window at `now`.
    pub fn status_at(&self, now: NaiveDateTime) -> CurfewStatus {
        let t = now.time();
        let in_curfew = self.contains(t);
        let (boundary, boundary_time, remaining) = if in_curfew {
            (Boundary::End, self.end, self.time_until_end(t))
        } else {
            (Boundary::Start, self.start, self.time_until_start(t))
        };
        CurfewStatus {
            in_curfew,
            boundary,
            boundary_time,
            next_boundary: now + remaining,
            remaining,
        }
    }
}

impl CurfewStatus {
    /// `HH:MM:SS` countdown to the next boundary.
    pub fn countdown(&self) -> String {
        let secs = self.remaining.num_seconds();
        format!(
            "{:02}:{:02}:{:02}",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60
        )
    }

    /// One-line human summary of the countdown.
    pub fn summary(&self) -> String {
        if self.in_curfew {
            format!("Curfew in effect. Remaining {}", self.countdown())
        } else {
            format!("Until curfew {}", self.countdown())
        }
    }

    /// Label used in the ongoing status notification, e.g. `Curfew start: 23:00`.
    pub fn boundary_line(&self) -> String {
        format!(
            "Curfew {}: {}",
            self.boundary.label(),
            self.boundary_time.format("%H:%M")
        )
    }
}

fn serialize_hhmm<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&t.format("%H:%M").to_string())
}

fn serialize_secs<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(d.num_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn default_window_wraps_midnight() {
        let w = CurfewWindow::default();
        assert!(w.wraps_midnight());
        assert_eq!(w.start(), hm(23, 0));
        assert_eq!(w.end(), hm(5, 0));
    }

    #[test]
    fn boundaries_are_exclusive() {
        let w = CurfewWindow::default();
        assert!(!w.status_at(at(23, 0, 0)).in_curfew);
        assert!(w.status_at(at(23, 0, 1)).in_curfew);
        assert!(w.status_at(at(4, 59, 59)).in_curfew);
        assert!(!w.status_at(at(5, 0, 0)).in_curfew);
    }

    #[test]
    fn daytime_counts_down_to_start() {
        let w = CurfewWindow::default();
        let status = w.status_at(at(22, 0, 0));
        assert!(!status.in_curfew);
        assert_eq!(status.boundary, Boundary::Start);
        assert_eq!(status.remaining, Duration::hours(1));
        assert_eq!(status.next_boundary, at(23, 0, 0));
        assert_eq!(status.countdown(), "01:00:00");
    }

    #[test]
    fn late_evening_counts_down_to_next_morning() {
        let w = CurfewWindow::default();
        let status = w.status_at(at(23, 30, 0));
        assert!(status.in_curfew);
        assert_eq!(status.boundary, Boundary::End);
        assert_eq!(status.remaining, Duration::minutes(5 * 60 + 30));
        assert_eq!(
            status.next_boundary,
            at(5, 0, 0) + Duration::days(1)
        );
    }

    #[test]
    fn early_morning_counts_down_to_same_day_end() {
        let w = CurfewWindow::default();
        let status = w.status_at(at(1, 15, 0));
        assert!(status.in_curfew);
        assert_eq!(status.remaining, Duration::minutes(3 * 60 + 45));
    }

    #[test]
    fn exact_start_has_zero_remaining() {
        let w = CurfewWindow::default();
        let status = w.status_at(at(23, 0, 0));
        assert_eq!(status.remaining, Duration::zero());
    }

    #[test]
    fn time_until_start_wraps_after_start() {
        let w = CurfewWindow::default();
        assert_eq!(
            w.time_until_start(hm(23, 30)),
            Duration::minutes(23 * 60 + 30)
        );
        assert_eq!(w.time_until_start(hm(22, 45)), Duration::minutes(15));
    }

    #[test]
    fn non_wrapping_window() {
        let w = CurfewWindow::new(hm(1, 0), hm(6, 0)).unwrap();
        assert!(!w.wraps_midnight());
        assert!(w.contains(hm(3, 0)));
        assert!(!w.contains(hm(0, 30)));
        assert!(!w.contains(hm(23, 30)));
    }

    #[test]
    fn empty_window_is_rejected() {
        let err = CurfewWindow::new(hm(22, 0), hm(22, 0)).unwrap_err();
        assert_eq!(err, ValidationError::EmptyWindow(hm(22, 0)));
    }

    #[test]
    fn status_serializes_with_compact_fields() {
        let w = CurfewWindow::default();
        let json = serde_json::to_value(w.status_at(at(22, 0, 0))).unwrap();
        assert_eq!(json["boundary"], "start");
        assert_eq!(json["boundary_time"], "23:00");
        assert_eq!(json["remaining_secs"], 3600);
    }

    #[test]
    fn boundary_line_formats_time() {
        let w = CurfewWindow::default();
        assert_eq!(w.status_at(at(12, 0, 0)).boundary_line(), "Curfew start: 23:00");
        assert_eq!(w.status_at(at(2, 0, 0)).boundary_line(), "Curfew end: 05:00");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn time_of_day(secs: u32) -> NaiveDateTime {
            at(0, 0, 0) + Duration::seconds(secs as i64)
        }

        proptest! {
            #[test]
            fn in_curfew_matches_window(secs in 0u32..86_400) {
                let now = time_of_day(secs);
                let status = CurfewWindow::default().status_at(now);
                let expected = secs > 23 * 3600 || secs < 5 * 3600;
                prop_assert_eq!(status.in_curfew, expected);
            }

            #[test]
            fn remaining_is_within_a_day(secs in 0u32..86_400) {
                let status = CurfewWindow::default().status_at(time_of_day(secs));
                prop_assert!(status.remaining >= Duration::zero());
                prop_assert!(status.remaining < Duration::days(1));
            }

            #[test]
            fn remaining_decreases_within_segment(secs in 0u32..86_399) {
                let w = CurfewWindow::default();
                let a = w.status_at(time_of_day(secs));
                let b = w.status_at(time_of_day(secs + 1));
                if a.in_curfew == b.in_curfew && a.boundary == b.boundary && a.remaining > Duration::zero() {
                    prop_assert!(b.remaining < a.remaining);
                }
            }
        }
    }
}
