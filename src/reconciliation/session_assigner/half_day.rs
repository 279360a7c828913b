//! Half-day split assignment.
//!
//! Raw punches carry no session label, so a half-day day is interpreted
//! purely from how many punches there are and where they fall relative to
//! the template's windows. Each punch count has its own strategy. When no
//! pattern fits, slots stay empty: a missing punch gets corrected by a
//! person, a wrong assignment silently corrupts payroll.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::AssignmentPolicy;
use crate::models::{HalfDayTemplate, Session, SessionName, TimeToken};

/// An inclusive range of minutes of the day.
///
/// Bounds may extend past midnight on either side; such windows simply
/// never match there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    /// First matching minute.
    pub open: i32,
    /// Last matching minute.
    pub close: i32,
}

impl Window {
    fn around(anchor: TimeToken, before: i32, after: i32) -> Self {
        let anchor = i32::from(anchor.minute_of_day());
        Self {
            open: anchor - before,
            close: anchor + after,
        }
    }

    /// Returns true if `token` lies within the window.
    pub fn contains(&self, token: TimeToken) -> bool {
        let minute = i32::from(token.minute_of_day());
        self.open <= minute && minute <= self.close
    }
}

/// The four punch windows derived from a half-day template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HalfDayWindows {
    /// Where a morning check-in may fall.
    pub morning_in: Window,
    /// Where a morning check-out may fall.
    pub morning_out: Window,
    /// Where an afternoon check-in may fall.
    pub afternoon_in: Window,
    /// Where an afternoon check-out may fall.
    pub afternoon_out: Window,
    /// Minimum minutes between a session's check-in and check-out.
    pub min_gap: i32,
    /// Minimum minutes between a morning check-in and an afternoon check-out.
    pub split_gap: i32,
}

impl HalfDayWindows {
    /// Derives the windows from a template and policy.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_engine::config::AssignmentPolicy;
    /// use attendance_engine::models::{HalfDayTemplate, SessionWindow};
    /// use attendance_engine::reconciliation::HalfDayWindows;
    ///
    /// let t = |s: &str| s.parse().unwrap();
    /// let template = HalfDayTemplate::new(
    ///     SessionWindow { start: t("08:30"), end: t("12:00") },
    ///     SessionWindow { start: t("13:15"), end: t("16:45") },
    /// );
    /// let windows = HalfDayWindows::new(&template, &AssignmentPolicy::default());
    /// assert!(windows.morning_in.contains(t("07:00")));
    /// assert!(!windows.morning_in.contains(t("10:01")));
    /// assert!(windows.afternoon_in.contains(t("12:00")));
    /// ```
    pub fn new(template: &HalfDayTemplate, policy: &AssignmentPolicy) -> Self {
        let morning = template.morning;
        let afternoon = template.afternoon;
        let afternoon_in_open = morning.end.max(template.cutoff);

        Self {
            morning_in: Window::around(morning.start, policy.checkin_lead, policy.checkin_grace),
            morning_out: Window {
                open: i32::from(morning.start.minute_of_day()) + policy.checkout_after_start,
                close: i32::from(morning.end.minute_of_day()) + policy.morning_checkout_tail,
            },
            afternoon_in: Window {
                open: i32::from(afternoon_in_open.minute_of_day()),
                close: i32::from(afternoon.start.minute_of_day()) + policy.checkin_grace,
            },
            afternoon_out: Window {
                open: i32::from(afternoon.start.minute_of_day()) + policy.checkout_after_start,
                close: i32::from(afternoon.end.minute_of_day())
                    + policy.afternoon_checkout_tail,
            },
            min_gap: policy.min_session_gap,
            split_gap: policy.split_shift_gap,
        }
    }

    fn full_gap(&self, from: TimeToken, to: TimeToken) -> bool {
        from.minutes_until(to) >= self.min_gap
    }
}

/// The four punch slots of a half-day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slots {
    /// Morning check-in.
    pub morning_in: Option<TimeToken>,
    /// Morning check-out.
    pub morning_out: Option<TimeToken>,
    /// Afternoon check-in.
    pub afternoon_in: Option<TimeToken>,
    /// Afternoon check-out.
    pub afternoon_out: Option<TimeToken>,
}

impl Slots {
    fn filled(&self) -> impl Iterator<Item = TimeToken> {
        [
            self.morning_in,
            self.morning_out,
            self.afternoon_in,
            self.afternoon_out,
        ]
        .into_iter()
        .flatten()
    }
}

/// A pure assignment function for one punch count.
pub type Strategy = fn(&[TimeToken], &HalfDayWindows) -> Slots;

/// The strategy table keyed by punch count.
///
/// Counts without an entry (five or more) are never interpreted.
pub fn strategy_for(count: usize) -> Option<Strategy> {
    match count {
        0 => Some(assign_none),
        1 => Some(assign_single),
        2 => Some(assign_pair),
        3 => Some(assign_triple),
        4 => Some(assign_quad),
        _ => None,
    }
}

fn assign_none(_: &[TimeToken], _: &HalfDayWindows) -> Slots {
    Slots::default()
}

/// First matching of morning-in, morning-out, afternoon-in, afternoon-out.
fn assign_single(tokens: &[TimeToken], w: &HalfDayWindows) -> Slots {
    let punch = tokens[0];
    let mut slots = Slots::default();
    if w.morning_in.contains(punch) {
        slots.morning_in = Some(punch);
    } else if w.morning_out.contains(punch) {
        slots.morning_out = Some(punch);
    } else if w.afternoon_in.contains(punch) {
        slots.afternoon_in = Some(punch);
    } else if w.afternoon_out.contains(punch) {
        slots.afternoon_out = Some(punch);
    }
    slots
}

/// Two punches: fixed-priority patterns, first match wins.
fn assign_pair(tokens: &[TimeToken], w: &HalfDayWindows) -> Slots {
    let (first, second) = (tokens[0], tokens[1]);
    let mut slots = Slots::default();

    if w.morning_in.contains(first) && w.morning_out.contains(second) && w.full_gap(first, second)
    {
        // Full morning.
        slots.morning_in = Some(first);
        slots.morning_out = Some(second);
    } else if w.afternoon_in.contains(first)
        && w.afternoon_out.contains(second)
        && w.full_gap(first, second)
    {
        // Full afternoon.
        slots.afternoon_in = Some(first);
        slots.afternoon_out = Some(second);
    } else if w.morning_in.contains(first)
        && w.afternoon_out.contains(second)
        && first.minutes_until(second) >= w.split_gap
    {
        // Whole day, both middle punches missing.
        slots.morning_in = Some(first);
        slots.afternoon_out = Some(second);
    } else if w.morning_out.contains(first) && w.afternoon_out.contains(second) && first < second {
        // Both check-ins missing.
        slots.morning_out = Some(first);
        slots.afternoon_out = Some(second);
    } else if w.morning_in.contains(first) && w.afternoon_in.contains(second) && first < second {
        // Both check-outs missing.
        slots.morning_in = Some(first);
        slots.afternoon_in = Some(second);
    } else if w.morning_out.contains(first) && w.afternoon_in.contains(second) && first < second {
        // Morning check-in and afternoon check-out missing.
        slots.morning_out = Some(first);
        slots.afternoon_in = Some(second);
    }
    slots
}

/// Three punches: positional sub-patterns anchored on the first punch.
///
/// When the anchored patterns leave a punch unplaced, the morning-out plus
/// afternoon pair is tried and wins if it places all three.
fn assign_triple(tokens: &[TimeToken], w: &HalfDayWindows) -> Slots {
    let anchored = anchor_triple(tokens, w);
    if anchored.filled().count() == tokens.len() {
        return anchored;
    }
    split_after_morning(tokens, w).unwrap_or(anchored)
}

fn anchor_triple(tokens: &[TimeToken], w: &HalfDayWindows) -> Slots {
    let (first, second, third) = (tokens[0], tokens[1], tokens[2]);
    let mut slots = Slots::default();

    if w.morning_in.contains(first) {
        slots.morning_in = Some(first);
        if w.morning_out.contains(second) && w.full_gap(first, second) {
            slots.morning_out = Some(second);
            if w.afternoon_in.contains(third) && second < third {
                slots.afternoon_in = Some(third);
            } else if w.afternoon_out.contains(third) {
                slots.afternoon_out = Some(third);
            }
        } else if w.afternoon_in.contains(second) {
            // Morning check-out skipped.
            slots.afternoon_in = Some(second);
            if w.afternoon_out.contains(third) && w.full_gap(second, third) {
                slots.afternoon_out = Some(third);
            }
        } else if w.afternoon_out.contains(second) {
            slots.afternoon_out = Some(second);
            // An afternoon check-in logged after the check-out.
            if w.afternoon_in.contains(third) && third < second {
                slots.afternoon_in = Some(third);
            }
        }
    } else if w.afternoon_in.contains(first) {
        slots.afternoon_in = Some(first);
        let out = [third, second]
            .into_iter()
            .find(|&punch| w.afternoon_out.contains(punch) && w.full_gap(first, punch));
        slots.afternoon_out = out;
    }
    slots
}

/// Morning check-out followed by a full afternoon; morning check-in missing.
fn split_after_morning(tokens: &[TimeToken], w: &HalfDayWindows) -> Option<Slots> {
    let (first, second, third) = (tokens[0], tokens[1], tokens[2]);
    let fits = w.morning_out.contains(first)
        && w.afternoon_in.contains(second)
        && first < second
        && w.afternoon_out.contains(third)
        && w.full_gap(second, third);
    fits.then_some(Slots {
        morning_in: None,
        morning_out: Some(first),
        afternoon_in: Some(second),
        afternoon_out: Some(third),
    })
}

/// Four punches: strict positional assignment, each slot checked on its own.
fn assign_quad(tokens: &[TimeToken], w: &HalfDayWindows) -> Slots {
    let (first, second, third, fourth) = (tokens[0], tokens[1], tokens[2], tokens[3]);
    let mut slots = Slots::default();

    if w.morning_in.contains(first) {
        slots.morning_in = Some(first);
    }
    if w.morning_out.contains(second) && w.full_gap(first, second) {
        slots.morning_out = Some(second);
    }
    // The afternoon check-in window opens at the cutoff, so a late morning
    // check-out does not push it out.
    if w.afternoon_in.contains(third) && second < third {
        slots.afternoon_in = Some(third);
    }
    if w.afternoon_out.contains(fourth) && w.full_gap(third, fourth) {
        slots.afternoon_out = Some(fourth);
    }
    slots
}

/// Turns filled slots into morning and afternoon sessions.
///
/// Punches that landed in no slot stay visible: they are attributed to the
/// morning when before the cutoff and to the afternoon otherwise.
pub fn build_sessions(
    tokens: &[TimeToken],
    slots: &Slots,
    template: &HalfDayTemplate,
) -> BTreeMap<SessionName, Session> {
    let placed: Vec<TimeToken> = slots.filled().collect();
    let (morning_strays, afternoon_strays): (Vec<TimeToken>, Vec<TimeToken>) = tokens
        .iter()
        .copied()
        .filter(|punch| !placed.contains(punch))
        .partition(|&punch| punch < template.cutoff);

    let morning_times = [slots.morning_in, slots.morning_out]
        .into_iter()
        .flatten()
        .chain(morning_strays)
        .collect();
    let afternoon_times = [slots.afternoon_in, slots.afternoon_out]
        .into_iter()
        .flatten()
        .chain(afternoon_strays)
        .collect();

    BTreeMap::from([
        (
            SessionName::Morning,
            Session::new(
                SessionName::Morning,
                template.morning.start,
                morning_times,
                slots.morning_in,
                slots.morning_out,
            ),
        ),
        (
            SessionName::Afternoon,
            Session::new(
                SessionName::Afternoon,
                template.afternoon.start,
                afternoon_times,
                slots.afternoon_in,
                slots.afternoon_out,
            ),
        ),
    ])
}
