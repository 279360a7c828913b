//! Session assignment.
//!
//! Interprets one employee-day's punches against a shift template and
//! produces per-session check-in / check-out assignments. Two modes exist:
//!
//! - **half-day**: a punch-count strategy table over four derived windows
//! - **named layout**: punches bucketed into explicit session windows
//!
//! Days with more punches than the policy allows are never guessed at; they
//! come back as [`DayAssignment::Problematic`].

mod half_day;
mod named;

pub use half_day::{HalfDayWindows, Slots, Strategy, Window, build_sessions, strategy_for};
pub use named::assign_layout;

use tracing::debug;

use crate::config::AssignmentPolicy;
use crate::models::{DayAssignment, ShiftTemplate, TimeToken};

/// Assigns punches to sessions under an injected policy.
///
/// # Example
///
/// ```
/// use attendance_engine::config::{AssignmentPolicy, RoleTemplates};
/// use attendance_engine::models::{SessionName, TimeToken};
/// use attendance_engine::reconciliation::SessionAssigner;
///
/// let assigner = SessionAssigner::new(AssignmentPolicy::default());
/// let template = RoleTemplates::default().default;
/// let tokens: Vec<TimeToken> = ["08:20", "12:05", "13:20", "16:50"]
///     .iter()
///     .map(|s| s.parse().unwrap())
///     .collect();
///
/// let day = assigner.assign(&tokens, &template);
/// let afternoon = day.session(SessionName::Afternoon).unwrap();
/// assert_eq!(afternoon.late_minutes, 5);
/// ```
#[derive(Debug, Clone)]
pub struct SessionAssigner {
    policy: AssignmentPolicy,
}

impl SessionAssigner {
    /// Creates an assigner with the given thresholds.
    pub fn new(policy: AssignmentPolicy) -> Self {
        Self { policy }
    }

    /// The thresholds in use.
    pub fn policy(&self) -> &AssignmentPolicy {
        &self.policy
    }

    /// Assigns one day's punches.
    ///
    /// `tokens` are expected sorted and de-duplicated, as produced by
    /// normalization; this is not re-checked.
    pub fn assign(&self, tokens: &[TimeToken], template: &ShiftTemplate) -> DayAssignment {
        match template {
            ShiftTemplate::HalfDay(half_day) => {
                if tokens.len() > self.policy.max_tokens_per_day {
                    return self.problematic(tokens);
                }
                let Some(strategy) = strategy_for(tokens.len()) else {
                    return self.problematic(tokens);
                };
                let windows = HalfDayWindows::new(half_day, &self.policy);
                let slots = strategy(tokens, &windows);
                DayAssignment::Assigned {
                    sessions: build_sessions(tokens, &slots, half_day),
                    dropped: Vec::new(),
                }
            }
            ShiftTemplate::Sessions(layout) => {
                if tokens.len() > self.policy.max_tokens_per_day {
                    return self.problematic(tokens);
                }
                let (sessions, dropped) = assign_layout(tokens, layout, &self.policy.named);
                DayAssignment::Assigned { sessions, dropped }
            }
        }
    }

    fn problematic(&self, tokens: &[TimeToken]) -> DayAssignment {
        debug!(
            times_count = tokens.len(),
            limit = self.policy.max_tokens_per_day,
            "Too many punches to interpret"
        );
        DayAssignment::Problematic {
            times_count: tokens.len(),
            times: tokens.to_vec(),
        }
    }
}
