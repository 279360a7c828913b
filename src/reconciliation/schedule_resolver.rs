//! Schedule resolution.
//!
//! Maps an employee to the shift template their punches are read against.
//! The role label wins when it names a known category; because that column
//! is often blank, ID-based fallbacks follow in a fixed order:
//!
//! 1. role keyword match
//! 2. manager ID allowlist
//! 3. reception ID mapping (each with its own layout)
//! 4. default half-day template

use serde::Serialize;

use crate::config::{RoleKeyword, RosterConfig};
use crate::models::{EmployeeId, RoleCategory, ShiftTemplate};

/// Classifies a free-text role label against a keyword table.
///
/// Keywords are matched case-insensitively as substrings, in table order.
/// Returns `None` for a blank or unrecognised label.
///
/// # Example
///
/// ```
/// use attendance_engine::config::default_role_keywords;
/// use attendance_engine::models::RoleCategory;
/// use attendance_engine::reconciliation::classify_role;
///
/// let keywords = default_role_keywords();
/// assert_eq!(classify_role("Store Manager", &keywords), Some(RoleCategory::Manager));
/// assert_eq!(classify_role("NV Part-time", &keywords), Some(RoleCategory::PartTime));
/// assert_eq!(classify_role("Cashier", &keywords), None);
/// ```
pub fn classify_role(role: &str, keywords: &[RoleKeyword]) -> Option<RoleCategory> {
    let role = role.trim().to_lowercase();
    if role.is_empty() {
        return None;
    }
    keywords
        .iter()
        .find(|entry| role.contains(&entry.keyword.to_lowercase()))
        .map(|entry| entry.category)
}

/// The template chosen for an employee and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedSchedule<'a> {
    /// The category that selected the template.
    pub category: RoleCategory,
    /// The template to read punches against.
    pub template: &'a ShiftTemplate,
}

/// Resolves employees to shift templates using an immutable roster.
#[derive(Debug, Clone)]
pub struct ScheduleResolver {
    roster: RosterConfig,
    reception_templates: Vec<(EmployeeId, ShiftTemplate)>,
}

impl ScheduleResolver {
    /// Creates a resolver over the given roster.
    pub fn new(roster: RosterConfig) -> Self {
        let reception_templates = roster
            .reception
            .iter()
            .map(|(id, layout)| (id.clone(), ShiftTemplate::Sessions(layout.clone())))
            .collect();
        Self {
            roster,
            reception_templates,
        }
    }

    /// The roster this resolver reads.
    pub fn roster(&self) -> &RosterConfig {
        &self.roster
    }

    /// Picks the template for an employee.
    pub fn resolve(&self, employee: &EmployeeId, role: Option<&str>) -> ResolvedSchedule<'_> {
        let from_role = role.and_then(|label| classify_role(label, &self.roster.role_keywords));

        let category = match from_role {
            Some(category) => category,
            None if self.roster.managers.contains(employee) => RoleCategory::Manager,
            None if self.reception_template(employee).is_some() => RoleCategory::Reception,
            None => RoleCategory::Default,
        };

        ResolvedSchedule {
            category,
            template: self.template_for(category, employee),
        }
    }

    fn reception_template(&self, employee: &EmployeeId) -> Option<&ShiftTemplate> {
        self.reception_templates
            .iter()
            .find(|(id, _)| id == employee)
            .map(|(_, template)| template)
    }

    fn template_for(&self, category: RoleCategory, employee: &EmployeeId) -> &ShiftTemplate {
        let templates = &self.roster.templates;
        match category {
            RoleCategory::Manager => &templates.manager,
            RoleCategory::PartTime => &templates.part_time,
            RoleCategory::Online => &templates.online,
            RoleCategory::Reception => self
                .reception_template(employee)
                .unwrap_or(&templates.default),
            RoleCategory::Default => &templates.default,
        }
    }
}
