//! Role headcount tracking.
//!
//! A project is fully staffed when every declared role has at least as many
//! accepted applications naming it as its headcount. Matching is exact and
//! case-sensitive. A project with no declared roles is never fully staffed
//! by this check; its owner closes it manually.

use serde::Serialize;

/// A role declared on a project.
pub trait DeclaredRole {
    fn role_name(&self) -> &str;
    fn headcount(&self) -> i32;
}

/// An accepted application, seen only through the role it fills.
pub trait RoleAssignment {
    fn assigned_role(&self) -> &str;
}

/// Filled vs. required headcount for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleFill {
    pub name: String,
    pub filled: usize,
    pub required: i32,
}

impl RoleFill {
    pub fn is_satisfied(&self) -> bool {
        self.filled as i64 >= i64::from(self.required)
    }
}

/// Number of accepted applications assigned to `role_name`.
pub fn accepted_for_role<A: RoleAssignment>(role_name: &str, accepted: &[A]) -> usize {
    accepted
        .iter()
        .filter(|a| a.assigned_role() == role_name)
        .count()
}

/// Whether `role` still has an open slot given the current acceptances.
pub fn has_capacity<R: DeclaredRole, A: RoleAssignment>(role: &R, accepted: &[A]) -> bool {
    (accepted_for_role(role.role_name(), accepted) as i64) < i64::from(role.headcount())
}

/// Per-role fill summary, in declaration order.
pub fn fill_summary<R: DeclaredRole, A: RoleAssignment>(roles: &[R], accepted: &[A]) -> Vec<RoleFill> {
    roles
        .iter()
        .map(|r| RoleFill {
            name: r.role_name().to_string(),
            filled: accepted_for_role(r.role_name(), accepted),
            required: r.headcount(),
        })
        .collect()
}

/// Whether every declared role has reached its headcount.
pub fn is_fully_staffed<R: DeclaredRole, A: RoleAssignment>(roles: &[R], accepted: &[A]) -> bool {
    !roles.is_empty() && fill_summary(roles, accepted).iter().all(RoleFill::is_satisfied)
}
