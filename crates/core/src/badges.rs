//! Reputation badge identifiers.
//!
//! Badges are granted idempotently and never revoked.

/// Granted when a user creates their first project.
pub const BADGE_PROJECT_CREATOR: &str = "PROJECT_CREATOR";

/// Granted when a user is first accepted onto a team.
pub const BADGE_TEAM_MEMBER: &str = "TEAM_MEMBER";

/// Granted once a user has at least [`COMPLETED_PRO_THRESHOLD`] completed projects.
pub const BADGE_COMPLETED_PRO: &str = "COMPLETED_PRO";

pub const COMPLETED_PRO_THRESHOLD: i32 = 1;

pub const KNOWN_BADGES: &[&str] = &[BADGE_PROJECT_CREATOR, BADGE_TEAM_MEMBER, BADGE_COMPLETED_PRO];

/// Badge earned by reaching `completed_count` completed projects, if any.
pub fn badge_for_completion_count(completed_count: i32) -> Option<&'static str> {
    (completed_count >= COMPLETED_PRO_THRESHOLD).then_some(BADGE_COMPLETED_PRO)
}

pub fn is_known_badge(badge: &str) -> bool {
    KNOWN_BADGES.contains(&badge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_completion_earns_completed_pro() {
        assert_eq!(badge_for_completion_count(0), None);
        assert_eq!(badge_for_completion_count(1), Some(BADGE_COMPLETED_PRO));
        assert_eq!(badge_for_completion_count(12), Some(BADGE_COMPLETED_PRO));
    }

    #[test]
    fn known_badges() {
        assert!(is_known_badge("TEAM_MEMBER"));
        assert!(!is_known_badge("team_member"));
    }
}
