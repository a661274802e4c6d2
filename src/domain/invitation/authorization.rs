//! Invitation authorization
//!
//! Decides whether the holder of one role set may issue an invitation for a
//! member holding another. Rules are checked in order, first match wins:
//!
//! 1. the inviter is an admin;
//! 2. the inviter coaches, the invitee plays, and they share a team.

use crate::domain::member::{RoleSet, TeamId};

/// Outcome of an authorization check, with the rule that granted it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Granted by the inviter's admin role
    Admin,
    /// Granted because the inviter coaches a team the invitee plays in
    SharedTeam(TeamId),
    Denied,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Denied)
    }
}

/// Evaluate the rules and report which one matched
pub fn decide(inviting: &RoleSet, invited: &RoleSet) -> Decision {
    if inviting.is_admin() {
        return Decision::Admin;
    }

    match (inviting.coach_teams(), invited.player_teams()) {
        (Some(coached), Some(played)) => coached
            .intersection(played)
            .next()
            .map(|team| Decision::SharedTeam(team.clone()))
            .unwrap_or(Decision::Denied),
        _ => Decision::Denied,
    }
}

/// Whether `inviting` may issue an invitation naming a member with `invited`
pub fn authorize(inviting: &RoleSet, invited: &RoleSet) -> bool {
    decide(inviting, invited).is_allowed()
}
