//! Member roles
//!
//! In the store a member's roles are a map from role name to payload:
//!
//! ```json
//! { "admin": true, "coach": ["T1"], "player": ["T1", "T2"] }
//! ```
//!
//! In memory they are a [`RoleSet`] of typed [`Role`] variants. Unknown role
//! names are dropped when reading.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::storage::IdValidationError;

/// Team identifier carried in coach and player roles
///
/// Team ids are never document keys, so any non-empty name without control
/// characters is accepted ("U14 Girls", "first/second").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TeamId(String);

impl TeamId {
    pub fn new(id: impl Into<String>) -> Result<Self, IdValidationError> {
        let id = id.into();

        if id.trim().is_empty() {
            return Err(IdValidationError::Empty("Team"));
        }

        if id.chars().any(char::is_control) {
            return Err(IdValidationError::ControlCharacters("Team"));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TeamId {
    type Error = IdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TeamId> for String {
    fn from(id: TeamId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A role held by a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Club administrator
    Admin,
    /// Coach of the given teams
    Coach { teams: BTreeSet<TeamId> },
    /// Player in the given teams
    Player { teams: BTreeSet<TeamId> },
}

impl Role {
    pub fn coach<I, T>(teams: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TeamId>,
    {
        Self::Coach {
            teams: teams.into_iter().map(Into::into).collect(),
        }
    }

    pub fn player<I, T>(teams: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TeamId>,
    {
        Self::Player {
            teams: teams.into_iter().map(Into::into).collect(),
        }
    }

    fn kind(&self) -> RoleKind {
        match self {
            Self::Admin => RoleKind::Admin,
            Self::Coach { .. } => RoleKind::Coach,
            Self::Player { .. } => RoleKind::Player,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleKind {
    Admin,
    Coach,
    Player,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Coach { .. } => write!(f, "coach"),
            Self::Player { .. } => write!(f, "player"),
        }
    }
}

/// The set of roles held by one member, at most one per role kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RoleMap", into = "RoleMap")]
pub struct RoleSet {
    roles: Vec<Role>,
}

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role, replacing any role of the same kind (builder pattern)
    pub fn with(mut self, role: Role) -> Self {
        self.insert(role);
        self
    }

    /// Add a role, replacing any role of the same kind
    pub fn insert(&mut self, role: Role) {
        let kind = role.kind();
        self.roles.retain(|r| r.kind() != kind);
        self.roles.push(role);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| matches!(r, Role::Admin))
    }

    pub fn coach_teams(&self) -> Option<&BTreeSet<TeamId>> {
        self.roles.iter().find_map(|r| match r {
            Role::Coach { teams } => Some(teams),
            _ => None,
        })
    }

    pub fn player_teams(&self) -> Option<&BTreeSet<TeamId>> {
        self.roles.iter().find_map(|r| match r {
            Role::Player { teams } => Some(teams),
            _ => None,
        })
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), Self::with)
    }
}

/// Store representation of a role set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RoleMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    admin: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coach: Option<BTreeSet<TeamId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    player: Option<BTreeSet<TeamId>>,
}

/// Truthiness of an untyped role payload
fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl From<RoleMap> for RoleSet {
    fn from(map: RoleMap) -> Self {
        let mut roles = RoleSet::new();

        if map.admin.as_ref().is_some_and(is_truthy) {
            roles.insert(Role::Admin);
        }

        if let Some(teams) = map.coach {
            roles.insert(Role::Coach { teams });
        }

        if let Some(teams) = map.player {
            roles.insert(Role::Player { teams });
        }

        roles
    }
}

impl From<RoleSet> for RoleMap {
    fn from(set: RoleSet) -> Self {
        let mut map = RoleMap::default();

        for role in set.roles {
            match role {
                Role::Admin => map.admin = Some(serde_json::Value::Bool(true)),
                Role::Coach { teams } => map.coach = Some(teams),
                Role::Player { teams } => map.player = Some(teams),
            }
        }

        map
    }
}
