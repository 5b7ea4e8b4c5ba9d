use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Account role. Fixed at registration and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    Child,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Parent => "parent",
            Role::Child => "child",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent" => Ok(Role::Parent),
            "child" => Ok(Role::Child),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// A verified requester identity, extracted from a bearer credential.
///
/// Every operation takes this as an explicit argument; nothing in the
/// system keys off ambient client state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub role: Role,
}

impl Identity {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_parent(&self) -> bool {
        self.role == Role::Parent
    }

    pub fn is_child(&self) -> bool {
        self.role == Role::Child
    }
}

/// Public view of an account another family member is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub linked_at: OffsetDateTime,
}

/// The composed "account + family" view served to a signed-in account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<LinkedAccount>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<LinkedAccount>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Single derivation point for the profile view. Callers fetch the
/// account row and the relationship view once per request and compose
/// here, instead of re-merging the two in every handler.
pub fn compose_profile(
    id: Uuid,
    name: String,
    email: String,
    role: Role,
    created_at: OffsetDateTime,
    parent: Option<LinkedAccount>,
    mut children: Vec<LinkedAccount>,
) -> Profile {
    // children never carry a parent view and vice versa
    let parent = match role {
        Role::Child => parent,
        Role::Parent => None,
    };
    if role == Role::Child {
        children.clear();
    }
    children.sort_by(|a, b| a.linked_at.cmp(&b.linked_at));

    Profile {
        id,
        name,
        email,
        role,
        parent,
        children,
        created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Parent, Role::Child] {
            let parsed: Role = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("grandparent".parse::<Role>().is_err());
    }

    #[test]
    fn compose_profile_drops_cross_role_views() {
        let now = OffsetDateTime::now_utc();
        let linked = LinkedAccount {
            id: Uuid::new_v4(),
            name: "A".into(),
            email: "a@example.com".into(),
            linked_at: now,
        };

        // a child never carries a children list
        let profile = compose_profile(
            Uuid::new_v4(),
            "Kid".into(),
            "kid@example.com".into(),
            Role::Child,
            now,
            Some(linked.clone()),
            vec![linked.clone()],
        );
        assert!(profile.parent.is_some());
        assert!(profile.children.is_empty());

        // and a parent never carries a parent view
        let profile = compose_profile(
            Uuid::new_v4(),
            "Mum".into(),
            "mum@example.com".into(),
            Role::Parent,
            now,
            Some(linked.clone()),
            vec![linked],
        );
        assert!(profile.parent.is_none());
        assert_eq!(profile.children.len(), 1);
    }
}
