//! User profile as issued by the backend and mirrored in storage.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::role::normalize_role;

/// Role reference as it appears on a user profile.
///
/// The backend sends either a bare role name or a full role object
/// carrying a `name`. Every consumer goes through [`normalize_role`]
/// instead of inspecting the shape directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleRef {
    /// Plain role name, e.g. `"Librarian"`.
    Name(String),
    /// Structured role object, e.g. `{"id": 3, "name": "Librarian"}`.
    Structured(RoleObject),
}

impl RoleRef {
    /// Returns the raw (non-normalized) role name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Structured(role) => role.name.as_deref(),
        }
    }
}

impl From<&str> for RoleRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Structured role object. Fields other than `name` are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoleObject {
    /// Role name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Any other role attributes (id, description, nested permissions...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RoleObject {
    /// Creates a role object with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            extra: Map::new(),
        }
    }
}

/// Authenticated user's profile.
///
/// Unknown fields round-trip through `extra` so that the stored copy is
/// exactly what the backend issued.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Login name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Role, as a name or a structured object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleRef>,
    /// Flattened permission codes.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "BTreeSet::is_empty"
    )]
    pub permissions: BTreeSet<String>,
    /// Remaining backend fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<BTreeSet<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl UserProfile {
    /// Creates a profile with only an id.
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Sets the role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<RoleRef>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Sets the username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Replaces the permission set.
    #[must_use]
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Canonical lower-cased role, or `None` when the profile carries no role name.
    #[must_use]
    pub fn normalized_role(&self) -> Option<String> {
        normalize_role(self.role.as_ref())
    }

    /// True when the profile carries no information at all (`{}` on the wire).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.full_name.is_none()
            && self.role.is_none()
            && self.permissions.is_empty()
            && self.extra.is_empty()
    }

    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("User")
    }
}

impl From<RoleObject> for RoleRef {
    fn from(role: RoleObject) -> Self {
        Self::Structured(role)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_plain_role() {
        let user: UserProfile = serde_json::from_str(r#"{"id":1,"role":"member"}"#).unwrap();
        assert_eq!(user.id, Some(1));
        assert_eq!(user.role, Some(RoleRef::from("member")));
        assert!(user.permissions.is_empty());
    }

    #[test]
    fn parses_structured_role_and_keeps_extra_fields() {
        let json = r#"{
            "id": 7,
            "username": "amina",
            "status": "Active",
            "role": {"id": 2, "name": "Librarian", "permissions": []},
            "permissions": ["BOOK_CREATE", "BOOK_EDIT"]
        }"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();

        assert_eq!(user.role.as_ref().and_then(RoleRef::name), Some("Librarian"));
        assert_eq!(user.normalized_role().as_deref(), Some("librarian"));
        assert_eq!(user.extra.get("status"), Some(&Value::from("Active")));
        assert!(user.permissions.contains("BOOK_EDIT"));

        let again: UserProfile =
            serde_json::from_str(&serde_json::to_string(&user).unwrap()).unwrap();
        assert_eq!(again, user);
    }

    #[test]
    fn null_permissions_become_empty() {
        let user: UserProfile =
            serde_json::from_str(r#"{"id":1,"permissions":null,"role":null}"#).unwrap();
        assert!(user.permissions.is_empty());
        assert!(user.role.is_none());
    }

    #[test]
    fn empty_object_is_empty() {
        let user: UserProfile = serde_json::from_str("{}").unwrap();
        assert!(user.is_empty());
        assert!(!UserProfile::new(1).is_empty());
    }

    #[test]
    fn display_name_prefers_full_name() {
        let mut user = UserProfile::new(1).with_username("amina");
        assert_eq!(user.display_name(), "amina");
        user.full_name = Some("Amina Q.".to_string());
        assert_eq!(user.display_name(), "Amina Q.");
        assert_eq!(UserProfile::default().display_name(), "User");
    }
}
