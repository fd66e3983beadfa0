//! Authenticated user identity.

use serde::{Deserialize, Serialize};

use crate::types::id::UserId;

/// Identity record for the authenticated user, or absent when anonymous.
///
/// Created from a successful login/registration response, cleared on logout,
/// refreshed on profile update. The bearer token authorizes every
/// authenticated backend call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    /// Backend user id. Also keys the per-user persisted snapshots.
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    /// Bearer token for authenticated calls. Absent in profile responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl SessionUser {
    /// Shallow-merge freshly fetched profile fields into this record.
    ///
    /// Server fields win; the token is kept from the existing record when
    /// the response omits it (profile responses do not echo it back).
    #[must_use]
    pub fn merged_with(&self, fresh: Self) -> Self {
        Self {
            id: fresh.id,
            name: fresh.name,
            email: fresh.email,
            is_admin: fresh.is_admin,
            token: fresh.token.or_else(|| self.token.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(token: Option<&str>) -> SessionUser {
        SessionUser {
            id: UserId::new("u-1"),
            name: "Mai".to_string(),
            email: "mai@example.com".to_string(),
            is_admin: false,
            token: token.map(String::from),
        }
    }

    #[test]
    fn test_merge_keeps_token_when_response_omits_it() {
        let current = user(Some("tok-abc"));
        let mut fresh = user(None);
        fresh.name = "Mai Anh".to_string();

        let merged = current.merged_with(fresh);
        assert_eq!(merged.name, "Mai Anh");
        assert_eq!(merged.token.as_deref(), Some("tok-abc"));
    }

    #[test]
    fn test_merge_prefers_server_token() {
        let current = user(Some("tok-old"));
        let fresh = user(Some("tok-new"));
        assert_eq!(current.merged_with(fresh).token.as_deref(), Some("tok-new"));
    }

    #[test]
    fn test_wire_format_uses_mongo_id() {
        let json = serde_json::to_value(user(Some("t"))).expect("serialize");
        assert_eq!(json["_id"], "u-1");
        assert_eq!(json["isAdmin"], false);
    }
}
