//! Profile projection: one canonical view over two stores.
//!
//! A user's display identity lives in two places: the identity provider's
//! metadata bag (always present once the account exists, possibly empty) and
//! the application-owned profile row (absent until first edited). Reads merge
//! them field by field; writes go to the profile row first and mirror into
//! provider metadata best-effort.

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

use crate::db::models::{ProfileRecord, ProfileUpsertParams, UserMetadata};
use crate::error::AppResult;
use crate::jwt::AuthInfo;
use crate::startup::AppState;

/// Display name of last resort.
pub(crate) const DEFAULT_DISPLAY_NAME: &str = "Utilizador";

/// Canonical merged profile view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub user_id: Uuid,
    pub name: String,
    pub avatar_url: String,
    pub bio: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Profile update payload; every field is overwritten on write.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// The part of an email before `@`, if usable as a display name.
pub(crate) fn email_local_part(email: &str) -> Option<&str> {
    email.split('@').next().filter(|s| !s.is_empty())
}

/// Owner display-name fallback chain: metadata name, email local-part,
/// fixed default.
pub(crate) fn fallback_display_name(meta_name: Option<&str>, email: &str) -> String {
    meta_name
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| email_local_part(email).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Merge the profile row (if any) with provider metadata.
///
/// Each field independently prefers the non-empty profile value, then
/// metadata; `name` falls through further to the email local-part and the
/// fixed default so it is never empty.
pub fn merge_profile(
    user_id: Uuid,
    profile: Option<&ProfileRecord>,
    metadata: &UserMetadata,
    email: &str,
) -> ProfileView {
    let profile_name = profile.and_then(|p| non_empty(Some(p.name.as_str())));
    let name = profile_name
        .map(str::to_string)
        .unwrap_or_else(|| fallback_display_name(metadata.name.as_deref(), email));

    let field = |from_profile: Option<&str>, from_meta: Option<&str>| -> String {
        non_empty(from_profile)
            .or_else(|| non_empty(from_meta))
            .unwrap_or_default()
            .to_string()
    };

    ProfileView {
        user_id,
        name,
        avatar_url: field(
            profile.and_then(|p| p.avatar_url.as_deref()),
            metadata.avatar_url.as_deref(),
        ),
        bio: field(
            profile.and_then(|p| p.bio.as_deref()),
            metadata.bio.as_deref(),
        ),
        location: field(
            profile.and_then(|p| p.location.as_deref()),
            metadata.location.as_deref(),
        ),
        updated_at: profile.map(|p| p.updated_at),
    }
}

/// `GET /profile` — never fails for an authenticated caller; an absent
/// profile row yields a metadata-derived view.
pub async fn get_profile(State(state): State<AppState>, auth: AuthInfo) -> AppResult<Json<Value>> {
    let profile = state.db.profiles.get(auth.user_id).await?;
    let user = state.db.users.find(auth.user_id).await?;

    let (metadata, email) = match user {
        Some(record) => (record.metadata.0, record.email),
        // Token is valid but the provider row is gone; fall back to claims.
        None => (UserMetadata::default(), auth.email.clone()),
    };

    let view = merge_profile(auth.user_id, profile.as_ref(), &metadata, &email);
    Ok(Json(json!({ "profile": view })))
}

/// `PUT /profile` — upsert the profile row, then mirror the same fields into
/// provider metadata. The mirror is best-effort: once the primary write
/// succeeded, its failure is logged and the request still succeeds.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthInfo,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<Value>> {
    let record = state
        .db
        .profiles
        .upsert(ProfileUpsertParams {
            user_id: auth.user_id,
            name: update.name.clone(),
            avatar_url: update.avatar_url.clone(),
            bio: update.bio.clone(),
            location: update.location.clone(),
        })
        .await?;

    let mirror = UserMetadata {
        name: Some(update.name),
        avatar_url: update.avatar_url,
        bio: update.bio,
        location: update.location,
    };
    if let Err(err) = state.db.users.update_metadata(auth.user_id, &mirror).await {
        warn!(user_id = %auth.user_id, error = %err, "Profile metadata mirror failed");
    }

    let view = merge_profile(auth.user_id, Some(&record), &mirror, &auth.email);
    tracing::info!(user_id = %auth.user_id, "Profile updated");
    Ok(Json(json!({ "success": true, "profile": view })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(name: &str, avatar: &str, bio: &str, location: &str) -> UserMetadata {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        UserMetadata {
            name: opt(name),
            avatar_url: opt(avatar),
            bio: opt(bio),
            location: opt(location),
        }
    }

    fn profile_row(user_id: Uuid, name: &str, avatar: &str, bio: &str, location: &str) -> ProfileRecord {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        ProfileRecord {
            user_id,
            name: name.to_string(),
            avatar_url: opt(avatar),
            bio: opt(bio),
            location: opt(location),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn absent_profile_derives_view_from_metadata() {
        let user_id = Uuid::new_v4();
        let meta = metadata("Ana", "http://a/pic.png", "Olá", "Porto");

        let view = merge_profile(user_id, None, &meta, "ana@example.com");
        assert_eq!(view.name, "Ana");
        assert_eq!(view.avatar_url, "http://a/pic.png");
        assert_eq!(view.bio, "Olá");
        assert_eq!(view.location, "Porto");
        assert!(view.updated_at.is_none());
    }

    #[test]
    fn profile_fields_override_metadata_only_when_non_empty() {
        let user_id = Uuid::new_v4();
        let meta = metadata("Ana", "http://a/old.png", "Old bio", "Porto");
        let profile = profile_row(user_id, "Ana Silva", "", "New bio", "");

        let view = merge_profile(user_id, Some(&profile), &meta, "ana@example.com");
        assert_eq!(view.name, "Ana Silva");
        // Empty profile fields fall back to metadata, not to defaults.
        assert_eq!(view.avatar_url, "http://a/old.png");
        assert_eq!(view.bio, "New bio");
        assert_eq!(view.location, "Porto");
    }

    #[test]
    fn name_falls_back_to_email_local_part() {
        let view = merge_profile(
            Uuid::new_v4(),
            None,
            &UserMetadata::default(),
            "carlos@example.com",
        );
        assert_eq!(view.name, "carlos");
    }

    #[test]
    fn name_never_empty() {
        let view = merge_profile(Uuid::new_v4(), None, &UserMetadata::default(), "");
        assert_eq!(view.name, DEFAULT_DISPLAY_NAME);
    }

    #[test]
    fn avatar_has_no_email_derived_fallback() {
        let view = merge_profile(
            Uuid::new_v4(),
            None,
            &UserMetadata::default(),
            "ana@example.com",
        );
        assert_eq!(view.avatar_url, "");
    }

    #[test]
    fn fallback_chain_order() {
        assert_eq!(fallback_display_name(Some("Ana"), "x@y.z"), "Ana");
        assert_eq!(fallback_display_name(Some(""), "x@y.z"), "x");
        assert_eq!(fallback_display_name(None, "x@y.z"), "x");
        assert_eq!(fallback_display_name(None, ""), DEFAULT_DISPLAY_NAME);
        assert_eq!(fallback_display_name(None, "@y.z"), DEFAULT_DISPLAY_NAME);
    }
}
