//! Storage-facing records (snake_case, one struct per table projection).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// Loosely-structured metadata bag the identity provider keeps per user.
///
/// Every field is optional; an account that never edited its profile has an
/// empty bag. Reads must tolerate all of these being absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Identity-provider user record (the provider-owned table).
#[derive(Debug, Clone, FromRow)]
pub struct AuthUserRecord {
    pub id: Uuid,
    pub email: String,
    pub metadata: Json<UserMetadata>,
}

/// Application-owned profile row, created lazily on first profile edit.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProfileRecord {
    pub user_id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for the create-or-replace profile write.
#[derive(Debug, Clone)]
pub struct ProfileUpsertParams {
    pub user_id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

/// Clothing item row.
///
/// `materials`, `seasons` and `is_public` are nullable: rows written before
/// those columns existed carry NULL, which the catalog adapter defaults.
#[derive(Debug, Clone, FromRow)]
pub struct ItemRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub size: Option<String>,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub layer: i32,
    pub materials: Option<Vec<String>>,
    pub weight: f64,
    pub temp_min: i32,
    pub temp_max: i32,
    pub waterproof: bool,
    pub windproof: bool,
    pub seasons: Option<Vec<String>>,
    pub image: String,
    pub status: String,
    pub favorite: bool,
    pub is_public: Option<bool>,
}

/// All item fields a caller supplies on create or full-record replace.
#[derive(Debug, Clone)]
pub struct ItemWrite {
    pub name: String,
    pub brand: String,
    pub size: String,
    pub kind: String,
    pub layer: i32,
    pub materials: Vec<String>,
    pub weight: f64,
    pub temp_min: i32,
    pub temp_max: i32,
    pub waterproof: bool,
    pub windproof: bool,
    pub seasons: Vec<String>,
    pub image: String,
    pub status: String,
    pub favorite: bool,
    pub is_public: bool,
}

/// Comment row with the author display identity snapshotted at write time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub text: String,
    pub user_name: String,
    pub user_avatar: String,
    pub created_at: DateTime<Utc>,
}

/// Parameters for appending a comment.
#[derive(Debug, Clone)]
pub struct NewCommentParams {
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub text: String,
    pub user_name: String,
    pub user_avatar: String,
}
