//! Social aggregation: likes, wishlist, comments, and the annotated public
//! listing.
//!
//! Listing annotation works in bulk: one query for the caller's like set, one
//! resolution per distinct owner. Owner resolution failures degrade that
//! owner's items to a default display identity instead of aborting the batch,
//! and a failed like-count query degrades the summary to zero — social
//! metadata must not break the page.

use std::collections::{HashMap, HashSet};

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

use crate::db::Database;
use crate::db::models::{ItemRecord, NewCommentParams, UserMetadata};
use crate::error::AppResult;
use crate::jwt::{AuthInfo, MaybeAuth};
use crate::services::items::ClothingItem;
use crate::services::profile::fallback_display_name;
use crate::startup::AppState;

/// Owner display identity denormalized onto listed items.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerDisplay {
    pub name: String,
    pub avatar: String,
}

impl OwnerDisplay {
    fn from_identity(metadata: &UserMetadata, email: &str) -> Self {
        Self {
            name: fallback_display_name(metadata.name.as_deref(), email),
            avatar: metadata.avatar_url.clone().unwrap_or_default(),
        }
    }
}

impl Default for OwnerDisplay {
    fn default() -> Self {
        Self {
            name: fallback_display_name(None, ""),
            avatar: String::new(),
        }
    }
}

/// A clothing item augmented with social context.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedItem {
    #[serde(flatten)]
    pub item: ClothingItem,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub owner_avatar: String,
    pub is_liked_by_me: bool,
}

/// Reduced projection for the wishlist view.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistItem {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub brand: String,
    pub size: String,
}

impl From<ItemRecord> for WishlistItem {
    fn from(record: ItemRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            image: record.image,
            brand: record.brand.unwrap_or_default(),
            size: record.size.unwrap_or_default(),
        }
    }
}

/// Resolve display identity for each distinct owner, one lookup per owner.
///
/// A failed lookup logs a warning and leaves that owner out of the map; the
/// annotation step then falls back to the default identity for their items.
async fn resolve_owners(db: &Database, owner_ids: &HashSet<Uuid>) -> HashMap<Uuid, OwnerDisplay> {
    let mut owners = HashMap::with_capacity(owner_ids.len());

    for &owner_id in owner_ids {
        match db.users.find(owner_id).await {
            Ok(Some(user)) => {
                owners.insert(owner_id, OwnerDisplay::from_identity(&user.metadata.0, &user.email));
            }
            Ok(None) => {
                warn!(owner_id = %owner_id, "Item owner no longer exists");
            }
            Err(err) => {
                warn!(owner_id = %owner_id, error = %err, "Owner resolution failed");
            }
        }
    }

    owners
}

/// Annotate records with owner identity and the caller's like state.
///
/// `forced_like_state` overrides membership lookup for listings where the
/// state is true by definition (the caller's liked items).
fn annotate_items(
    records: Vec<ItemRecord>,
    owners: &HashMap<Uuid, OwnerDisplay>,
    liked: &HashSet<Uuid>,
    forced_like_state: Option<bool>,
) -> Vec<AnnotatedItem> {
    records
        .into_iter()
        .map(|record| {
            let owner_id = record.user_id;
            let owner = owners.get(&owner_id).cloned().unwrap_or_default();
            let is_liked_by_me =
                forced_like_state.unwrap_or_else(|| liked.contains(&record.id));

            AnnotatedItem {
                item: ClothingItem::from_record(record),
                owner_id,
                owner_name: owner.name,
                owner_avatar: owner.avatar,
                is_liked_by_me,
            }
        })
        .collect()
}

/// The caller's like set, fetched once per listing rather than per item.
async fn caller_like_set(db: &Database, caller: Option<&AuthInfo>) -> AppResult<HashSet<Uuid>> {
    match caller {
        Some(auth) => Ok(db
            .social
            .liked_item_ids(auth.user_id)
            .await?
            .into_iter()
            .collect()),
        None => Ok(HashSet::new()),
    }
}

/// `GET /public-items` — all public items with social context. Works with or
/// without a caller; without one every item reads as not liked.
pub async fn list_public_items(
    State(state): State<AppState>,
    MaybeAuth(caller): MaybeAuth,
) -> AppResult<Json<Value>> {
    let records = state.db.items.list_public().await?;

    let liked = caller_like_set(&state.db, caller.as_ref()).await?;
    let owner_ids: HashSet<Uuid> = records.iter().map(|r| r.user_id).collect();
    let owners = resolve_owners(&state.db, &owner_ids).await;

    let items = annotate_items(records, &owners, &liked, None);
    Ok(Json(json!({ "items": items })))
}

/// `POST /social/like/{id}` — idempotent like.
pub async fn like_item(
    State(state): State<AppState>,
    auth: AuthInfo,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    state.db.social.like(auth.user_id, item_id).await?;
    Ok(Json(json!({ "success": true })))
}

/// `DELETE /social/like/{id}` — unlike; removing a never-liked item succeeds.
pub async fn unlike_item(
    State(state): State<AppState>,
    auth: AuthInfo,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    state.db.social.unlike(auth.user_id, item_id).await?;
    Ok(Json(json!({ "success": true })))
}

/// `GET /social/likes/{id}` — like count plus the caller's own state.
///
/// Store failures degrade to `{count: 0, isLiked: false}`; the failure is
/// only surfaced in logs.
pub async fn get_like_summary(
    State(state): State<AppState>,
    MaybeAuth(caller): MaybeAuth,
    Path(item_id): Path<Uuid>,
) -> Json<Value> {
    let count = match state.db.social.like_count(item_id).await {
        Ok(count) => count,
        Err(err) => {
            warn!(item_id = %item_id, error = %err, "Like count failed");
            return Json(json!({ "count": 0, "isLiked": false }));
        }
    };

    let is_liked = match caller {
        Some(auth) => state
            .db
            .social
            .is_liked(auth.user_id, item_id)
            .await
            .unwrap_or_else(|err| {
                warn!(item_id = %item_id, error = %err, "Like membership check failed");
                false
            }),
        None => false,
    };

    Json(json!({ "count": count, "isLiked": is_liked }))
}

/// `GET /social/likes` — the caller's liked items, annotated; `isLikedByMe`
/// is true by definition here.
pub async fn list_liked_items(
    State(state): State<AppState>,
    auth: AuthInfo,
) -> AppResult<Json<Value>> {
    let item_ids = state.db.social.liked_item_ids(auth.user_id).await?;
    let records = state.db.items.list_by_ids(&item_ids).await?;

    let owner_ids: HashSet<Uuid> = records.iter().map(|r| r.user_id).collect();
    let owners = resolve_owners(&state.db, &owner_ids).await;

    let items = annotate_items(records, &owners, &HashSet::new(), Some(true));
    Ok(Json(json!({ "items": items })))
}

/// `POST /social/wishlist/{id}` — idempotent add.
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    auth: AuthInfo,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    state.db.social.wishlist_add(auth.user_id, item_id).await?;
    Ok(Json(json!({ "success": true })))
}

/// `DELETE /social/wishlist/{id}`.
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    auth: AuthInfo,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    state.db.social.wishlist_remove(auth.user_id, item_id).await?;
    Ok(Json(json!({ "success": true })))
}

/// `GET /social/wishlist` — reduced item projection for this view.
pub async fn get_wishlist(
    State(state): State<AppState>,
    auth: AuthInfo,
) -> AppResult<Json<Value>> {
    let item_ids = state.db.social.wishlist_item_ids(auth.user_id).await?;
    let records = state.db.items.list_by_ids(&item_ids).await?;

    let items: Vec<WishlistItem> = records.into_iter().map(Into::into).collect();
    Ok(Json(json!({ "items": items })))
}

/// `GET /social/comments/{id}` — newest first.
pub async fn get_comments(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let comments = state.db.social.comments_for_item(item_id).await?;
    Ok(Json(json!({ "comments": comments })))
}

/// Comment creation payload.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CommentCreate {
    pub text: String,
}

/// `POST /social/comment/{id}` — append a comment, snapshotting the author's
/// current display identity. Later profile edits do not rewrite history.
pub async fn add_comment(
    State(state): State<AppState>,
    auth: AuthInfo,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<CommentCreate>,
) -> AppResult<Json<Value>> {
    let author = match state.db.users.find(auth.user_id).await? {
        Some(user) => OwnerDisplay::from_identity(&user.metadata.0, &user.email),
        None => OwnerDisplay::from_identity(&UserMetadata::default(), &auth.email),
    };

    let comment = state
        .db
        .social
        .add_comment(NewCommentParams {
            user_id: auth.user_id,
            item_id,
            text: payload.text,
            user_name: author.name,
            user_avatar: author.avatar,
        })
        .await?;

    Ok(Json(json!({ "comment": comment })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(owner: Uuid, id: Uuid, name: &str, public: Option<bool>) -> ItemRecord {
        ItemRecord {
            id,
            user_id: owner,
            name: name.to_string(),
            brand: Some("Norte".to_string()),
            size: Some("M".to_string()),
            kind: "jacket".to_string(),
            layer: 2,
            materials: Some(vec!["wool".to_string()]),
            weight: 300.0,
            temp_min: 0,
            temp_max: 15,
            waterproof: false,
            windproof: true,
            seasons: Some(vec!["Winter".to_string()]),
            image: "img.jpg".to_string(),
            status: "clean".to_string(),
            favorite: false,
            is_public: public,
        }
    }

    fn owner(name: &str, avatar: &str) -> OwnerDisplay {
        OwnerDisplay {
            name: name.to_string(),
            avatar: avatar.to_string(),
        }
    }

    #[test]
    fn annotates_like_membership_from_set() {
        let owner_id = Uuid::new_v4();
        let liked_id = Uuid::new_v4();
        let other_id = Uuid::new_v4();
        let records = vec![
            record(owner_id, liked_id, "Liked", Some(true)),
            record(owner_id, other_id, "Other", Some(true)),
        ];
        let owners = HashMap::from([(owner_id, owner("Ana", ""))]);
        let liked = HashSet::from([liked_id]);

        let items = annotate_items(records, &owners, &liked, None);
        assert!(items[0].is_liked_by_me);
        assert!(!items[1].is_liked_by_me);
    }

    #[test]
    fn no_caller_means_nothing_is_liked() {
        let owner_id = Uuid::new_v4();
        let records = vec![record(owner_id, Uuid::new_v4(), "A", Some(true))];
        let items = annotate_items(records, &HashMap::new(), &HashSet::new(), None);
        assert!(items.iter().all(|i| !i.is_liked_by_me));
    }

    #[test]
    fn forced_like_state_overrides_membership() {
        let records = vec![record(Uuid::new_v4(), Uuid::new_v4(), "A", Some(true))];
        let items = annotate_items(records, &HashMap::new(), &HashSet::new(), Some(true));
        assert!(items[0].is_liked_by_me);
    }

    #[test]
    fn unresolved_owner_falls_back_to_defaults() {
        let records = vec![record(Uuid::new_v4(), Uuid::new_v4(), "A", Some(true))];
        let items = annotate_items(records, &HashMap::new(), &HashSet::new(), None);
        assert_eq!(items[0].owner_name, "Utilizador");
        assert_eq!(items[0].owner_avatar, "");
    }

    #[test]
    fn one_bad_owner_does_not_taint_others() {
        let good_owner = Uuid::new_v4();
        let bad_owner = Uuid::new_v4();
        let records = vec![
            record(good_owner, Uuid::new_v4(), "A", Some(true)),
            record(bad_owner, Uuid::new_v4(), "B", Some(true)),
        ];
        let owners = HashMap::from([(good_owner, owner("Ana", "http://a/p.png"))]);

        let items = annotate_items(records, &owners, &HashSet::new(), None);
        assert_eq!(items[0].owner_name, "Ana");
        assert_eq!(items[1].owner_name, "Utilizador");
    }

    #[test]
    fn annotation_preserves_input_order() {
        let owner_id = Uuid::new_v4();
        let records: Vec<ItemRecord> = (0..5)
            .map(|i| record(owner_id, Uuid::new_v4(), &format!("item-{i}"), Some(true)))
            .collect();
        let expected: Vec<String> = records.iter().map(|r| r.name.clone()).collect();

        let items = annotate_items(records, &HashMap::new(), &HashSet::new(), None);
        let got: Vec<String> = items.iter().map(|i| i.item.name.clone()).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn owner_display_uses_metadata_then_email() {
        let meta = UserMetadata {
            name: Some("Ana".to_string()),
            avatar_url: Some("http://a/p.png".to_string()),
            ..Default::default()
        };
        let display = OwnerDisplay::from_identity(&meta, "ana@example.com");
        assert_eq!(display.name, "Ana");
        assert_eq!(display.avatar, "http://a/p.png");

        let display = OwnerDisplay::from_identity(&UserMetadata::default(), "ana@example.com");
        assert_eq!(display.name, "ana");
        assert_eq!(display.avatar, "");
    }

    #[test]
    fn annotated_item_serializes_flat_with_owner_fields() {
        let owner_id = Uuid::new_v4();
        let records = vec![record(owner_id, Uuid::new_v4(), "A", Some(true))];
        let owners = HashMap::from([(owner_id, owner("Ana", ""))]);
        let items = annotate_items(records, &owners, &HashSet::new(), None);

        let value = serde_json::to_value(&items[0]).unwrap();
        assert_eq!(value["ownerName"], "Ana");
        assert_eq!(value["isLikedByMe"], false);
        // Flattened item fields sit at the top level.
        assert_eq!(value["name"], "A");
        assert_eq!(value["tempMax"], 15);
    }

    #[test]
    fn wishlist_projection_is_reduced() {
        let item = WishlistItem::from(record(Uuid::new_v4(), Uuid::new_v4(), "A", None));
        let value = serde_json::to_value(&item).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 5);
        for key in ["id", "name", "image", "brand", "size"] {
            assert!(value.get(key).is_some());
        }
    }
}
