//! Item catalog: client-facing representation and CRUD handlers.
//!
//! The client speaks camelCase (`tempMin`, `isPublic`); storage speaks
//! snake_case. The conversion lives here as two explicit mappings so every
//! field transformation is a single reviewable declaration.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::db::models::{ItemRecord, ItemWrite};
use crate::error::AppResult;
use crate::jwt::AuthInfo;
use crate::startup::AppState;

/// Client-facing clothing item representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClothingItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub size: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub layer: i32,
    #[serde(default)]
    pub materials: Vec<String>,
    pub weight: f64,
    pub temp_min: i32,
    pub temp_max: i32,
    pub waterproof: bool,
    pub windproof: bool,
    #[serde(default)]
    pub seasons: Vec<String>,
    #[serde(default)]
    pub image: String,
    pub status: String,
    pub favorite: bool,
    /// Defaults to private when the client omits the flag.
    #[serde(default)]
    pub is_public: bool,
}

impl ClothingItem {
    /// Storage record → client representation.
    ///
    /// List fields stored as NULL become empty sequences; `is_public` absent
    /// from pre-flag records becomes false. No field is dropped.
    pub fn from_record(record: ItemRecord) -> Self {
        Self {
            id: Some(record.id),
            name: record.name,
            brand: record.brand.unwrap_or_default(),
            size: record.size.unwrap_or_default(),
            kind: record.kind,
            layer: record.layer,
            materials: record.materials.unwrap_or_default(),
            weight: record.weight,
            temp_min: record.temp_min,
            temp_max: record.temp_max,
            waterproof: record.waterproof,
            windproof: record.windproof,
            seasons: record.seasons.unwrap_or_default(),
            image: record.image,
            status: record.status,
            favorite: record.favorite,
            is_public: record.is_public.unwrap_or(false),
        }
    }

    /// Client representation → storage write (identifier excluded; assigned
    /// on insert, immutable on replace).
    pub fn to_write(&self) -> ItemWrite {
        ItemWrite {
            name: self.name.clone(),
            brand: self.brand.clone(),
            size: self.size.clone(),
            kind: self.kind.clone(),
            layer: self.layer,
            materials: self.materials.clone(),
            weight: self.weight,
            temp_min: self.temp_min,
            temp_max: self.temp_max,
            waterproof: self.waterproof,
            windproof: self.windproof,
            seasons: self.seasons.clone(),
            image: self.image.clone(),
            status: self.status.clone(),
            favorite: self.favorite,
            is_public: self.is_public,
        }
    }
}

/// `GET /items` — the caller's own items, unannotated.
pub async fn list_items(State(state): State<AppState>, auth: AuthInfo) -> AppResult<Json<Value>> {
    let records = state.db.items.list_owned_by(auth.user_id).await?;
    let items: Vec<ClothingItem> = records.into_iter().map(ClothingItem::from_record).collect();
    Ok(Json(json!({ "items": items })))
}

/// `POST /items` — create an item owned by the caller.
pub async fn create_item(
    State(state): State<AppState>,
    auth: AuthInfo,
    Json(item): Json<ClothingItem>,
) -> AppResult<Json<Value>> {
    let record = state.db.items.insert(auth.user_id, &item.to_write()).await?;
    tracing::info!(user_id = %auth.user_id, item_id = %record.id, "Item created");
    Ok(Json(json!({ "item": ClothingItem::from_record(record) })))
}

/// `PUT /items/{id}` — full-record replace.
// TODO: verify the caller owns the item before replacing it; any
// authenticated user can currently update another user's item by id.
pub async fn update_item(
    State(state): State<AppState>,
    auth: AuthInfo,
    Path(item_id): Path<Uuid>,
    Json(mut item): Json<ClothingItem>,
) -> AppResult<Json<Value>> {
    state.db.items.replace(item_id, &item.to_write()).await?;
    item.id = Some(item_id);
    tracing::info!(user_id = %auth.user_id, item_id = %item_id, "Item replaced");
    Ok(Json(json!({ "item": item })))
}

/// `DELETE /items/{id}` — delete outright, no soft delete.
// TODO: same missing ownership check as update_item.
pub async fn delete_item(
    State(state): State<AppState>,
    auth: AuthInfo,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    state.db.items.delete(item_id).await?;
    tracing::info!(user_id = %auth.user_id, item_id = %item_id, "Item deleted");
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> ClothingItem {
        ClothingItem {
            id: None,
            name: "Casaco impermeável".to_string(),
            brand: "Norte".to_string(),
            size: "M".to_string(),
            kind: "jacket".to_string(),
            layer: 3,
            materials: vec!["nylon".to_string(), "polyester".to_string()],
            weight: 420.5,
            temp_min: -5,
            temp_max: 12,
            waterproof: true,
            windproof: true,
            seasons: vec!["Autumn".to_string(), "Winter".to_string()],
            image: "user/abc.jpg".to_string(),
            status: "clean".to_string(),
            favorite: false,
            is_public: true,
        }
    }

    fn record_from(owner: Uuid, id: Uuid, item: &ClothingItem) -> ItemRecord {
        let write = item.to_write();
        ItemRecord {
            id,
            user_id: owner,
            name: write.name,
            brand: Some(write.brand),
            size: Some(write.size),
            kind: write.kind,
            layer: write.layer,
            materials: Some(write.materials),
            weight: write.weight,
            temp_min: write.temp_min,
            temp_max: write.temp_max,
            waterproof: write.waterproof,
            windproof: write.windproof,
            seasons: Some(write.seasons),
            image: write.image,
            status: write.status,
            favorite: write.favorite,
            is_public: Some(write.is_public),
        }
    }

    #[test]
    fn mapping_round_trips_all_fields() {
        let item = sample_item();
        let record = record_from(Uuid::new_v4(), Uuid::new_v4(), &item);
        let back = ClothingItem::from_record(record);

        let mut expected = item;
        expected.id = back.id;
        assert_eq!(back, expected);
    }

    #[test]
    fn null_lists_default_to_empty() {
        let mut record = record_from(Uuid::new_v4(), Uuid::new_v4(), &sample_item());
        record.materials = None;
        record.seasons = None;

        let item = ClothingItem::from_record(record);
        assert!(item.materials.is_empty());
        assert!(item.seasons.is_empty());
    }

    #[test]
    fn absent_public_flag_defaults_to_private() {
        let mut record = record_from(Uuid::new_v4(), Uuid::new_v4(), &sample_item());
        record.is_public = None;
        assert!(!ClothingItem::from_record(record).is_public);
    }

    #[test]
    fn client_fields_are_camel_case() {
        let value = serde_json::to_value(sample_item()).unwrap();
        assert!(value.get("tempMin").is_some());
        assert!(value.get("tempMax").is_some());
        assert!(value.get("isPublic").is_some());
        assert!(value.get("type").is_some());
        assert!(value.get("temp_min").is_none());
    }

    #[test]
    fn omitted_public_flag_deserializes_as_false() {
        let json = r#"{
            "name": "T-shirt", "type": "shirt", "layer": 1, "weight": 150.0,
            "tempMin": 15, "tempMax": 35, "waterproof": false, "windproof": false,
            "status": "clean", "favorite": false
        }"#;
        let item: ClothingItem = serde_json::from_str(json).unwrap();
        assert!(!item.is_public);
        assert!(item.materials.is_empty());
        assert!(item.brand.is_empty());
    }
}
