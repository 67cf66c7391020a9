//! In-memory stand-in for the SKU catalog service.
//!
//! Serves `/skus` and `/skus/{sku}` with the same status codes as the real
//! service: 200 for reads and updates, 201 for creates, 204 for deletes, 404
//! for unknown SKUs and 409 when creating a SKU that already exists.
//! `createdAt` is assigned on create unless the client sent one.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sku {
    pub sku: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(rename = "createdAt")]
    pub created_at: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
pub struct CreateSku {
    pub sku: String,
    pub description: Option<String>,
    pub price: Option<Value>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Partial update. The `sku` key, if sent, is ignored: the path wins.
#[derive(Deserialize)]
pub struct UpdateSku {
    pub description: Option<String>,
    pub price: Option<Value>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type Db = Arc<RwLock<BTreeMap<String, Sku>>>;

pub fn app() -> Router {
    app_with(Vec::new())
}

/// Router pre-loaded with `skus`.
pub fn app_with(skus: Vec<Sku>) -> Router {
    let db: Db = Arc::new(RwLock::new(
        skus.into_iter().map(|s| (s.sku.clone(), s)).collect(),
    ));
    Router::new()
        .route("/skus", get(list_skus).post(create_sku))
        .route("/skus/{sku}", get(get_sku).put(update_sku).delete(delete_sku))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_app(listener, app()).await
}

pub async fn run_app(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

async fn list_skus(State(db): State<Db>) -> Json<Vec<Sku>> {
    let skus = db.read().await;
    Json(skus.values().cloned().collect())
}

async fn create_sku(
    State(db): State<Db>,
    Json(input): Json<CreateSku>,
) -> Result<(StatusCode, Json<Sku>), StatusCode> {
    let mut skus = db.write().await;
    if skus.contains_key(&input.sku) {
        tracing::debug!(sku = %input.sku, "create rejected, SKU exists");
        return Err(StatusCode::CONFLICT);
    }
    let sku = Sku {
        sku: input.sku,
        description: input.description,
        price: input.price,
        created_at: input.created_at.unwrap_or_else(|| Value::from(now_secs())),
        extra: input.extra,
    };
    skus.insert(sku.sku.clone(), sku.clone());
    tracing::debug!(sku = %sku.sku, "created");
    Ok((StatusCode::CREATED, Json(sku)))
}

async fn get_sku(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Sku>, StatusCode> {
    let skus = db.read().await;
    skus.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_sku(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(mut input): Json<UpdateSku>,
) -> Result<Json<Sku>, StatusCode> {
    let mut skus = db.write().await;
    let sku = skus.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(description) = input.description {
        sku.description = Some(description);
    }
    if let Some(price) = input.price {
        sku.price = Some(price);
    }
    if let Some(created_at) = input.created_at {
        sku.created_at = created_at;
    }
    input.extra.remove("sku");
    sku.extra.extend(input.extra);
    Ok(Json(sku.clone()))
}

async fn delete_sku(State(db): State<Db>, Path(id): Path<String>) -> StatusCode {
    let mut skus = db.write().await;
    match skus.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sku_serializes_with_camel_case_timestamp() {
        let sku = Sku {
            sku: "berliner".to_string(),
            description: Some("Jelly donut".to_string()),
            price: Some(json!("2.99")),
            created_at: json!(1609459200),
            extra: Map::new(),
        };
        let value = serde_json::to_value(&sku).unwrap();
        assert_eq!(
            value,
            json!({"sku":"berliner","description":"Jelly donut","price":"2.99","createdAt":1609459200})
        );
    }

    #[test]
    fn create_sku_requires_sku() {
        let result: Result<CreateSku, _> = serde_json::from_str(r#"{"description":"nameless"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn create_sku_keeps_unknown_fields() {
        let input: CreateSku = serde_json::from_str(r#"{"sku":"eclair","stock":12}"#).unwrap();
        assert!(input.created_at.is_none());
        assert_eq!(input.extra.get("stock"), Some(&json!(12)));
    }

    #[test]
    fn update_sku_all_fields_optional() {
        let input: UpdateSku = serde_json::from_str("{}").unwrap();
        assert!(input.description.is_none());
        assert!(input.price.is_none());
        assert!(input.created_at.is_none());
        assert!(input.extra.is_empty());
    }

    #[test]
    fn now_secs_is_after_2020() {
        assert!(now_secs() > 1_577_836_800);
    }
}
