//! Comparison JSON API.
//!
//! Mutates the session-held id list; the GET joins it against the catalog.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use markethub_core::ProductId;

use crate::db::ProductRepository;
use crate::error::Result;
use crate::models::catalog::ProductSummary;
use crate::routes::compare::{MAX_COMPARE, get_compare_list, set_compare_list};
use crate::state::AppState;

/// One compared product in the JSON payload.
#[derive(Debug, Serialize)]
pub struct ComparePayloadItem {
    pub product_id: i32,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    pub category: String,
    pub store: String,
    pub in_stock: bool,
}

impl From<&ProductSummary> for ComparePayloadItem {
    fn from(product: &ProductSummary) -> Self {
        Self {
            product_id: product.id.as_i32(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            price: product.price,
            category: product.category_name.clone(),
            store: product.store_name.clone(),
            in_stock: product.is_available(),
        }
    }
}

/// Comparison JSON payload.
#[derive(Debug, Serialize)]
pub struct ComparePayload {
    pub items: Vec<ComparePayloadItem>,
    pub count: usize,
    pub max: usize,
}

/// Comparison mutation request.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CompareAction {
    Add { product_id: i32 },
    Remove { product_id: i32 },
    Clear,
}

/// Build the payload for the current session list.
async fn payload(state: &AppState, session: &Session) -> Result<ComparePayload> {
    let list = get_compare_list(session).await;
    let ids: Vec<ProductId> = list.iter().copied().map(ProductId::new).collect();
    let summaries = ProductRepository::new(state.pool()).list_by_ids(&ids).await?;

    let mut items = Vec::with_capacity(list.len());
    for id in &list {
        if let Some(summary) = summaries.iter().find(|s| s.id.as_i32() == *id) {
            items.push(ComparePayloadItem::from(summary));
        }
    }

    Ok(ComparePayload {
        count: items.len(),
        items,
        max: MAX_COMPARE,
    })
}

/// Return the comparison list as JSON.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ComparePayload>> {
    Ok(Json(payload(&state, &session).await?))
}

/// Apply a comparison mutation and return the updated list.
#[instrument(skip(state, session, action))]
pub async fn mutate(
    State(state): State<AppState>,
    session: Session,
    Json(action): Json<CompareAction>,
) -> Result<Json<ComparePayload>> {
    let mut list = get_compare_list(&session).await;

    match action {
        CompareAction::Add { product_id } => {
            if !list.contains(&product_id) && list.len() < MAX_COMPARE {
                list.push(product_id);
            }
        }
        CompareAction::Remove { product_id } => {
            list.retain(|id| *id != product_id);
        }
        CompareAction::Clear => list.clear(),
    }

    set_compare_list(&session, &list).await?;
    Ok(Json(payload(&state, &session).await?))
}
