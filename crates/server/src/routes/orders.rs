//! Order lookup handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use orderdesk_core::{Order, OrderUid};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// `GET /order/{order_uid}` - return the stored order document as JSON.
///
/// A syntactically invalid UID cannot name a stored order, so it maps to
/// the same plain-text 404 as a genuine miss.
pub async fn show(
    State(state): State<AppState>,
    Path(order_uid): Path<String>,
) -> Result<Json<Arc<Order>>> {
    let uid = OrderUid::parse(&order_uid)
        .map_err(|_| AppError::NotFound(format!("order {order_uid:?} not found")))?;

    match state.orders().get_order(&uid).await? {
        Some(order) => Ok(Json(order)),
        None => Err(AppError::NotFound(format!("order {order_uid:?} not found"))),
    }
}
