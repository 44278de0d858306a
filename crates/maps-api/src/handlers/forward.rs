//! Generic forwarding handler shared by every operation route

use axum::extract::State;
use axum::Json;
use maps_core::OperationSpec;
use serde_json::Value;

use crate::error::ApiError;
use crate::extract::Params;
use crate::state::AppState;

/// POST /{operation}
///
/// Validates the body against `spec`, forwards it upstream and relays the
/// upstream JSON verbatim.
pub async fn forward(
    spec: &'static OperationSpec,
    State(state): State<AppState>,
    Params(params): Params,
) -> Result<Json<Value>, ApiError> {
    let body = state.dispatcher().execute(spec, &params).await?;
    Ok(Json(body))
}
