//! Operation discovery handler

use axum::Json;
use maps_core::{CombineRule, ParamSpec, OPERATIONS};
use serde::Serialize;

#[derive(Serialize)]
pub struct OperationsResponse {
    pub items: Vec<OperationInfoResponse>,
}

#[derive(Serialize)]
pub struct OperationInfoResponse {
    pub name: &'static str,
    pub method: &'static str,
    pub route: String,
    pub upstream_path: &'static str,
    pub required: &'static [ParamSpec],
    pub optional: &'static [ParamSpec],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combine: Option<CombineRule>,
}

/// GET /operations
/// List every forwarded operation and its parameter contract
pub async fn list_operations() -> Json<OperationsResponse> {
    let items = OPERATIONS
        .iter()
        .map(|op| OperationInfoResponse {
            name: op.name,
            method: "POST",
            route: op.route(),
            upstream_path: op.upstream_path,
            required: op.required,
            optional: op.optional,
            combine: op.combine,
        })
        .collect();

    Json(OperationsResponse { items })
}
