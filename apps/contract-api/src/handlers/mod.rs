//! HTTP handlers for the contract API

pub mod contracts;
pub mod summaries;

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Query, State},
    Json,
};
use serde_json::{json, Value};
use summarizer_core::ModelInfo;

use crate::error::ApiError;
use crate::models::*;
use crate::state::SharedState;

/// Audit rows returned when no limit is given
const DEFAULT_AUDIT_LIMIT: i64 = 100;

/// Health check endpoint
pub async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "contract-api",
        "model_loaded": state.summarizer.model_info().is_loaded,
    }))
}

/// Currently loaded summarization model
pub async fn model_info(State(state): State<SharedState>) -> Json<ModelInfo> {
    Json(state.summarizer.model_info())
}

/// Audit trail, newest first, optionally filtered by resource
pub async fn list_audit_logs(
    State(state): State<SharedState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<AuditListResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, 1000);

    let rows: Vec<DbAuditLog> = sqlx::query_as(
        r#"
        SELECT id, user_id, action, resource_type, resource_id, details, ip_address, timestamp
        FROM audit_logs
        WHERE (?1 IS NULL OR resource_type = ?1)
          AND (?2 IS NULL OR resource_id = ?2)
        ORDER BY id DESC
        LIMIT ?3
        "#,
    )
    .bind(&query.resource_type)
    .bind(query.resource_id)
    .bind(limit)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(AuditListResponse {
        logs: rows.into_iter().map(AuditLogResponse::from).collect(),
    }))
}

pub(crate) async fn fetch_contract(state: &SharedState, id: i64) -> Result<DbContract, ApiError> {
    let contract: Option<DbContract> = sqlx::query_as(&format!(
        "SELECT {} FROM contracts WHERE id = ?",
        CONTRACT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&state.db)
    .await?;

    contract.ok_or(ApiError::ContractNotFound(id))
}

pub(crate) async fn fetch_summary(state: &SharedState, id: i64) -> Result<DbSummary, ApiError> {
    let summary: Option<DbSummary> = sqlx::query_as(&format!(
        "SELECT {} FROM summaries WHERE id = ?",
        SUMMARY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&state.db)
    .await?;

    summary.ok_or(ApiError::SummaryNotFound(id))
}

/// Peer address when the server runs with connect info (not under test)
pub(crate) fn client_ip(connect: Option<ConnectInfo<SocketAddr>>) -> Option<String> {
    connect.map(|ConnectInfo(addr)| addr.ip().to_string())
}
