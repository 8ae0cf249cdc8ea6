//! Summary generation, review and feedback

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use axum::{
    extract::{ConnectInfo, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use contract_extract::extract_from_path;
use contract_nlp::clean_text;
use shared_types::{AuditAction, AuditEntry, ContractStatus, ResourceType, SummaryType};
use summarizer_core::SummaryOutput;

use super::contracts::{reclaim_stale_processing, set_status, with_ip};
use super::{client_ip, fetch_contract, fetch_summary};
use crate::error::ApiError;
use crate::models::*;
use crate::state::SharedState;

/// Highest accepted feedback rating
pub const MAX_RATING: i64 = 5;

/// Slack on top of the summary timeout before a `processing` row counts as abandoned
pub const STALE_PROCESSING_GRACE: Duration = Duration::from_secs(30);

fn stale_processing_after(state: &SharedState) -> Duration {
    state.summary_timeout + STALE_PROCESSING_GRACE
}

struct GeneratedSummary {
    id: i64,
    output: SummaryOutput,
    elapsed_ms: u64,
    timed_out: bool,
}

/// Generate (or regenerate) one summary type for a contract
pub async fn generate_summary(
    State(state): State<SharedState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    Path(contract_id): Path<i64>,
    body: Option<Json<GenerateSummaryRequest>>,
) -> Result<(StatusCode, Json<GenerateSummaryResponse>), ApiError> {
    let request = body.map(|Json(req)| req).unwrap_or_default();
    let summary_type = match request.summary_type.as_deref() {
        Some(value) => value.parse::<SummaryType>().map_err(ApiError::InvalidRequest)?,
        None => SummaryType::default(),
    };

    let contract = fetch_contract(&state, contract_id).await?;
    let status: ContractStatus = contract
        .status
        .parse()
        .map_err(|e: String| ApiError::Internal(anyhow!(e)))?;
    match status {
        ContractStatus::Processing => {
            reclaim_stale_processing(&state, contract_id, stale_processing_after(&state)).await?
        }
        _ => set_status(&state, contract_id, status, ContractStatus::Processing).await?,
    }

    let generated = match produce_summary(&state, &contract, summary_type).await {
        Ok(generated) => generated,
        Err(e) => {
            if let Err(status_err) = set_status(
                &state,
                contract_id,
                ContractStatus::Processing,
                ContractStatus::Failed,
            )
            .await
            {
                tracing::warn!("Could not mark contract {} failed: {}", contract_id, status_err);
            }
            return Err(e);
        }
    };

    set_status(
        &state,
        contract_id,
        ContractStatus::Processing,
        ContractStatus::Completed,
    )
    .await?;

    let ip = client_ip(connect);
    state
        .record_audit(with_ip(
            AuditEntry::new(
                AuditAction::GenerateSummary,
                ResourceType::Summary,
                Some(generated.id),
            )
            .with_user(contract.user_id)
            .with_details(format!(
                "Generated {} summary for contract {}",
                summary_type, contract_id
            )),
            &ip,
        ))
        .await?;

    let summary = fetch_summary(&state, generated.id).await?;

    tracing::info!(
        "Generated {} summary {} for contract {} with {} in {}ms",
        summary_type,
        generated.id,
        contract_id,
        generated.output.model_used,
        generated.elapsed_ms
    );

    Ok((
        StatusCode::CREATED,
        Json(GenerateSummaryResponse {
            summary: summary.into(),
            model_info: GenerationInfo {
                model_used: generated.output.model_used,
                processing_time_ms: generated.elapsed_ms,
                chunks_processed: generated.output.chunks_processed,
                target_words: generated.output.target_words,
                timed_out: generated.timed_out,
            },
        }),
    ))
}

/// Extract, summarize on a blocking worker under the configured timeout, and
/// upsert the result
async fn produce_summary(
    state: &SharedState,
    contract: &DbContract,
    summary_type: SummaryType,
) -> Result<GeneratedSummary, ApiError> {
    let path = PathBuf::from(&contract.file_path);
    let document = tokio::task::spawn_blocking(move || extract_from_path(&path))
        .await
        .map_err(|e| ApiError::Internal(e.into()))??;
    let text = clean_text(&document.text);

    let started = Instant::now();
    let summarizer = state.summarizer.clone();
    let worker_text = text.clone();
    let worker =
        tokio::task::spawn_blocking(move || summarizer.summarize(&worker_text, summary_type));

    let (output, timed_out) = match tokio::time::timeout(state.summary_timeout, worker).await {
        Ok(Ok(output)) => (output, false),
        Ok(Err(e)) => {
            tracing::error!("Summary worker failed: {}, using extractive summary", e);
            (state.summarizer.summarize_extractive(&text, summary_type), false)
        }
        Err(_) => {
            tracing::warn!(
                "Summary for contract {} timed out after {:?}, using extractive summary",
                contract.id,
                state.summary_timeout
            );
            (state.summarizer.summarize_extractive(&text, summary_type), true)
        }
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO summaries (contract_id, content, raw_content, confidence_score, summary_type,
                               model_used, word_count, chunks_processed, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(contract_id, summary_type) DO UPDATE SET
            content = excluded.content,
            raw_content = excluded.raw_content,
            confidence_score = excluded.confidence_score,
            model_used = excluded.model_used,
            word_count = excluded.word_count,
            chunks_processed = excluded.chunks_processed,
            created_at = excluded.created_at
        RETURNING id
        "#,
    )
    .bind(contract.id)
    .bind(&output.summary)
    .bind(&output.raw_summary)
    .bind(output.confidence)
    .bind(summary_type.as_str())
    .bind(&output.model_used)
    .bind(output.word_count as i64)
    .bind(output.chunks_processed as i64)
    .bind(Utc::now().to_rfc3339())
    .fetch_one(&state.db)
    .await?;

    Ok(GeneratedSummary {
        id,
        output,
        elapsed_ms,
        timed_out,
    })
}

/// Get a summary with its contract
pub async fn get_summary(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<SummaryDetailResponse>, ApiError> {
    let summary = fetch_summary(&state, id).await?;

    let contract = match fetch_contract(&state, summary.contract_id).await {
        Ok(contract) => Some(contract.into()),
        Err(ApiError::ContractNotFound(_)) => None,
        Err(e) => return Err(e),
    };

    Ok(Json(SummaryDetailResponse {
        summary: summary.into(),
        contract,
    }))
}

/// All summaries generated for a contract
pub async fn list_contract_summaries(
    State(state): State<SharedState>,
    Path(contract_id): Path<i64>,
) -> Result<Json<SummaryListResponse>, ApiError> {
    let rows: Vec<DbSummary> = sqlx::query_as(&format!(
        "SELECT {} FROM summaries WHERE contract_id = ? ORDER BY id",
        SUMMARY_COLUMNS
    ))
    .bind(contract_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(SummaryListResponse {
        summaries: rows.into_iter().map(SummaryResponse::from).collect(),
    }))
}

/// Mark a summary as reviewed and approved
pub async fn approve_summary(
    State(state): State<SharedState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    fetch_summary(&state, id).await?;

    sqlx::query("UPDATE summaries SET approved = 1 WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;

    let ip = client_ip(connect);
    state
        .record_audit(with_ip(
            AuditEntry::new(AuditAction::ApproveSummary, ResourceType::Summary, Some(id))
                .with_details(format!("Summary {} approved", id)),
            &ip,
        ))
        .await?;

    Ok(Json(MessageResponse::new("Summary approved successfully")))
}

/// Record reviewer feedback on a summary in the audit trail
pub async fn submit_feedback(
    State(state): State<SharedState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    Path(id): Path<i64>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !(0..=MAX_RATING).contains(&req.rating) {
        return Err(ApiError::InvalidRequest(format!(
            "Rating must be between 0 and {}",
            MAX_RATING
        )));
    }
    fetch_summary(&state, id).await?;

    let ip = client_ip(connect);
    state
        .record_audit(with_ip(
            AuditEntry::new(AuditAction::SubmitFeedback, ResourceType::Summary, Some(id))
                .with_details(format!("Feedback: {}, Rating: {}", req.feedback, req.rating)),
            &ip,
        ))
        .await?;

    Ok(Json(MessageResponse::new("Feedback submitted successfully")))
}
