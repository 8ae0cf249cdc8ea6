//! Contract upload, listing and deletion

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use contract_extract::{extract_from_bytes, DocumentFormat, ExtractedDocument};
use shared_types::{AuditAction, AuditEntry, ContractStatus, Language, ResourceType};

use super::{client_ip, fetch_contract};
use crate::error::ApiError;
use crate::models::*;
use crate::state::SharedState;
use crate::storage::{remove_upload, save_upload};

/// Identity used when a request does not name a user
pub const DEFAULT_USER_ID: i64 = 1;

struct UploadForm {
    file_name: String,
    bytes: Vec<u8>,
    user_id: i64,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut user_id = DEFAULT_USER_ID;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(format!("Failed to read file: {}", e)))?;
                file = Some((name, bytes.to_vec()));
            }
            Some("user_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(format!("Invalid user_id: {}", e)))?;
                user_id = text
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::InvalidRequest(format!("Invalid user_id: {}", text)))?;
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| ApiError::InvalidRequest("No file provided".to_string()))?;
    if file_name.is_empty() {
        return Err(ApiError::InvalidRequest("No file selected".to_string()));
    }

    Ok(UploadForm {
        file_name,
        bytes,
        user_id,
    })
}

/// Store an uploaded contract, extract its text and record its entities
pub async fn upload_contract(
    State(state): State<SharedState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let form = read_upload_form(multipart).await?;
    let format = DocumentFormat::from_filename(&form.file_name)
        .ok_or_else(|| ApiError::UnsupportedFileType(form.file_name.clone()))?;

    let stored = save_upload(&state.upload_dir, &form.file_name, &form.bytes).await?;
    let now = Utc::now();

    let contract_id = sqlx::query(
        r#"
        INSERT INTO contracts (user_id, file_name, file_path, file_size, file_hash, status, uploaded_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(form.user_id)
    .bind(&form.file_name)
    .bind(stored.path.to_string_lossy().to_string())
    .bind(stored.size as i64)
    .bind(&stored.sha256)
    .bind(ContractStatus::Pending.as_str())
    .bind(now.to_rfc3339())
    .execute(&state.db)
    .await?
    .last_insert_rowid();

    let ip = client_ip(connect);
    state
        .record_audit(
            with_ip(
                AuditEntry::new(
                    AuditAction::UploadContract,
                    ResourceType::Contract,
                    Some(contract_id),
                )
                .with_user(form.user_id)
                .with_details(format!("Uploaded {}", form.file_name)),
                &ip,
            ),
        )
        .await?;

    let bytes = form.bytes;
    let extracted = tokio::task::spawn_blocking(move || extract_from_bytes(&bytes, format))
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    let document = match extracted {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!("Extraction failed for contract {}: {}", contract_id, e);
            set_status(&state, contract_id, ContractStatus::Pending, ContractStatus::Failed).await?;
            return Err(e.into());
        }
    };

    let (entities_found, language) = store_analysis(&state, contract_id, &document).await?;

    tracing::info!(
        "Uploaded contract {} ({}, {} entities)",
        contract_id,
        language,
        entities_found
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Contract uploaded successfully".to_string(),
            contract_id,
            language: language.code().to_string(),
            entities_found,
            page_count: document.page_count,
        }),
    ))
}

/// Run language detection and entity extraction, persisting both
async fn store_analysis(
    state: &SharedState,
    contract_id: i64,
    document: &ExtractedDocument,
) -> Result<(usize, Language), ApiError> {
    let analysis = state.analyzer.analyze(&document.text);

    let mut tx = state.db.begin().await?;

    sqlx::query("UPDATE contracts SET language = ?, page_count = ? WHERE id = ?")
        .bind(analysis.language.code())
        .bind(document.page_count.map(|p| p as i64))
        .bind(contract_id)
        .execute(&mut *tx)
        .await?;

    for entity in &analysis.entities {
        sqlx::query(
            r#"
            INSERT INTO entities (contract_id, entity_type, entity_value, confidence, section, start_offset, end_offset)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(contract_id)
        .bind(entity.label.as_str())
        .bind(&entity.text)
        .bind(entity.confidence)
        .bind(&entity.section)
        .bind(entity.start_offset as i64)
        .bind(entity.end_offset as i64)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok((analysis.entities.len(), analysis.language))
}

/// Move a contract from `from` to `to`, refusing transitions the lifecycle
/// forbids and rows whose status changed concurrently
pub(crate) async fn set_status(
    state: &SharedState,
    contract_id: i64,
    from: ContractStatus,
    to: ContractStatus,
) -> Result<(), ApiError> {
    let next = from
        .transition_to(to)
        .map_err(|e| ApiError::Conflict(e.to_string()))?;

    let now = Utc::now().to_rfc3339();
    let processed_at = matches!(next, ContractStatus::Completed | ContractStatus::Failed)
        .then(|| now.clone());
    let started_at = (next == ContractStatus::Processing).then_some(now);

    // Only move the row if nobody changed its status in the meantime
    let result = sqlx::query(
        r#"
        UPDATE contracts
        SET status = ?,
            processed_at = COALESCE(?, processed_at),
            processing_started_at = COALESCE(?, processing_started_at)
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(next.as_str())
    .bind(processed_at)
    .bind(started_at)
    .bind(contract_id)
    .bind(from.as_str())
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::Conflict(format!(
            "Contract {} is no longer {}",
            contract_id, from
        )));
    }
    Ok(())
}

/// Take over a contract left in `processing` by a generation that never
/// finished. Only rows that started longer than `stale_after` ago qualify;
/// a generation still in flight answers 409.
pub(crate) async fn reclaim_stale_processing(
    state: &SharedState,
    contract_id: i64,
    stale_after: Duration,
) -> Result<(), ApiError> {
    let now = Utc::now();
    let stale_after =
        chrono::Duration::from_std(stale_after).map_err(|e| ApiError::Internal(e.into()))?;
    let cutoff = (now - stale_after).to_rfc3339();

    let result = sqlx::query(
        r#"
        UPDATE contracts
        SET processing_started_at = ?
        WHERE id = ? AND status = ?
          AND (processing_started_at IS NULL OR processing_started_at < ?)
        "#,
    )
    .bind(now.to_rfc3339())
    .bind(contract_id)
    .bind(ContractStatus::Processing.as_str())
    .bind(cutoff)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::Conflict(format!(
            "Contract {} is already being processed",
            contract_id
        )));
    }

    tracing::warn!("Reclaimed contract {} stuck in processing", contract_id);
    Ok(())
}

pub(crate) fn with_ip(entry: AuditEntry, ip: &Option<String>) -> AuditEntry {
    match ip {
        Some(ip) => entry.with_ip(ip.clone()),
        None => entry,
    }
}

/// List a user's contracts
pub async fn list_contracts(
    State(state): State<SharedState>,
    Query(query): Query<ContractListQuery>,
) -> Result<Json<ContractListResponse>, ApiError> {
    let user_id = query.user_id.unwrap_or(DEFAULT_USER_ID);

    let rows: Vec<DbContract> = sqlx::query_as(&format!(
        "SELECT {} FROM contracts WHERE user_id = ? ORDER BY id",
        CONTRACT_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ContractListResponse {
        contracts: rows.into_iter().map(ContractResponse::from).collect(),
    }))
}

/// Get a contract with its extracted entities
pub async fn get_contract(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ContractDetailResponse>, ApiError> {
    let contract = fetch_contract(&state, id).await?;

    let entities: Vec<DbEntity> = sqlx::query_as(
        r#"
        SELECT id, contract_id, entity_type, entity_value, confidence, section, start_offset, end_offset
        FROM entities
        WHERE contract_id = ?
        ORDER BY start_offset, id
        "#,
    )
    .bind(id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ContractDetailResponse {
        contract: contract.into(),
        entities: entities.into_iter().map(EntityResponse::from).collect(),
    }))
}

/// Delete a contract, its stored file, summaries and entities
pub async fn delete_contract(
    State(state): State<SharedState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let contract = fetch_contract(&state, id).await?;

    remove_upload(std::path::Path::new(&contract.file_path)).await?;

    let mut tx = state.db.begin().await?;
    sqlx::query("DELETE FROM summaries WHERE contract_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM entities WHERE contract_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM contracts WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    let ip = client_ip(connect);
    state
        .record_audit(with_ip(
            AuditEntry::new(AuditAction::DeleteContract, ResourceType::Contract, Some(id))
                .with_user(contract.user_id)
                .with_details(format!("Deleted {}", contract.file_name)),
            &ip,
        ))
        .await?;

    tracing::info!("Deleted contract {}", id);
    Ok(Json(MessageResponse::new("Contract deleted successfully")))
}
