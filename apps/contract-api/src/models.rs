//! Data models for the contract API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Contract row stored in database
#[derive(Debug, Clone, FromRow)]
pub struct DbContract {
    pub id: i64,
    pub user_id: i64,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_hash: String,
    pub language: String,
    pub page_count: Option<i64>,
    pub status: String,
    pub uploaded_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// Summary row stored in database
#[derive(Debug, Clone, FromRow)]
pub struct DbSummary {
    pub id: i64,
    pub contract_id: i64,
    pub content: String,
    pub raw_content: String,
    pub confidence_score: f64,
    pub summary_type: String,
    pub model_used: String,
    pub word_count: i64,
    pub chunks_processed: i64,
    pub created_at: DateTime<Utc>,
    pub approved: bool,
}

/// Entity row stored in database
#[derive(Debug, Clone, FromRow)]
pub struct DbEntity {
    pub id: i64,
    pub contract_id: i64,
    pub entity_type: String,
    pub entity_value: String,
    pub confidence: f64,
    pub section: Option<String>,
    pub start_offset: i64,
    pub end_offset: i64,
}

/// Audit row stored in database
#[derive(Debug, Clone, FromRow)]
pub struct DbAuditLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<i64>,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub timestamp: DateTime<Utc>,
}

pub const CONTRACT_COLUMNS: &str = "id, user_id, file_name, file_path, file_size, file_hash, \
     language, page_count, status, uploaded_at, processed_at";

pub const SUMMARY_COLUMNS: &str = "id, contract_id, content, raw_content, confidence_score, \
     summary_type, model_used, word_count, chunks_processed, created_at, approved";

// ============================================================
// Responses
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractResponse {
    pub id: i64,
    pub user_id: i64,
    pub file_name: String,
    pub file_size: i64,
    pub file_hash: String,
    pub language: String,
    pub page_count: Option<i64>,
    pub status: String,
    pub uploaded_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<DbContract> for ContractResponse {
    fn from(c: DbContract) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            file_name: c.file_name,
            file_size: c.file_size,
            file_hash: c.file_hash,
            language: c.language,
            page_count: c.page_count,
            status: c.status,
            uploaded_at: c.uploaded_at,
            processed_at: c.processed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub id: i64,
    pub contract_id: i64,
    pub content: String,
    pub raw_content: String,
    pub confidence_score: f64,
    pub summary_type: String,
    pub model_used: String,
    pub word_count: i64,
    pub created_at: DateTime<Utc>,
    pub approved: bool,
}

impl From<DbSummary> for SummaryResponse {
    fn from(s: DbSummary) -> Self {
        Self {
            id: s.id,
            contract_id: s.contract_id,
            content: s.content,
            raw_content: s.raw_content,
            confidence_score: s.confidence_score,
            summary_type: s.summary_type,
            model_used: s.model_used,
            word_count: s.word_count,
            created_at: s.created_at,
            approved: s.approved,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityResponse {
    pub id: i64,
    pub entity_type: String,
    pub entity_value: String,
    pub confidence: f64,
    pub section: Option<String>,
    pub start_offset: i64,
    pub end_offset: i64,
}

impl From<DbEntity> for EntityResponse {
    fn from(e: DbEntity) -> Self {
        Self {
            id: e.id,
            entity_type: e.entity_type,
            entity_value: e.entity_value,
            confidence: e.confidence,
            section: e.section,
            start_offset: e.start_offset,
            end_offset: e.end_offset,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogResponse {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<i64>,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<DbAuditLog> for AuditLogResponse {
    fn from(a: DbAuditLog) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            action: a.action,
            resource_type: a.resource_type,
            resource_id: a.resource_id,
            details: a.details,
            ip_address: a.ip_address,
            timestamp: a.timestamp,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub contract_id: i64,
    pub language: String,
    pub entities_found: usize,
    pub page_count: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContractListResponse {
    pub contracts: Vec<ContractResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContractDetailResponse {
    pub contract: ContractResponse,
    pub entities: Vec<EntityResponse>,
}

/// How a summary was produced
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationInfo {
    pub model_used: String,
    pub processing_time_ms: u64,
    pub chunks_processed: usize,
    pub target_words: usize,
    pub timed_out: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateSummaryResponse {
    pub summary: SummaryResponse,
    pub model_info: GenerationInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryDetailResponse {
    pub summary: SummaryResponse,
    pub contract: Option<ContractResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryListResponse {
    pub summaries: Vec<SummaryResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditListResponse {
    pub logs: Vec<AuditLogResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================
// Requests
// ============================================================

#[derive(Debug, Default, Deserialize)]
pub struct GenerateSummaryRequest {
    #[serde(rename = "type")]
    pub summary_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub rating: i64,
}

#[derive(Debug, Deserialize)]
pub struct ContractListQuery {
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub resource_type: Option<String>,
    pub resource_id: Option<i64>,
    pub limit: Option<i64>,
}
