//! Domain records shared across the contract summarization workspace
//!
//! Every crate speaks in these types: the extractor and NLP crates produce
//! [`ExtractedEntity`] values, the summarizer is driven by [`SummaryType`],
//! and the API persists [`ContractStatus`] transitions and [`AuditAction`]s.

pub mod audit;
pub mod types;

pub use audit::{hash_document, AuditAction, AuditEntry, ResourceType};
pub use types::{
    ContractStatus, EntityLabel, ExtractedEntity, Language, StatusTransitionError, SummaryType,
};
