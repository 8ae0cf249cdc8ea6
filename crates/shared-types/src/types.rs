use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Languages the pipeline distinguishes between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "eng" | "english" => Ok(Language::En),
            "fr" | "fra" | "french" | "français" => Ok(Language::Fr),
            other => Err(format!("Unsupported language '{}'", other)),
        }
    }
}

/// Contract processing lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Illegal contract status transition: {from} -> {to}")]
pub struct StatusTransitionError {
    pub from: ContractStatus,
    pub to: ContractStatus,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Pending => "pending",
            ContractStatus::Processing => "processing",
            ContractStatus::Completed => "completed",
            ContractStatus::Failed => "failed",
        }
    }

    /// Status only moves forward, except that a finished contract may be
    /// sent back to `processing` for a retry or regeneration.
    pub fn can_transition_to(&self, next: ContractStatus) -> bool {
        use ContractStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Failed)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Completed, Processing)
                | (Failed, Processing)
        )
    }

    pub fn transition_to(
        &self,
        next: ContractStatus,
    ) -> Result<ContractStatus, StatusTransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(StatusTransitionError {
                from: *self,
                to: next,
            })
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ContractStatus::Pending),
            "processing" => Ok(ContractStatus::Processing),
            "completed" => Ok(ContractStatus::Completed),
            "failed" => Ok(ContractStatus::Failed),
            other => Err(format!("Unknown contract status '{}'", other)),
        }
    }
}

/// Requested summary length category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryType {
    Brief,
    #[default]
    Standard,
    Detailed,
}

impl SummaryType {
    pub const ALL: [SummaryType; 3] = [
        SummaryType::Brief,
        SummaryType::Standard,
        SummaryType::Detailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryType::Brief => "brief",
            SummaryType::Standard => "standard",
            SummaryType::Detailed => "detailed",
        }
    }
}

impl fmt::Display for SummaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "brief" => Ok(SummaryType::Brief),
            "standard" => Ok(SummaryType::Standard),
            "detailed" => Ok(SummaryType::Detailed),
            other => Err(format!(
                "Unknown summary type '{}'. Must be 'brief', 'standard', or 'detailed'",
                other
            )),
        }
    }
}

/// Entity categories produced by the entity extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityLabel {
    Person,
    Org,
    Money,
    Date,
    Salary,
}

impl EntityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::Person => "PERSON",
            EntityLabel::Org => "ORG",
            EntityLabel::Money => "MONEY",
            EntityLabel::Date => "DATE",
            EntityLabel::Salary => "SALARY",
        }
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERSON" => Ok(EntityLabel::Person),
            "ORG" => Ok(EntityLabel::Org),
            "MONEY" => Ok(EntityLabel::Money),
            "DATE" => Ok(EntityLabel::Date),
            "SALARY" => Ok(EntityLabel::Salary),
            other => Err(format!("Unknown entity label '{}'", other)),
        }
    }
}

/// A single entity mention found in contract text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntity {
    pub text: String,
    pub label: EntityLabel,
    pub confidence: f64,
    pub start_offset: usize, // Byte offset in the cleaned text
    pub end_offset: usize,
    /// Contract section the mention falls in, if any
    pub section: Option<String>,
}
