/// Core data structures for equipment uploads
///
/// This module defines the rows produced by validation, the summary record
/// retained in history, and the identifiers that tie a summary to its owner
/// and to the raw file kept in blob storage.
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Column headers every upload must carry, in canonical order
pub const REQUIRED_COLUMNS: [&str; 5] = ["Equipment Name", "Type", "Flowrate", "Pressure", "Temperature"];

/// Number of summaries retained per owner
pub const HISTORY_LIMIT: usize = 5;

/// Equipment type label -> occurrence count, in first-seen order
pub type TypeDistribution = IndexMap<String, u64>;

/// A single validated data row
///
/// Serializes with the upload's column names so rows can be echoed back
/// in the same shape they arrived in.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EquipmentRow {
    #[serde(rename = "Equipment Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub equipment_type: String,
    #[serde(rename = "Flowrate")]
    pub flowrate: f64,
    #[serde(rename = "Pressure")]
    pub pressure: f64,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
}

/// Authenticated account a summary belongs to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(name: impl Into<String>) -> Self {
        OwnerId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque summary identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SummaryId(Uuid);

impl SummaryId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        SummaryId(Uuid::new_v4())
    }

    /// Lowercase hex digits without hyphens
    pub fn simple(&self) -> String {
        self.0.simple().to_string()
    }

    /// First eight hex digits, enough to pick an entry out of a short history
    pub fn short(&self) -> String {
        self.simple()[..8].to_string()
    }
}

impl Default for SummaryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SummaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SummaryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(SummaryId)
    }
}

/// Handle to the raw upload bytes held by a blob store
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct StorageToken(String);

impl StorageToken {
    pub fn new(token: impl Into<String>) -> Self {
        StorageToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Aggregates computed from one row set
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct SummaryFields {
    pub total_count: u64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub type_distribution: TypeDistribution,
}

/// Summary statistics for one successful upload
///
/// Created once by the ingestion pipeline and never mutated afterwards;
/// the history store hands out shared `Arc<Summary>` references.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Summary {
    pub id: SummaryId,
    pub owner: OwnerId,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub total_count: u64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub type_distribution: TypeDistribution,
    /// Raw upload retained in blob storage (None when nothing was kept)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageToken>,
}

impl Summary {
    pub fn new(
        id: SummaryId,
        owner: OwnerId,
        filename: impl Into<String>,
        uploaded_at: DateTime<Utc>,
        fields: SummaryFields,
        storage: Option<StorageToken>,
    ) -> Self {
        Summary {
            id,
            owner,
            filename: filename.into(),
            uploaded_at,
            total_count: fields.total_count,
            avg_flowrate: fields.avg_flowrate,
            avg_pressure: fields.avg_pressure,
            avg_temperature: fields.avg_temperature,
            type_distribution: fields.type_distribution,
            storage,
        }
    }

    /// Check the count invariant: every row lands in exactly one type bucket
    pub fn is_consistent(&self) -> bool {
        self.type_distribution.values().sum::<u64>() == self.total_count
    }

    /// Upload time in the minute-resolution form used by listings and reports
    pub fn uploaded_display(&self) -> String {
        self.uploaded_at.format("%Y-%m-%d %H:%M").to_string()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.filename, self.uploaded_display())
    }
}
