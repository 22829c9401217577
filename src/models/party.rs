use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A transport party (consignment customer) as returned by the API.
///
/// The backend stores dates as ISO strings; they are parsed on demand
/// rather than at deserialization time so a malformed date from the
/// server never fails a whole list fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "partyName")]
    pub party_name: String,
    pub place: Option<String>,
    #[serde(rename = "sellingPlace")]
    pub selling_place: Option<String>,
    pub phone: Option<String>,
    pub quantity: Option<f64>,
    #[serde(rename = "netWeight")]
    pub net_weight: Option<f64>,
    #[serde(rename = "batchFrom")]
    pub batch_from: Option<String>,
    #[serde(rename = "batchTo")]
    pub batch_to: Option<String>,
    pub reminder: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<String>,
}

impl Party {
    pub fn batch_from_date(&self) -> Option<NaiveDate> {
        self.batch_from.as_deref().and_then(parse_iso_date)
    }

    pub fn batch_to_date(&self) -> Option<NaiveDate> {
        self.batch_to.as_deref().and_then(parse_iso_date)
    }

    pub fn reminder_date(&self) -> Option<NaiveDate> {
        self.reminder.as_deref().and_then(parse_iso_date)
    }

    /// True when the reminder date is today or already past.
    pub fn reminder_due(&self, today: NaiveDate) -> bool {
        self.reminder_date().map(|d| d <= today).unwrap_or(false)
    }
}

/// Parse the date part of an ISO timestamp or plain `YYYY-MM-DD` string.
pub(crate) fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let date_part = s.get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Create/update payload for a party. All fields optional; validation
/// happens in `service::validate_party_data` before submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartyDraft {
    #[serde(rename = "partyName", skip_serializing_if = "Option::is_none")]
    pub party_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(rename = "sellingPlace", skip_serializing_if = "Option::is_none")]
    pub selling_place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(rename = "netWeight", skip_serializing_if = "Option::is_none")]
    pub net_weight: Option<f64>,
    #[serde(rename = "batchFrom", skip_serializing_if = "Option::is_none")]
    pub batch_from: Option<String>,
    #[serde(rename = "batchTo", skip_serializing_if = "Option::is_none")]
    pub batch_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder: Option<String>,
}

/// One entry of a party's audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyHistoryEntry {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub action: String,
    #[serde(rename = "changedAt")]
    pub changed_at: Option<String>,
    #[serde(rename = "changedBy")]
    pub changed_by: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// Result of a bulk write. The backend either echoes the mutated
/// resources (authoritative for cache repopulation) or returns an
/// aggregate summary.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BulkOutcome {
    Mutated(Vec<Party>),
    Summary(BulkSummary),
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkSummary {
    #[serde(
        rename = "modifiedCount",
        alias = "deletedCount",
        alias = "count",
        default
    )]
    pub count: u64,
    #[serde(default)]
    pub message: Option<String>,
}
