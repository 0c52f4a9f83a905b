//! The expense record as returned by the backend, plus its display helpers.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use time::{Date, macros::format_description};

/// An expense recorded in the PCS backend.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "ExpenseRecord")]
pub struct Expense {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub cost: Option<f64>,
    pub date: Option<String>,
    pub category: Option<ExpenseCategory>,
    pub payment_method: Option<ExpensePaymentMethod>,
    pub location: Option<String>,
    pub vendor: Option<String>,
    pub notes: Option<String>,
    /// Comma-separated tags.
    pub tags: Option<String>,
    pub is_reimbursable: Reimbursable,
    pub reimbursement_status: ReimbursementStatus,
    pub reimbursement_notes: Option<String>,
    /// Set when either `receipt_image` or the older `has_receipt` key is truthy.
    pub has_receipt: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// An expense as sent by the backend, before the receipt keys are merged.
#[derive(Deserialize)]
struct ExpenseRecord {
    id: i64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    cost: Option<f64>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    category: Option<ExpenseCategory>,
    #[serde(default)]
    payment_method: Option<ExpensePaymentMethod>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    vendor: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    tags: Option<String>,
    #[serde(default)]
    is_reimbursable: Reimbursable,
    #[serde(default)]
    reimbursement_status: ReimbursementStatus,
    #[serde(default)]
    reimbursement_notes: Option<String>,
    #[serde(default)]
    receipt_image: Option<Value>,
    #[serde(default)]
    has_receipt: Option<Value>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl From<ExpenseRecord> for Expense {
    fn from(record: ExpenseRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            cost: record.cost,
            date: record.date,
            category: record.category,
            payment_method: record.payment_method,
            location: record.location,
            vendor: record.vendor,
            notes: record.notes,
            tags: record.tags,
            is_reimbursable: record.is_reimbursable,
            reimbursement_status: record.reimbursement_status,
            reimbursement_notes: record.reimbursement_notes,
            has_receipt: truthy(record.receipt_image.as_ref())
                || truthy(record.has_receipt.as_ref()),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl Expense {
    pub fn display_title(&self) -> &str {
        non_empty(&self.title).unwrap_or("Untitled Expense")
    }

    pub fn amount(&self) -> f64 {
        self.cost.unwrap_or_default()
    }

    /// The tags as trimmed, non-empty strings.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExpenseCategory {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExpensePaymentMethod {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Whether an expense can be claimed back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Reimbursable {
    Yes,
    Maybe,
    #[default]
    No,
}

impl<'de> Deserialize<'de> for Reimbursable {
    /// Reads "yes", "maybe" and "no", and maps the legacy booleans to yes and no.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;

        Ok(match value {
            Some(Value::Bool(true)) => Reimbursable::Yes,
            Some(Value::String(text)) => match text.trim().to_lowercase().as_str() {
                "yes" | "true" => Reimbursable::Yes,
                "maybe" => Reimbursable::Maybe,
                _ => Reimbursable::No,
            },
            _ => Reimbursable::No,
        })
    }
}

/// How far a reimbursement claim has progressed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReimbursementStatus {
    #[default]
    NotRequested,
    Pending,
    Approved,
    Received,
    /// A status this version does not know, kept verbatim for display.
    Other(String),
}

impl<'de> Deserialize<'de> for ReimbursementStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = Option::<String>::deserialize(deserializer)?.unwrap_or_default();

        Ok(match text.trim() {
            "" | "none" => ReimbursementStatus::NotRequested,
            "pending" => ReimbursementStatus::Pending,
            "approved" => ReimbursementStatus::Approved,
            "received" => ReimbursementStatus::Received,
            other => ReimbursementStatus::Other(other.to_owned()),
        })
    }
}

/// The colour scheme of a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Info,
    Warning,
    Secondary,
}

impl Tone {
    pub fn class(self) -> &'static str {
        match self {
            Tone::Success => {
                "bg-green-100 text-green-800 dark:bg-green-900 dark:text-green-300"
            }
            Tone::Info => "bg-cyan-100 text-cyan-800 dark:bg-cyan-900 dark:text-cyan-300",
            Tone::Warning => {
                "bg-yellow-100 text-yellow-800 dark:bg-yellow-900 dark:text-yellow-300"
            }
            Tone::Secondary => "bg-gray-200 text-gray-800 dark:bg-gray-700 dark:text-gray-300",
        }
    }
}

/// The label and tone of the reimbursable badge.
pub fn reimbursable_badge(
    reimbursable: Reimbursable,
    status: &ReimbursementStatus,
) -> (&'static str, Tone) {
    match (reimbursable, status) {
        (Reimbursable::Yes, ReimbursementStatus::Pending) => ("Pending", Tone::Warning),
        (Reimbursable::Yes, ReimbursementStatus::Approved) => ("Approved", Tone::Info),
        (Reimbursable::Yes, ReimbursementStatus::Received) => ("Received", Tone::Success),
        (Reimbursable::Yes, _) => ("Yes", Tone::Success),
        (Reimbursable::Maybe, _) => ("Maybe", Tone::Warning),
        (Reimbursable::No, _) => ("No", Tone::Secondary),
    }
}

/// The label and tone of a known reimbursement status, `None` for unknown statuses.
pub fn status_badge(status: &ReimbursementStatus) -> Option<(&'static str, Tone)> {
    match status {
        ReimbursementStatus::Pending => Some(("Pending", Tone::Warning)),
        ReimbursementStatus::Approved => Some(("Approved", Tone::Info)),
        ReimbursementStatus::Received => Some(("Received", Tone::Success)),
        ReimbursementStatus::NotRequested | ReimbursementStatus::Other(_) => None,
    }
}

/// Format a backend date or timestamp as `M/D/YYYY`.
///
/// Missing values render as "N/A". Values that do not start with an ISO date
/// are shown as they are.
pub fn format_display_date(value: Option<&str>) -> String {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return "N/A".to_owned();
    };

    value
        .get(..10)
        .and_then(|prefix| Date::parse(prefix, format_description!("[year]-[month]-[day]")).ok())
        .and_then(|date| {
            date.format(format_description!(
                "[month padding:none]/[day padding:none]/[year]"
            ))
            .ok()
        })
        .unwrap_or_else(|| value.to_owned())
}

/// The string if it is present and not blank.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|text| !text.is_empty())
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Number(_)) | Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    }
}
