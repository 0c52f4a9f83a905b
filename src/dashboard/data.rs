//! The data a widget displays and how it is fetched.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    api::{ExpenseApi, FetchError},
    dashboard::{
        filters::FilterSet,
        widget::{DataSource, WidgetKind},
    },
};

/// Parallel label and value arrays, as sent by the backend.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LabeledSeries {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

impl LabeledSeries {
    /// The label-value pairs, truncated to the shorter of the two arrays.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.data.iter().copied())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReimbursementStats {
    pub pending: f64,
    pub approved: f64,
    pub received: f64,
}

/// The aggregate breakdowns returned by `/api/expense_data`.
///
/// Every field falls back to its default when the backend leaves it out.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExpenseData {
    pub categories: LabeledSeries,
    pub payment_methods: LabeledSeries,
    pub daily_trend: LabeledSeries,
    pub reimbursement_stats: ReimbursementStats,
    pub expense_count: u64,
    pub total_expenses: f64,
}

impl ExpenseData {
    /// The mean expense amount, or zero when there are no expenses.
    pub fn average_expense(&self) -> f64 {
        if self.expense_count == 0 {
            0.0
        } else {
            self.total_expenses / self.expense_count as f64
        }
    }

    /// The `limit` categories with the largest totals, largest first.
    pub fn top_categories(&self, limit: usize) -> Vec<(&str, f64)> {
        let mut categories: Vec<_> = self.categories.pairs().collect();
        categories.sort_by(|a, b| b.1.total_cmp(&a.1));
        categories.truncate(limit);
        categories
    }
}

/// One row of the recent expenses summary.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecentExpense {
    pub title: Option<String>,
    pub amount: f64,
}

/// The per-kind summary returned by `/api/widgets/data`.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetData {
    /// A single currency amount.
    Value(f64),
    /// The number and total amount of pending reimbursements.
    Pending { count: u64, total: f64 },
    /// The most recent expenses.
    Recent(Vec<RecentExpense>),
}

#[derive(Deserialize)]
struct ValueBody {
    #[serde(default)]
    value: Option<f64>,
}

#[derive(Deserialize)]
struct PendingBody {
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    total: Option<f64>,
}

impl WidgetData {
    /// Interpret a `/api/widgets/data` response body for a widget of `kind`.
    ///
    /// # Errors
    /// Returns [FetchError::Decode] if the body does not have the shape for
    /// `kind`, or if `kind` does not read from the widget data endpoint.
    pub fn from_json(kind: WidgetKind, body: Value) -> Result<Self, FetchError> {
        match kind {
            WidgetKind::TotalSpent | WidgetKind::ReimbursableAmount => {
                let body: ValueBody = serde_json::from_value(body)?;
                Ok(WidgetData::Value(body.value.unwrap_or_default()))
            }
            WidgetKind::PendingReimbursements => {
                let body: PendingBody = serde_json::from_value(body)?;
                Ok(WidgetData::Pending {
                    count: body.count.unwrap_or_default(),
                    total: body.total.unwrap_or_default(),
                })
            }
            WidgetKind::RecentExpenses => {
                let rows: Vec<RecentExpense> = serde_json::from_value(body)?;
                Ok(WidgetData::Recent(rows))
            }
            other => Err(FetchError::Decode(format!(
                "{other} widgets do not read from the widget data endpoint"
            ))),
        }
    }
}

/// The data fetched for one widget.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetPayload {
    Expense(ExpenseData),
    Widget(WidgetData),
}

/// Fetch the data a widget of `kind` displays under `filters`.
pub async fn fetch_payload(
    api: &dyn ExpenseApi,
    kind: WidgetKind,
    filters: &FilterSet,
) -> Result<WidgetPayload, FetchError> {
    match kind.data_source() {
        DataSource::ExpenseData => api.expense_data(filters).await.map(WidgetPayload::Expense),
        DataSource::WidgetData => api
            .widget_data(filters, kind)
            .await
            .map(WidgetPayload::Widget),
    }
}
