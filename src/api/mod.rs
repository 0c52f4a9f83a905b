//! The boundary to the external PCS backend that owns expense and preset data.

mod error;
mod http;

use async_trait::async_trait;

pub use error::FetchError;
pub use http::HttpExpenseApi;

use crate::{
    dashboard::{
        data::{ExpenseData, WidgetData},
        filters::{FilterOption, FilterSet},
        preset::{NewPreset, Preset},
        widget::WidgetKind,
    },
    expense::Expense,
};

/// Read and write access to the PCS backend's JSON API.
///
/// Handlers only depend on this trait, so tests can swap the HTTP client for
/// canned responses.
#[async_trait]
pub trait ExpenseApi: Send + Sync {
    /// `GET /api/expense_data` with the filter set as the query string.
    async fn expense_data(&self, filters: &FilterSet) -> Result<ExpenseData, FetchError>;

    /// `GET /api/widgets/data` with the filter set and `type=<kind>`.
    async fn widget_data(
        &self,
        filters: &FilterSet,
        kind: WidgetKind,
    ) -> Result<WidgetData, FetchError>;

    /// The categories an expense can be filed under.
    async fn categories(&self) -> Result<Vec<FilterOption>, FetchError>;

    /// The payment methods an expense can be paid with.
    async fn payment_methods(&self) -> Result<Vec<FilterOption>, FetchError>;

    /// Every saved dashboard preset.
    async fn list_presets(&self) -> Result<Vec<Preset>, FetchError>;

    /// A single preset with its full widget config.
    async fn get_preset(&self, preset_id: i64) -> Result<Preset, FetchError>;

    /// Save the current dashboard as a new preset.
    async fn create_preset(&self, preset: &NewPreset) -> Result<(), FetchError>;

    /// Flag a preset as the default. The backend clears the flag on every other preset.
    async fn set_default_preset(&self, preset_id: i64) -> Result<(), FetchError>;

    /// Delete a preset.
    async fn delete_preset(&self, preset_id: i64) -> Result<(), FetchError>;

    /// A single expense, for the preview modal.
    async fn get_expense(&self, expense_id: i64) -> Result<Expense, FetchError>;

    /// Every expense, in the order the backend lists them.
    async fn list_expenses(&self) -> Result<Vec<Expense>, FetchError>;
}
