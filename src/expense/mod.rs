//! The expense table, its column preferences and the expense preview modal.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{AppState, api::ExpenseApi, html::ErrorDetail};

mod columns;
pub mod models;
mod preview;
mod table;

pub use columns::{ColumnState, get_column_dialog, reset_columns, save_columns};
pub use models::Expense;
pub use preview::get_expense_preview;
pub use table::get_expenses_page;

/// The state needed by the expense pages.
#[derive(Clone)]
pub struct ExpenseState {
    /// The local preference store.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The PCS backend.
    pub api: Arc<dyn ExpenseApi>,
    /// The PCS backend's base URL, used for links to its pages.
    pub backend_url: String,
    /// How much of a backend failure is shown to the user.
    pub error_detail: ErrorDetail,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            api: state.api.clone(),
            backend_url: state.backend_url.clone(),
            error_detail: state.error_detail,
        }
    }
}

/// The URL of a backend page for one expense.
fn backend_expense_url(backend_url: &str, endpoint: &str, expense_id: i64) -> String {
    format!(
        "{}{}",
        backend_url.trim_end_matches('/'),
        crate::endpoints::format_endpoint(endpoint, expense_id)
    )
}
