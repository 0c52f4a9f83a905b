//! Implements a struct that holds the state of the web server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, api::ExpenseApi, dashboard::DashboardBuilder, db::initialize, html::ErrorDetail};

/// The state of the web server.
#[derive(Clone)]
pub struct AppState {
    /// The local preference store.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The PCS backend that owns the expense and preset data.
    pub api: Arc<dyn ExpenseApi>,

    /// The widgets and filters of the dashboard.
    pub dashboard: Arc<Mutex<DashboardBuilder>>,

    /// The base URL of the PCS backend, used to link to its pages.
    pub backend_url: String,

    /// How much of a backend failure is shown to the user.
    pub error_detail: ErrorDetail,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the preference table.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        api: Arc<dyn ExpenseApi>,
        backend_url: &str,
        error_detail: ErrorDetail,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            api,
            dashboard: Arc::new(Mutex::new(DashboardBuilder::new())),
            backend_url: backend_url.trim_end_matches('/').to_owned(),
            error_detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rusqlite::Connection;

    use crate::{db::get_preference, html::ErrorDetail, test_utils::FakeExpenseApi};

    use super::AppState;

    #[test]
    fn new_initializes_preference_store() {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            Arc::new(FakeExpenseApi::default()),
            "http://localhost:5000/",
            ErrorDetail::Generic,
        )
        .unwrap();

        assert_eq!(state.backend_url, "http://localhost:5000");
        assert!(state.dashboard.lock().unwrap().is_empty());
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_preference("expenseTableColumns", &connection).unwrap(), None);
    }
}
