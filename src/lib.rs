//! PCS Tracker is a web front end for tracking the expenses of a permanent
//! change of station (PCS) move.
//!
//! This library serves HTML pages for a configurable dashboard, an expense
//! table with customisable columns, and an expense preview modal. Expense data
//! lives in an external backend which is accessed through [ExpenseApi].

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod api;
mod app_state;
mod dashboard;
mod db;
mod endpoints;
mod expense;
mod html;
mod internal_server_error;
mod navigation;
mod not_found;
mod routing;

#[cfg(test)]
mod test_utils;

pub use api::{ExpenseApi, FetchError, HttpExpenseApi};
pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use html::ErrorDetail;
pub use routing::build_router;

use crate::{
    alert::Alert, internal_server_error::InternalServerError, not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Could not acquire the lock on the dashboard state
    #[error("could not acquire the dashboard lock")]
    DashboardLockError,

    /// A widget type that the dashboard does not know how to display.
    #[error("unknown widget type \"{0}\"")]
    UnknownWidgetKind(String),

    /// An empty string was used as a preset name.
    #[error("Preset name cannot be empty")]
    EmptyPresetName,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// The PCS backend could not be reached or returned an unusable response.
    #[error("the expense backend request failed: {0}")]
    Backend(#[from] FetchError),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::Backend(error) => {
                tracing::error!("Could not reach the expense backend: {error}");
                InternalServerError {
                    description: "Could not reach the expense backend",
                    fix: "Check that the PCS backend is running and try again.",
                }
                .into_response()
            }
            Error::DatabaseLockError | Error::DashboardLockError => {
                InternalServerError::default().into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        let (status, message, details) = match self {
            Error::EmptyPresetName => (
                StatusCode::BAD_REQUEST,
                "Invalid preset name",
                "Give the preset a name before saving it.".to_owned(),
            ),
            Error::UnknownWidgetKind(kind) => (
                StatusCode::BAD_REQUEST,
                "Unknown widget type",
                format!("\"{kind}\" is not a widget that can be added to the dashboard."),
            ),
            Error::Backend(error) => {
                tracing::error!("Expense backend request failed: {error}");
                (
                    StatusCode::BAD_GATEWAY,
                    "Could not reach the expense backend",
                    "Check that the PCS backend is running and try again.".to_owned(),
                )
            }
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                "Not found",
                "The requested item could not be found. Try refreshing the page.".to_owned(),
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                )
            }
        };

        (
            status,
            Alert::Error {
                message: message.to_owned(),
                details,
            },
        )
            .into_response()
    }
}
