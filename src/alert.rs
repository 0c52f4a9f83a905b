//! Alert system for displaying success and error messages to users.
//!
//! Alerts are HTML fragments that htmx swaps into the `#alert-container`
//! element rendered by [crate::html::base]. Error responses are routed there
//! with `hx-target-error`, other alerts are sent out-of-band with [Alert::oob].

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A message to show the user in the alert container.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message.
    SuccessSimple { message: String },
    /// A neutral, informational message.
    Info { message: String },
    /// An error message with extra details.
    Error { message: String, details: String },
}

impl Alert {
    /// Render the alert box.
    pub fn into_html(self) -> Markup {
        let (style, message, details) = match self {
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, message, String::new()),
            Alert::Info { message } => (INFO_STYLE, message, String::new()),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
        };

        html!(
            div role="alert" class=(style)
            {
                div class="flex items-start justify-between gap-4"
                {
                    div
                    {
                        p class="font-semibold" { (message) }

                        @if !details.is_empty() {
                            p class="text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        class="text-lg leading-none"
                        aria-label="Dismiss"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        )
    }

    /// Render the alert as an out-of-band swap into the alert container.
    ///
    /// Use this when the main response body targets another element.
    pub fn oob(self) -> Markup {
        html!(
            div id="alert-container" hx-swap-oob="innerHTML"
            {
                (self.into_html())
            }
        )
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}

const SUCCESS_STYLE: &str = "p-4 mb-4 rounded-lg text-green-800 bg-green-50 \
    dark:bg-gray-800 dark:text-green-400 shadow";
const INFO_STYLE: &str = "p-4 mb-4 rounded-lg text-blue-800 bg-blue-50 \
    dark:bg-gray-800 dark:text-blue-400 shadow";
const ERROR_STYLE: &str = "p-4 mb-4 rounded-lg text-red-800 bg-red-50 \
    dark:bg-gray-800 dark:text-red-400 shadow";
