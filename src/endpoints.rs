//! The endpoint URIs served by this application.
//!
//! For endpoints that take a parameter, e.g., '/expenses/{expense_id}/preview', use [format_endpoint].

use std::fmt::Display;

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The dashboard builder page.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The route for adding a widget to the dashboard.
pub const DASHBOARD_WIDGETS: &str = "/dashboard/widgets";
/// The route for removing a widget.
pub const DASHBOARD_WIDGET: &str = "/dashboard/widgets/{widget_id}";
/// The route for cycling a widget's size.
pub const DASHBOARD_WIDGET_RESIZE: &str = "/dashboard/widgets/{widget_id}/resize";
/// The route for loading a single widget's content.
pub const DASHBOARD_WIDGET_CONTENT: &str = "/dashboard/widgets/{widget_id}/content";
/// The route for applying the dashboard filters.
pub const DASHBOARD_FILTERS: &str = "/dashboard/filters";
/// The route for saving the dashboard as a preset.
pub const DASHBOARD_PRESETS: &str = "/dashboard/presets";
/// The route for deleting a preset.
pub const DASHBOARD_PRESET: &str = "/dashboard/presets/{preset_id}";
/// The route for loading a preset into the dashboard.
pub const DASHBOARD_PRESET_LOAD: &str = "/dashboard/presets/{preset_id}/load";
/// The route for making a preset the default.
pub const DASHBOARD_PRESET_DEFAULT: &str = "/dashboard/presets/{preset_id}/default";
/// The expense table page.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The route for the expense preview modal.
pub const EXPENSE_PREVIEW: &str = "/expenses/{expense_id}/preview";
/// The route for the column settings dialog and for saving column preferences.
pub const EXPENSE_COLUMNS: &str = "/expenses/columns";
/// The route for restoring the default column preferences.
pub const EXPENSE_COLUMNS_RESET: &str = "/expenses/columns/reset";

/// Backend pages, relative to the backend's base URL.
pub mod backend {
    /// The backend's expense edit page.
    pub const EDIT_EXPENSE: &str = "/expense/{expense_id}/edit";
    /// The backend's expense delete form action.
    pub const DELETE_EXPENSE: &str = "/expense/{expense_id}/delete";
    /// The backend's receipt image.
    pub const EXPENSE_RECEIPT: &str = "/expense/{expense_id}/receipt";
}

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/expenses/{expense_id}', '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
