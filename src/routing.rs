//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    dashboard::{
        add_widget, delete_preset, get_dashboard_page, get_widget_content, load_preset,
        remove_widget, resize_widget, save_preset, set_default_preset, update_filters,
    },
    endpoints,
    expense::{
        get_column_dialog, get_expense_preview, get_expenses_page, reset_columns, save_columns,
    },
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let dashboard_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::DASHBOARD_WIDGETS, post(add_widget))
        .route(endpoints::DASHBOARD_WIDGET, delete(remove_widget))
        .route(endpoints::DASHBOARD_WIDGET_RESIZE, post(resize_widget))
        .route(endpoints::DASHBOARD_WIDGET_CONTENT, get(get_widget_content))
        .route(endpoints::DASHBOARD_FILTERS, post(update_filters))
        .route(endpoints::DASHBOARD_PRESETS, post(save_preset))
        .route(endpoints::DASHBOARD_PRESET, delete(delete_preset))
        .route(endpoints::DASHBOARD_PRESET_LOAD, post(load_preset))
        .route(endpoints::DASHBOARD_PRESET_DEFAULT, put(set_default_preset));

    let expense_routes = Router::new()
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::EXPENSE_PREVIEW, get(get_expense_preview))
        .route(
            endpoints::EXPENSE_COLUMNS,
            get(get_column_dialog).post(save_columns),
        )
        .route(endpoints::EXPENSE_COLUMNS_RESET, post(reset_columns));

    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .merge(dashboard_routes)
        .merge(expense_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
