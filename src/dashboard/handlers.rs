//! Dashboard HTTP handlers.
//!
//! Every handler that changes the widget grid responds with the whole
//! `#dashboard-preview` grid. Widget content is fetched by a separate request
//! per widget, so one slow or failing widget never holds up the others.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRefresh;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    api::ExpenseApi,
    dashboard::{
        builder::DashboardBuilder,
        filters::{FilterForm, FilterOptions, FilterSet},
        preset::{NewPreset, Preset},
        refresh::{lock, refresh_widget},
        view::{dashboard_content, dashboard_page, widget_content, widget_grid},
        widget::{WidgetId, WidgetKind, WidgetSize},
    },
    html::ErrorDetail,
};

/// The state needed by the dashboard handlers.
#[derive(Clone)]
pub struct DashboardState {
    /// The widgets and filters of the dashboard.
    pub dashboard: Arc<Mutex<DashboardBuilder>>,
    /// The PCS backend.
    pub api: Arc<dyn ExpenseApi>,
    /// How much of a backend failure is shown in a widget.
    pub error_detail: ErrorDetail,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            dashboard: state.dashboard.clone(),
            api: state.api.clone(),
            error_detail: state.error_detail,
        }
    }
}

/// The form for adding a widget.
#[derive(Debug, Deserialize)]
pub struct AddWidgetForm {
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub size: Option<WidgetSize>,
}

/// The form for saving the dashboard as a preset.
#[derive(Debug, Deserialize)]
pub struct SavePresetForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_default: Option<String>,
}

async fn fetch_filter_options(api: &dyn ExpenseApi) -> FilterOptions {
    let categories = api
        .categories()
        .await
        .inspect_err(|error| tracing::error!("Could not fetch categories: {error}"))
        .unwrap_or_default();
    let payment_methods = api
        .payment_methods()
        .await
        .inspect_err(|error| tracing::error!("Could not fetch payment methods: {error}"))
        .unwrap_or_default();

    FilterOptions {
        categories,
        payment_methods,
    }
}

/// Fetch the preset flagged as default, if there is one.
async fn fetch_default_preset(api: &dyn ExpenseApi, presets: &[Preset]) -> Option<Preset> {
    let default = presets.iter().find(|preset| preset.is_default)?;

    api.get_preset(default.id)
        .await
        .inspect_err(|error| {
            tracing::error!("Could not load default preset {}: {error}", default.id)
        })
        .ok()
}

/// Display the dashboard builder.
///
/// The default preset, if any, is loaded on the first render that can reach
/// the backend. Until then every render tries again.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let options = fetch_filter_options(state.api.as_ref()).await;

    let default_pending = {
        let mut builder = lock(&state.dashboard)?;
        builder.set_filter_options(options);
        builder.default_preset_pending()
    };

    let (presets, default_preset, default_settled) = match state.api.list_presets().await {
        Ok(presets) if default_pending => {
            let default_preset = fetch_default_preset(state.api.as_ref(), &presets).await;
            // A default that exists but failed to load is retried on the next render.
            let settled =
                default_preset.is_some() || !presets.iter().any(|preset| preset.is_default);
            (presets, default_preset, settled)
        }
        Ok(presets) => (presets, None, false),
        Err(error) => {
            tracing::error!("Could not fetch presets: {error}");
            (Vec::new(), None, false)
        }
    };

    let mut builder = lock(&state.dashboard)?;

    if default_settled && builder.mark_default_preset_checked() {
        if let Some(preset) = default_preset {
            tracing::info!("Loading default preset \"{}\"", preset.name);
            builder.load_preset(&preset);
        }
    }

    Ok(dashboard_page(&builder, &presets, state.error_detail).into_response())
}

/// Add a widget and return the updated grid.
pub async fn add_widget(
    State(state): State<DashboardState>,
    Form(form): Form<AddWidgetForm>,
) -> Response {
    let kind = match form.kind.parse::<WidgetKind>() {
        Ok(kind) => kind,
        Err(error) => {
            tracing::warn!("Rejected widget: {error}");
            return Error::UnknownWidgetKind(form.kind).into_alert_response();
        }
    };

    let mut builder = match lock(&state.dashboard) {
        Ok(builder) => builder,
        Err(error) => return error.into_alert_response(),
    };

    builder.add_widget(kind, &form.title, form.size.unwrap_or_default());

    widget_grid(&builder, state.error_detail).into_response()
}

/// Remove a widget and return the updated grid.
pub async fn remove_widget(
    State(state): State<DashboardState>,
    Path(widget_id): Path<WidgetId>,
) -> Response {
    let mut builder = match lock(&state.dashboard) {
        Ok(builder) => builder,
        Err(error) => return error.into_alert_response(),
    };

    if !builder.remove_widget(&widget_id) {
        tracing::debug!("Ignoring removal of unknown widget {widget_id}");
    }

    widget_grid(&builder, state.error_detail).into_response()
}

/// Cycle a widget's size and return the updated grid.
pub async fn resize_widget(
    State(state): State<DashboardState>,
    Path(widget_id): Path<WidgetId>,
) -> Response {
    let mut builder = match lock(&state.dashboard) {
        Ok(builder) => builder,
        Err(error) => return error.into_alert_response(),
    };

    if builder.resize_widget(&widget_id).is_none() {
        tracing::debug!("Ignoring resize of unknown widget {widget_id}");
    }

    widget_grid(&builder, state.error_detail).into_response()
}

/// Fetch and render one widget's content.
///
/// Responds with `204 No Content` when the widget was removed or its filters
/// changed while the data was being fetched, so the panel is left alone.
pub async fn get_widget_content(
    State(state): State<DashboardState>,
    Path(widget_id): Path<WidgetId>,
) -> Response {
    match refresh_widget(&state.dashboard, state.api.as_ref(), &widget_id).await {
        Ok(Some(slot)) => widget_content(&slot, state.error_detail).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Replace the filter set and return the grid with every widget reloading.
pub async fn update_filters(
    State(state): State<DashboardState>,
    Form(form): Form<FilterForm>,
) -> Response {
    let mut builder = match lock(&state.dashboard) {
        Ok(builder) => builder,
        Err(error) => return error.into_alert_response(),
    };

    let filters = FilterSet::from_form(&form, builder.filter_options());
    tracing::debug!("Applying dashboard filters {filters:?}");
    builder.set_filters(filters);

    widget_grid(&builder, state.error_detail).into_response()
}

/// Save the current widgets and filters as a preset.
pub async fn save_preset(
    State(state): State<DashboardState>,
    Form(form): Form<SavePresetForm>,
) -> Response {
    let preset = {
        let builder = match lock(&state.dashboard) {
            Ok(builder) => builder,
            Err(error) => return error.into_alert_response(),
        };

        NewPreset::new(
            &form.name,
            form.is_default.is_some(),
            builder.preset_config(),
            builder.filters().clone(),
        )
    };

    let preset = match preset {
        Ok(preset) => preset,
        Err(error) => return error.into_alert_response(),
    };

    match state.api.create_preset(&preset).await {
        Ok(()) => {
            tracing::info!("Saved dashboard preset \"{}\"", preset.name);
            (
                HxRefresh(true),
                Alert::SuccessSimple {
                    message: "Preset saved successfully".to_owned(),
                },
            )
                .into_response()
        }
        Err(error) => Error::Backend(error).into_alert_response(),
    }
}

/// Replace the dashboard with a saved preset.
///
/// Responds with the filter form and grid.
pub async fn load_preset(
    State(state): State<DashboardState>,
    Path(preset_id): Path<i64>,
) -> Response {
    let preset = match state.api.get_preset(preset_id).await {
        Ok(preset) => preset,
        Err(error) => return Error::Backend(error).into_alert_response(),
    };

    let mut builder = match lock(&state.dashboard) {
        Ok(builder) => builder,
        Err(error) => return error.into_alert_response(),
    };

    builder.load_preset(&preset);

    dashboard_content(&builder, state.error_detail).into_response()
}

pub async fn set_default_preset(
    State(state): State<DashboardState>,
    Path(preset_id): Path<i64>,
) -> Response {
    match state.api.set_default_preset(preset_id).await {
        Ok(()) => (HxRefresh(true), StatusCode::OK).into_response(),
        Err(error) => Error::Backend(error).into_alert_response(),
    }
}

pub async fn delete_preset(
    State(state): State<DashboardState>,
    Path(preset_id): Path<i64>,
) -> Response {
    match state.api.delete_preset(preset_id).await {
        Ok(()) => (HxRefresh(true), StatusCode::OK).into_response(),
        Err(error) => Error::Backend(error).into_alert_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use scraper::Selector;

    use crate::{
        api::FetchError,
        dashboard::{
            builder::{DashboardBuilder, WidgetState},
            data::WidgetData,
            filters::{FilterForm, FilterOption, FilterOptions, FilterSet, Period},
            preset::{Preset, PresetConfig, PresetWidget},
            widget::{WidgetId, WidgetKind, WidgetSize},
        },
        html::ErrorDetail,
        test_utils::{
            FakeExpenseApi, assert_status_ok, assert_valid_html, get_header, parse_html_document,
            parse_html_fragment,
        },
    };

    use super::{
        AddWidgetForm, DashboardState, SavePresetForm, add_widget, delete_preset,
        get_dashboard_page, get_widget_content, load_preset, remove_widget, resize_widget,
        save_preset, set_default_preset, update_filters,
    };

    fn state_with(api: FakeExpenseApi) -> (DashboardState, Arc<FakeExpenseApi>) {
        let api = Arc::new(api);
        let state = DashboardState {
            dashboard: Arc::new(Mutex::new(DashboardBuilder::new())),
            api: api.clone(),
            error_detail: ErrorDetail::Generic,
        };

        (state, api)
    }

    fn weekly_preset(is_default: bool) -> Preset {
        Preset {
            id: 7,
            name: "Weekly".to_owned(),
            is_default,
            config: PresetConfig {
                widgets: vec![PresetWidget {
                    id: None,
                    kind: "total-spent".to_owned(),
                    title: "Spent this week".to_owned(),
                    size: WidgetSize::Small,
                }],
                layout: "grid".to_owned(),
            },
            filters: FilterSet {
                period: Period::Week,
                ..Default::default()
            },
        }
    }

    fn add_form(kind: &str) -> Form<AddWidgetForm> {
        Form(AddWidgetForm {
            kind: kind.to_owned(),
            title: String::new(),
            size: None,
        })
    }

    #[tokio::test]
    async fn dashboard_page_loads_default_preset_once() {
        let (state, _) = state_with(FakeExpenseApi {
            presets: vec![weekly_preset(true)],
            ..Default::default()
        });

        let response = get_dashboard_page(State(state.clone())).await.unwrap();
        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let titles: Vec<String> = html
            .select(&Selector::parse("#dashboard-preview h3").unwrap())
            .map(|title| title.text().collect())
            .collect();
        assert_eq!(titles, ["Spent this week"]);

        // Widgets added after the first render survive later renders.
        let _ = add_widget(State(state.clone()), add_form("expense-count")).await;
        let _ = get_dashboard_page(State(state.clone())).await.unwrap();

        assert_eq!(state.dashboard.lock().unwrap().slots().len(), 2);
    }

    #[tokio::test]
    async fn default_preset_loads_once_backend_recovers() {
        let (state, _) = state_with(FakeExpenseApi {
            presets: vec![weekly_preset(true)],
            preset_list_outages: Mutex::new(1),
            ..Default::default()
        });

        let response = get_dashboard_page(State(state.clone())).await.unwrap();
        assert_status_ok(&response);
        assert!(state.dashboard.lock().unwrap().is_empty());

        let response = get_dashboard_page(State(state.clone())).await.unwrap();
        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        let titles: Vec<String> = html
            .select(&Selector::parse("#dashboard-preview h3").unwrap())
            .map(|title| title.text().collect())
            .collect();
        assert_eq!(titles, ["Spent this week"]);
        assert_eq!(state.dashboard.lock().unwrap().filters().period, Period::Week);
    }

    #[tokio::test]
    async fn dashboard_page_renders_without_backend() {
        let (state, _) = state_with(FakeExpenseApi {
            fail_with: Some(FetchError::Request("connection refused".to_owned())),
            ..Default::default()
        });

        let response = get_dashboard_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(
            html.select(&Selector::parse("#dashboard-empty-state").unwrap())
                .next()
                .is_some()
        );
    }

    #[tokio::test]
    async fn add_widget_returns_grid_with_loading_panel() {
        let (state, _) = state_with(FakeExpenseApi::default());

        let response = add_widget(State(state.clone()), add_form("category-pie")).await;

        assert_status_ok(&response);
        let html = parse_html_fragment(response).await;
        let panels: Vec<_> = html
            .select(&Selector::parse("#dashboard-preview > [data-widget-type]").unwrap())
            .map(|panel| panel.value().attr("data-widget-type").unwrap().to_owned())
            .collect();
        assert_eq!(panels, ["category-pie"]);
        assert!(
            html.select(&Selector::parse("[hx-trigger=load]").unwrap())
                .next()
                .is_some()
        );
    }

    #[tokio::test]
    async fn unknown_widget_kind_is_rejected() {
        let (state, _) = state_with(FakeExpenseApi::default());

        let response = add_widget(State(state.clone()), add_form("crystal-ball")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.dashboard.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_and_resize_update_the_grid() {
        let (state, _) = state_with(FakeExpenseApi::default());
        let id = state.dashboard.lock().unwrap().add_widget(
            WidgetKind::TotalSpent,
            "",
            WidgetSize::Medium,
        );

        let response = resize_widget(State(state.clone()), Path(id.clone())).await;
        assert_status_ok(&response);
        let html = parse_html_fragment(response).await;
        let size = html
            .select(&Selector::parse("[data-widget-size]").unwrap())
            .next()
            .unwrap()
            .value()
            .attr("data-widget-size")
            .map(str::to_owned);
        assert_eq!(size.as_deref(), Some("large"));

        let response = remove_widget(State(state.clone()), Path(id)).await;
        assert_status_ok(&response);
        assert!(state.dashboard.lock().unwrap().is_empty());

        let response = remove_widget(State(state), Path(WidgetId::from("widget-0-0"))).await;
        assert_status_ok(&response);
    }

    #[tokio::test]
    async fn widget_content_renders_fetched_data() {
        let (state, _) = state_with(FakeExpenseApi {
            widget_data: HashMap::from([(WidgetKind::TotalSpent, WidgetData::Value(12.3))]),
            ..Default::default()
        });
        let id = state.dashboard.lock().unwrap().add_widget(
            WidgetKind::TotalSpent,
            "",
            WidgetSize::Medium,
        );

        let response = get_widget_content(State(state.clone()), Path(id.clone())).await;

        assert_status_ok(&response);
        let html = parse_html_fragment(response).await;
        let text: String = html.root_element().text().collect();
        assert!(text.contains("$12.30"), "{text}");
        assert!(matches!(
            state.dashboard.lock().unwrap().slot(&id).unwrap().state,
            WidgetState::Loaded(_)
        ));
    }

    #[tokio::test]
    async fn widget_failure_is_isolated_to_its_panel() {
        let (state, _) = state_with(FakeExpenseApi {
            widget_data: HashMap::from([(WidgetKind::TotalSpent, WidgetData::Value(1.5))]),
            ..Default::default()
        });
        let (working, failing) = {
            let mut builder = state.dashboard.lock().unwrap();
            (
                builder.add_widget(WidgetKind::TotalSpent, "", WidgetSize::Medium),
                builder.add_widget(WidgetKind::ReimbursableAmount, "", WidgetSize::Medium),
            )
        };

        let failed = get_widget_content(State(state.clone()), Path(failing)).await;
        let loaded = get_widget_content(State(state.clone()), Path(working)).await;

        assert_status_ok(&failed);
        let text: String = parse_html_fragment(failed).await.root_element().text().collect();
        assert_eq!(text.trim(), "Failed to load data");
        let text: String = parse_html_fragment(loaded).await.root_element().text().collect();
        assert!(text.contains("$1.50"), "{text}");
    }

    #[tokio::test]
    async fn content_for_missing_widget_is_no_content() {
        let (state, _) = state_with(FakeExpenseApi::default());

        let response =
            get_widget_content(State(state), Path(WidgetId::from("widget-0-0"))).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn update_filters_compacts_and_reloads_widgets() {
        let (state, api) = state_with(FakeExpenseApi::default());
        let id = {
            let mut builder = state.dashboard.lock().unwrap();
            builder.set_filter_options(FilterOptions {
                categories: vec![
                    FilterOption {
                        id: 1,
                        name: "Lodging".to_owned(),
                    },
                    FilterOption {
                        id: 2,
                        name: "Fuel".to_owned(),
                    },
                ],
                payment_methods: vec![],
            });
            builder.add_widget(WidgetKind::ExpenseCount, "", WidgetSize::Medium)
        };
        let _ = get_widget_content(State(state.clone()), Path(id.clone())).await;

        let response = update_filters(
            State(state.clone()),
            Form(FilterForm {
                period: "year".to_owned(),
                categories: vec![1, 2],
                ..Default::default()
            }),
        )
        .await;

        assert_status_ok(&response);
        {
            let builder = state.dashboard.lock().unwrap();
            assert_eq!(builder.filters().period, Period::Year);
            assert_eq!(builder.filters().categories, None);
            assert_eq!(builder.slot(&id).unwrap().state, WidgetState::Loading);
        }

        let _ = get_widget_content(State(state), Path(id)).await;
        let requested = api.requested_filters();
        assert_eq!(requested.last().unwrap().period, Period::Year);
    }

    #[tokio::test]
    async fn save_preset_posts_snapshot_and_refreshes() {
        let (state, api) = state_with(FakeExpenseApi::default());
        state.dashboard.lock().unwrap().add_widget(
            WidgetKind::TrendLine,
            "Trend",
            WidgetSize::Full,
        );

        let response = save_preset(
            State(state),
            Form(SavePresetForm {
                name: "  Move week  ".to_owned(),
                is_default: Some("true".to_owned()),
            }),
        )
        .await;

        assert_status_ok(&response);
        assert_eq!(get_header(&response, "hx-refresh"), "true");
        let created = api.created_presets.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].name, "Move week");
        assert!(created[0].is_default);
        assert_eq!(created[0].config.widgets[0].kind, "trend-line");
    }

    #[tokio::test]
    async fn save_preset_without_name_shows_alert() {
        let (state, api) = state_with(FakeExpenseApi::default());

        let response = save_preset(
            State(state),
            Form(SavePresetForm {
                name: "   ".to_owned(),
                is_default: None,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(api.created_presets.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_preset_replaces_dashboard_content() {
        let (state, _) = state_with(FakeExpenseApi {
            presets: vec![weekly_preset(false)],
            ..Default::default()
        });
        let old = state.dashboard.lock().unwrap().add_widget(
            WidgetKind::CategoryBar,
            "",
            WidgetSize::Medium,
        );

        let response = load_preset(State(state.clone()), Path(7)).await;

        assert_status_ok(&response);
        let html = parse_html_fragment(response).await;
        assert!(
            html.select(&Selector::parse("#dashboard-content #dashboard-filters").unwrap())
                .next()
                .is_some()
        );
        let builder = state.dashboard.lock().unwrap();
        assert!(builder.slot(&old).is_none());
        assert_eq!(builder.slots()[0].widget.title, "Spent this week");
        assert_eq!(builder.filters().period, Period::Week);
    }

    #[tokio::test]
    async fn load_missing_preset_shows_alert_and_keeps_widgets() {
        let (state, _) = state_with(FakeExpenseApi::default());
        state.dashboard.lock().unwrap().add_widget(
            WidgetKind::CategoryBar,
            "",
            WidgetSize::Medium,
        );

        let response = load_preset(State(state.clone()), Path(99)).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(state.dashboard.lock().unwrap().slots().len(), 1);
    }

    #[tokio::test]
    async fn set_default_and_delete_refresh_the_page() {
        let (state, api) = state_with(FakeExpenseApi::default());

        let response = set_default_preset(State(state.clone()), Path(3)).await;
        assert_eq!(get_header(&response, "hx-refresh"), "true");

        let response = delete_preset(State(state), Path(4)).await;
        assert_eq!(get_header(&response, "hx-refresh"), "true");

        assert_eq!(*api.default_preset_ids.lock().unwrap(), [3]);
        assert_eq!(*api.deleted_preset_ids.lock().unwrap(), [4]);
    }
}
