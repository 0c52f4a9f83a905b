//! An [ExpenseApi] that talks to the PCS backend over HTTP.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::{
    api::{ExpenseApi, FetchError},
    dashboard::{
        data::{ExpenseData, WidgetData},
        filters::{FilterOption, FilterSet},
        preset::{NewPreset, Preset},
        widget::WidgetKind,
    },
    expense::Expense,
};

/// A `reqwest` client bound to the backend's base URL.
#[derive(Debug, Clone)]
pub struct HttpExpenseApi {
    base_url: String,
    client: Client,
}

impl HttpExpenseApi {
    /// Create a client for the backend at `base_url`, e.g. "http://localhost:5000".
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn url_with_query(&self, path: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
        let query = serde_urlencoded::to_string(query)
            .map_err(|error| FetchError::Request(error.to_string()))?;

        Ok(format!("{}?{}", self.url(path), query))
    }

    /// Send `request` and fail on transport errors and non-2xx statuses.
    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, FetchError> {
        let response = request
            .send()
            .await
            .inspect_err(|error| tracing::error!("Request to the expense backend failed: {error}"))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                "The expense backend responded to {} with {status}",
                response.url().path()
            );
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        let response = self.send(self.client.get(url)).await?;
        let body = response.bytes().await?;

        serde_json::from_slice(&body)
            .inspect_err(|error| tracing::error!("Could not decode backend response: {error}"))
            .map_err(FetchError::from)
    }
}

#[async_trait]
impl ExpenseApi for HttpExpenseApi {
    async fn expense_data(&self, filters: &FilterSet) -> Result<ExpenseData, FetchError> {
        let url = self.url_with_query("/api/expense_data", &filters.to_query_pairs())?;
        self.get_json(url).await
    }

    async fn widget_data(
        &self,
        filters: &FilterSet,
        kind: WidgetKind,
    ) -> Result<WidgetData, FetchError> {
        let mut query = filters.to_query_pairs();
        query.push(("type", kind.as_str().to_owned()));

        let url = self.url_with_query("/api/widgets/data", &query)?;
        let body: Value = self.get_json(url).await?;

        WidgetData::from_json(kind, body)
            .inspect_err(|error| tracing::error!("Could not read {kind} widget data: {error}"))
    }

    async fn categories(&self) -> Result<Vec<FilterOption>, FetchError> {
        self.get_json(self.url("/api/categories")).await
    }

    async fn payment_methods(&self) -> Result<Vec<FilterOption>, FetchError> {
        self.get_json(self.url("/api/payment_methods")).await
    }

    async fn list_presets(&self) -> Result<Vec<Preset>, FetchError> {
        self.get_json(self.url("/api/dashboard/presets")).await
    }

    async fn get_preset(&self, preset_id: i64) -> Result<Preset, FetchError> {
        self.get_json(self.url(&format!("/api/dashboard/presets/{preset_id}")))
            .await
    }

    async fn create_preset(&self, preset: &NewPreset) -> Result<(), FetchError> {
        let request = self
            .client
            .post(self.url("/api/dashboard/presets"))
            .json(preset);

        self.send(request).await.map(|_| ())
    }

    async fn set_default_preset(&self, preset_id: i64) -> Result<(), FetchError> {
        let request = self
            .client
            .put(self.url(&format!("/api/dashboard/presets/{preset_id}")))
            .json(&json!({ "is_default": true }));

        self.send(request).await.map(|_| ())
    }

    async fn delete_preset(&self, preset_id: i64) -> Result<(), FetchError> {
        let request = self
            .client
            .delete(self.url(&format!("/api/dashboard/presets/{preset_id}")));

        self.send(request).await.map(|_| ())
    }

    async fn get_expense(&self, expense_id: i64) -> Result<Expense, FetchError> {
        self.get_json(self.url(&format!("/api/expense/{expense_id}")))
            .await
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>, FetchError> {
        self.get_json(self.url("/api/expenses")).await
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::SocketAddr,
        sync::{Arc, Mutex},
    };

    use axum::{
        Json, Router,
        extract::{Path, RawQuery},
        http::StatusCode,
        routing::{get, put},
    };
    use serde_json::{Value, json};

    use crate::{
        api::{ExpenseApi, FetchError, HttpExpenseApi},
        dashboard::{
            data::WidgetData,
            filters::{FilterSet, Period},
            preset::{NewPreset, PresetConfig},
            widget::WidgetKind,
        },
        expense::models::Reimbursable,
    };

    /// Serve `router` on an ephemeral local port and return its address.
    async fn spawn_backend(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        address
    }

    fn client_for(address: SocketAddr) -> HttpExpenseApi {
        HttpExpenseApi::new(&format!("http://{address}/"))
    }

    #[tokio::test]
    async fn sends_filters_as_query_string() {
        let seen_query = Arc::new(Mutex::new(None));
        let seen = seen_query.clone();
        let router = Router::new().route(
            "/api/expense_data",
            get(move |RawQuery(query): RawQuery| {
                let seen = seen.clone();
                async move {
                    *seen.lock().unwrap() = query;
                    Json(json!({ "expense_count": 2, "total_expenses": 30.0 }))
                }
            }),
        );
        let api = client_for(spawn_backend(router).await);
        let filters = FilterSet {
            period: Period::Week,
            categories: Some(vec![1, 2]),
            ..Default::default()
        };

        let data = api.expense_data(&filters).await.unwrap();

        assert_eq!(data.expense_count, 2);
        assert_eq!(data.total_expenses, 30.0);
        assert_eq!(
            seen_query.lock().unwrap().as_deref(),
            Some("period=week&categories%5B%5D=1&categories%5B%5D=2")
        );
    }

    #[tokio::test]
    async fn widget_data_sends_type_and_parses_by_kind() {
        let router = Router::new().route(
            "/api/widgets/data",
            get(|RawQuery(query): RawQuery| async move {
                let query = query.unwrap_or_default();
                if query.ends_with("type=pending-reimbursements") {
                    Json(json!({ "count": 4, "total": 99.5 }))
                } else {
                    Json(json!({ "error": query }))
                }
            }),
        );
        let api = client_for(spawn_backend(router).await);

        let data = api
            .widget_data(&FilterSet::default(), WidgetKind::PendingReimbursements)
            .await
            .unwrap();

        assert_eq!(
            data,
            WidgetData::Pending {
                count: 4,
                total: 99.5
            }
        );
    }

    #[tokio::test]
    async fn non_success_status_is_status_error() {
        let router = Router::new().route(
            "/api/expense/{expense_id}",
            get(|| async { StatusCode::NOT_FOUND }),
        );
        let api = client_for(spawn_backend(router).await);

        let result = api.get_expense(12).await;

        assert_eq!(result, Err(FetchError::Status(404)));
    }

    #[tokio::test]
    async fn invalid_json_is_decode_error() {
        let router = Router::new().route("/api/categories", get(|| async { "not json" }));
        let api = client_for(spawn_backend(router).await);

        let result = api.categories().await;

        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn unreachable_backend_is_request_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        let api = client_for(address);

        let result = api.list_presets().await;

        assert!(matches!(result, Err(FetchError::Request(_))));
    }

    #[tokio::test]
    async fn reads_expense() {
        let router = Router::new().route(
            "/api/expense/{expense_id}",
            get(|Path(expense_id): Path<i64>| async move {
                Json(json!({ "id": expense_id, "title": "Movers tip", "is_reimbursable": "yes" }))
            }),
        );
        let api = client_for(spawn_backend(router).await);

        let expense = api.get_expense(5).await.unwrap();

        assert_eq!(expense.id, 5);
        assert_eq!(expense.display_title(), "Movers tip");
        assert_eq!(expense.is_reimbursable, Reimbursable::Yes);
    }

    #[tokio::test]
    async fn preset_writes_send_expected_bodies() {
        let bodies = Arc::new(Mutex::new(Vec::<Value>::new()));
        let created = bodies.clone();
        let updated = bodies.clone();
        let router = Router::new()
            .route(
                "/api/dashboard/presets",
                axum::routing::post(move |Json(body): Json<Value>| {
                    let created = created.clone();
                    async move {
                        created.lock().unwrap().push(body);
                        (StatusCode::CREATED, Json(json!({ "id": 1 })))
                    }
                }),
            )
            .route(
                "/api/dashboard/presets/{preset_id}",
                put(move |Json(body): Json<Value>| {
                    let updated = updated.clone();
                    async move {
                        updated.lock().unwrap().push(body);
                        Json(json!({ "success": true }))
                    }
                })
                .delete(|| async { StatusCode::NO_CONTENT }),
            );
        let api = client_for(spawn_backend(router).await);
        let preset = NewPreset::new(
            "Weekly",
            false,
            PresetConfig::default(),
            FilterSet::default(),
        )
        .unwrap();

        api.create_preset(&preset).await.unwrap();
        api.set_default_preset(3).await.unwrap();
        api.delete_preset(3).await.unwrap();

        let bodies = bodies.lock().unwrap();
        assert_eq!(bodies[0]["name"], "Weekly");
        assert_eq!(bodies[0]["config"]["layout"], "grid");
        assert_eq!(bodies[1], json!({ "is_default": true }));
    }
}
