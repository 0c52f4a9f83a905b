//! Fetching one widget's data without holding the dashboard lock across the request.

use std::sync::Mutex;

use crate::{
    Error,
    api::ExpenseApi,
    dashboard::{
        builder::{DashboardBuilder, FetchOutcome, WidgetSlot},
        data::fetch_payload,
        widget::WidgetId,
    },
};

/// Fetch the data for `widget_id` and apply it to the dashboard.
///
/// Returns the updated slot, or `None` if the widget does not exist or the
/// result went stale while the request was in flight.
///
/// # Errors
/// Returns [Error::DashboardLockError] if the dashboard lock is poisoned.
/// Backend failures are not errors here; they are stored in the slot.
pub async fn refresh_widget(
    dashboard: &Mutex<DashboardBuilder>,
    api: &dyn ExpenseApi,
    widget_id: &WidgetId,
) -> Result<Option<WidgetSlot>, Error> {
    let fetch = {
        let builder = lock(dashboard)?;
        match builder.begin_fetch(widget_id) {
            Some(fetch) => fetch,
            None => return Ok(None),
        }
    };

    let result = fetch_payload(api, fetch.kind, &fetch.filters).await;

    let mut builder = lock(dashboard)?;
    match builder.complete_fetch(&fetch, result) {
        FetchOutcome::Applied => Ok(builder.slot(widget_id).cloned()),
        FetchOutcome::Stale => Ok(None),
    }
}

/// Lock the dashboard, mapping a poisoned lock to [Error::DashboardLockError].
pub fn lock(
    dashboard: &Mutex<DashboardBuilder>,
) -> Result<std::sync::MutexGuard<'_, DashboardBuilder>, Error> {
    dashboard
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire dashboard lock: {error}"))
        .map_err(|_| Error::DashboardLockError)
}
