//! Which columns of the expense table are shown, stored as a local preference.
//!
//! Table cells carry a `data-column-key` attribute and hidden columns are
//! removed with a generated style rule, so a column is always found by its key
//! rather than its position.

use std::{
    collections::{BTreeMap, HashSet},
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, PreEscaped, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    alert::Alert,
    db::{get_preference, set_preference},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_CHECKBOX_STYLE},
};

/// The preference key the column map is stored under.
pub const COLUMN_PREFERENCE_KEY: &str = "expenseTableColumns";

/// The columns of the expense table, in default order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKey {
    Date,
    Title,
    Description,
    Category,
    Payment,
    Amount,
    Location,
    Vendor,
    Notes,
    Tags,
    Reimbursable,
    ReimbursementStatus,
    ReimbursementNotes,
    Receipt,
    CreatedAt,
    UpdatedAt,
    Actions,
}

impl ColumnKey {
    pub const ALL: [ColumnKey; 17] = [
        ColumnKey::Date,
        ColumnKey::Title,
        ColumnKey::Description,
        ColumnKey::Category,
        ColumnKey::Payment,
        ColumnKey::Amount,
        ColumnKey::Location,
        ColumnKey::Vendor,
        ColumnKey::Notes,
        ColumnKey::Tags,
        ColumnKey::Reimbursable,
        ColumnKey::ReimbursementStatus,
        ColumnKey::ReimbursementNotes,
        ColumnKey::Receipt,
        ColumnKey::CreatedAt,
        ColumnKey::UpdatedAt,
        ColumnKey::Actions,
    ];

    /// The key used in the stored map and the `data-column-key` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnKey::Date => "date",
            ColumnKey::Title => "title",
            ColumnKey::Description => "description",
            ColumnKey::Category => "category",
            ColumnKey::Payment => "payment",
            ColumnKey::Amount => "amount",
            ColumnKey::Location => "location",
            ColumnKey::Vendor => "vendor",
            ColumnKey::Notes => "notes",
            ColumnKey::Tags => "tags",
            ColumnKey::Reimbursable => "reimbursable",
            ColumnKey::ReimbursementStatus => "reimbursement_status",
            ColumnKey::ReimbursementNotes => "reimbursement_notes",
            ColumnKey::Receipt => "receipt",
            ColumnKey::CreatedAt => "created_at",
            ColumnKey::UpdatedAt => "updated_at",
            ColumnKey::Actions => "actions",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColumnKey::Date => "Date",
            ColumnKey::Title => "Title",
            ColumnKey::Description => "Description",
            ColumnKey::Category => "Category",
            ColumnKey::Payment => "Payment Method",
            ColumnKey::Amount => "Amount",
            ColumnKey::Location => "Location",
            ColumnKey::Vendor => "Vendor",
            ColumnKey::Notes => "Notes",
            ColumnKey::Tags => "Tags",
            ColumnKey::Reimbursable => "Reimbursable",
            ColumnKey::ReimbursementStatus => "Reimbursement Status",
            ColumnKey::ReimbursementNotes => "Reimbursement Notes",
            ColumnKey::Receipt => "Receipt",
            ColumnKey::CreatedAt => "Created",
            ColumnKey::UpdatedAt => "Updated",
            ColumnKey::Actions => "Actions",
        }
    }

    /// Fixed columns cannot be hidden.
    pub fn is_fixed(self) -> bool {
        self == ColumnKey::Actions
    }

    fn visible_by_default(self) -> bool {
        matches!(
            self,
            ColumnKey::Date
                | ColumnKey::Title
                | ColumnKey::Category
                | ColumnKey::Payment
                | ColumnKey::Amount
                | ColumnKey::Reimbursable
                | ColumnKey::Receipt
                | ColumnKey::Actions
        )
    }

    fn default_order(self) -> u32 {
        ColumnKey::ALL
            .iter()
            .position(|key| *key == self)
            .map_or(u32::MAX, |index| index as u32 + 1)
    }

    fn parse(text: &str) -> Option<Self> {
        ColumnKey::ALL.into_iter().find(|key| key.as_str() == text)
    }
}

/// The stored settings for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnPreference {
    pub label: String,
    pub visible: bool,
    pub order: u32,
    #[serde(skip_serializing_if = "is_false")]
    pub fixed: bool,
}

fn is_false(value: &bool) -> bool {
    !value
}

impl ColumnPreference {
    fn default_for(key: ColumnKey) -> Self {
        Self {
            label: key.label().to_owned(),
            visible: key.visible_by_default(),
            order: key.default_order(),
            fixed: key.is_fixed(),
        }
    }
}

/// A column entry as read from storage. Every field is optional so that
/// partial entries written by older versions still load.
#[derive(Debug, Deserialize)]
struct StoredColumn {
    #[serde(default)]
    visible: Option<bool>,
    #[serde(default)]
    order: Option<u32>,
}

/// The visibility and order of every column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColumnPreferences(BTreeMap<ColumnKey, ColumnPreference>);

impl Default for ColumnPreferences {
    fn default() -> Self {
        Self(
            ColumnKey::ALL
                .into_iter()
                .map(|key| (key, ColumnPreference::default_for(key)))
                .collect(),
        )
    }
}

impl ColumnPreferences {
    /// Read a stored map, filling missing columns from the defaults.
    ///
    /// Unknown keys are ignored and fixed columns are always visible.
    ///
    /// # Errors
    /// Returns an error if `json` is not a JSON object of column entries.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let stored: BTreeMap<String, StoredColumn> = serde_json::from_str(json)?;
        let mut preferences = Self::default();

        for (key, column) in stored {
            let Some(key) = ColumnKey::parse(&key) else {
                continue;
            };

            if let Some(preference) = preferences.0.get_mut(&key) {
                if let Some(visible) = column.visible {
                    preference.visible = visible || key.is_fixed();
                }
                if let Some(order) = column.order {
                    preference.order = order;
                }
            }
        }

        Ok(preferences)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))
    }

    /// Show exactly the columns in `visible`. Fixed columns stay visible.
    pub fn set_visible(&mut self, visible: &HashSet<ColumnKey>) {
        for (key, preference) in self.0.iter_mut() {
            preference.visible = key.is_fixed() || visible.contains(key);
        }
    }

    pub fn is_visible(&self, key: ColumnKey) -> bool {
        self.0.get(&key).is_none_or(|preference| preference.visible)
    }

    /// The columns sorted by their display order.
    pub fn ordered(&self) -> Vec<(ColumnKey, &ColumnPreference)> {
        let mut columns: Vec<_> = self.0.iter().map(|(key, pref)| (*key, pref)).collect();
        columns.sort_by_key(|(key, preference)| (preference.order, *key));
        columns
    }

    /// The hidden columns in display order.
    pub fn hidden(&self) -> Vec<ColumnKey> {
        self.ordered()
            .into_iter()
            .filter(|(_, preference)| !preference.visible)
            .map(|(key, _)| key)
            .collect()
    }
}

/// Load the column preferences.
///
/// Falls back to the defaults if nothing is stored, or if the stored value
/// cannot be read, in which case a warning is logged.
pub fn load_column_preferences(connection: &Connection) -> Result<ColumnPreferences, Error> {
    let Some(json) = get_preference(COLUMN_PREFERENCE_KEY, connection)? else {
        return Ok(ColumnPreferences::default());
    };

    match ColumnPreferences::from_json(&json) {
        Ok(preferences) => Ok(preferences),
        Err(error) => {
            tracing::warn!("Discarding malformed column preferences: {error}");
            Ok(ColumnPreferences::default())
        }
    }
}

/// Store the whole column map.
pub fn save_column_preferences(
    preferences: &ColumnPreferences,
    connection: &Connection,
) -> Result<(), Error> {
    set_preference(COLUMN_PREFERENCE_KEY, &preferences.to_json()?, connection)
}

/// Store and return the default column map.
pub fn reset_column_preferences(connection: &Connection) -> Result<ColumnPreferences, Error> {
    let preferences = ColumnPreferences::default();
    save_column_preferences(&preferences, connection)?;
    Ok(preferences)
}

/// The style element that hides every invisible column.
pub fn column_visibility_style(preferences: &ColumnPreferences) -> Markup {
    html!(
        style id="column-visibility" { (hidden_columns_css(preferences)) }
    )
}

/// [column_visibility_style] as an out-of-band swap.
fn column_visibility_style_oob(preferences: &ColumnPreferences) -> Markup {
    html!(
        style id="column-visibility" hx-swap-oob="true" { (hidden_columns_css(preferences)) }
    )
}

fn hidden_columns_css(preferences: &ColumnPreferences) -> PreEscaped<String> {
    // Keys are lowercase ASCII identifiers, so they are safe inside a style element.
    let css = preferences
        .hidden()
        .into_iter()
        .map(|key| format!("[data-column-key=\"{}\"] {{ display: none; }}", key.as_str()))
        .collect::<Vec<_>>()
        .join("\n");

    PreEscaped(css)
}

/// The dialog for choosing which columns are shown.
fn column_dialog(preferences: &ColumnPreferences) -> Markup {
    html!(
        div
            id="column-dialog"
            class="fixed inset-0 z-40 flex items-center justify-center bg-gray-900/50"
        {
            div
                role="dialog"
                aria-labelledby="column-dialog-title"
                class="w-full max-w-md p-6 rounded-lg shadow-lg bg-white dark:bg-gray-800
                    text-gray-900 dark:text-white"
            {
                h2 id="column-dialog-title" class="text-xl font-semibold mb-2"
                {
                    "Customize Table Columns"
                }

                p class="text-sm text-gray-600 dark:text-gray-400 mb-4"
                {
                    "Select which columns to display in the expense table:"
                }

                form
                    hx-post=(endpoints::EXPENSE_COLUMNS)
                    hx-target="#modal-container"
                    hx-target-error="#alert-container"
                    hx-swap="innerHTML"
                {
                    div class="flex flex-col gap-2 max-h-96 overflow-y-auto mb-4"
                    {
                        @for (key, preference) in preferences.ordered() {
                            label class="flex items-center gap-2"
                            {
                                input
                                    type="checkbox"
                                    id={ "column-" (key.as_str()) }
                                    name="columns"
                                    value=(key.as_str())
                                    checked[preference.visible]
                                    disabled[preference.fixed]
                                    class=(FORM_CHECKBOX_STYLE);

                                (preference.label)

                                @if preference.fixed {
                                    small class="text-gray-500 dark:text-gray-400" { "(Required)" }
                                }
                            }
                        }
                    }

                    div class="flex flex-wrap justify-end gap-2"
                    {
                        button
                            type="button"
                            class=(BUTTON_SECONDARY_STYLE)
                            onclick="document.getElementById('column-dialog').remove()"
                        {
                            "Cancel"
                        }

                        button
                            type="button"
                            class=(BUTTON_SECONDARY_STYLE)
                            hx-post=(endpoints::EXPENSE_COLUMNS_RESET)
                            hx-target="#modal-container"
                            hx-target-error="#alert-container"
                            hx-swap="innerHTML"
                        {
                            "Reset to Defaults"
                        }

                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Preferences" }
                    }
                }
            }
        }
    )
}

/// The state needed for the column preference handlers.
#[derive(Debug, Clone)]
pub struct ColumnState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ColumnState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The column dialog form. Unchecked and disabled checkboxes are not sent.
#[derive(Debug, Default, Deserialize)]
pub struct ColumnForm {
    #[serde(default)]
    pub columns: Vec<String>,
}

/// Show the column dialog seeded from the stored preferences.
pub async fn get_column_dialog(State(state): State<ColumnState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match load_column_preferences(&connection) {
        Ok(preferences) => column_dialog(&preferences).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Save the checked columns, close the dialog and re-apply the visibility style.
pub async fn save_columns(
    State(state): State<ColumnState>,
    Form(form): Form<ColumnForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let mut preferences = match load_column_preferences(&connection) {
        Ok(preferences) => preferences,
        Err(error) => return error.into_alert_response(),
    };

    let visible: HashSet<ColumnKey> = form
        .columns
        .iter()
        .filter_map(|key| ColumnKey::parse(key))
        .collect();
    preferences.set_visible(&visible);

    if let Err(error) = save_column_preferences(&preferences, &connection) {
        tracing::error!("Could not save column preferences: {error}");
        return error.into_alert_response();
    }

    html!(
        (column_visibility_style_oob(&preferences))
        (Alert::SuccessSimple {
            message: "Column preferences saved".to_owned(),
        }
        .oob())
    )
    .into_response()
}

/// Restore the default columns, close the dialog and re-apply the visibility style.
pub async fn reset_columns(State(state): State<ColumnState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match reset_column_preferences(&connection) {
        Ok(preferences) => html!(
            (column_visibility_style_oob(&preferences))
            (Alert::Info {
                message: "Column preferences reset to defaults".to_owned(),
            }
            .oob())
        )
        .into_response(),
        Err(error) => {
            tracing::error!("Could not reset column preferences: {error}");
            error.into_alert_response()
        }
    }
}
