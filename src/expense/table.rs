//! The expense table page.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    endpoints::{self, backend, format_endpoint},
    expense::{
        ExpenseState, backend_expense_url,
        columns::{ColumnKey, ColumnPreferences, column_visibility_style, load_column_preferences},
        models::{Expense, format_display_date, non_empty},
        preview::{
            category_badge, payment_method_badge, reimbursable_view, reimbursement_status_view,
            tags_view,
        },
    },
    html::{
        BUTTON_SECONDARY_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
};

/// Display the expense table with the stored column preferences applied.
pub async fn get_expenses_page(State(state): State<ExpenseState>) -> Result<Response, Error> {
    let preferences = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        load_column_preferences(&connection)?
    };

    let expenses = state
        .api
        .list_expenses()
        .await
        .inspect_err(|error| tracing::error!("Could not fetch expenses: {error}"))?;

    Ok(expenses_view(&expenses, &preferences, &state.backend_url).into_response())
}

fn cell_text(value: Option<&str>) -> Markup {
    html!((value.unwrap_or("-")))
}

fn expense_cell(key: ColumnKey, expense: &Expense, backend_url: &str) -> Markup {
    match key {
        ColumnKey::Date => html!((format_display_date(expense.date.as_deref()))),
        ColumnKey::Title => html!((expense.display_title())),
        ColumnKey::Description => cell_text(non_empty(&expense.description)),
        ColumnKey::Category => category_badge(expense),
        ColumnKey::Payment => payment_method_badge(expense),
        ColumnKey::Amount => html!((format_currency(expense.amount()))),
        ColumnKey::Location => cell_text(non_empty(&expense.location)),
        ColumnKey::Vendor => cell_text(non_empty(&expense.vendor)),
        ColumnKey::Notes => cell_text(non_empty(&expense.notes)),
        ColumnKey::Tags => tags_view(expense),
        ColumnKey::Reimbursable => reimbursable_view(expense),
        ColumnKey::ReimbursementStatus => reimbursement_status_view(&expense.reimbursement_status)
            .unwrap_or_else(|| cell_text(None)),
        ColumnKey::ReimbursementNotes => cell_text(non_empty(&expense.reimbursement_notes)),
        ColumnKey::Receipt => {
            if expense.has_receipt {
                let receipt_url =
                    backend_expense_url(backend_url, backend::EXPENSE_RECEIPT, expense.id);
                html!(
                    a href=(receipt_url) target="_blank" rel="noopener" class=(LINK_STYLE)
                    {
                        "View"
                    }
                )
            } else {
                cell_text(None)
            }
        }
        ColumnKey::CreatedAt => html!((format_display_date(expense.created_at.as_deref()))),
        ColumnKey::UpdatedAt => html!((format_display_date(expense.updated_at.as_deref()))),
        ColumnKey::Actions => html!(
            button
                type="button"
                class=(LINK_STYLE)
                hx-get=(format_endpoint(endpoints::EXPENSE_PREVIEW, expense.id))
                hx-target="#modal-container"
                hx-target-error="#alert-container"
                hx-swap="innerHTML"
            {
                "Preview"
            }
        ),
    }
}

fn expenses_view(
    expenses: &[Expense],
    preferences: &ColumnPreferences,
    backend_url: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();
    let columns: Vec<ColumnKey> = preferences.ordered().into_iter().map(|(key, _)| key).collect();

    let content = html!(
        (nav_bar)

        (column_visibility_style(preferences))

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="flex w-full items-center justify-between mb-4"
            {
                h1 class="text-2xl font-bold" { "Expenses" }

                button
                    type="button"
                    class=(BUTTON_SECONDARY_STYLE)
                    hx-get=(endpoints::EXPENSE_COLUMNS)
                    hx-target="#modal-container"
                    hx-target-error="#alert-container"
                    hx-swap="innerHTML"
                {
                    "Customize Columns"
                }
            }

            div class="w-full overflow-x-auto shadow-md rounded-lg"
            {
                table
                    id="expense-table"
                    class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            @for key in &columns {
                                th scope="col" class=(TABLE_CELL_STYLE) data-column-key=(key.as_str())
                                {
                                    (key.label())
                                }
                            }
                        }
                    }

                    tbody
                    {
                        @for expense in expenses {
                            tr class=(TABLE_ROW_STYLE) data-expense-id=(expense.id)
                            {
                                @for key in &columns {
                                    td class=(TABLE_CELL_STYLE) data-column-key=(key.as_str())
                                    {
                                        (expense_cell(*key, expense, backend_url))
                                    }
                                }
                            }
                        }

                        @if expenses.is_empty() {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td colspan=(columns.len()) class={ (TABLE_CELL_STYLE) " text-center" }
                                {
                                    "No expenses recorded yet."
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Expenses", &[], &content)
}
