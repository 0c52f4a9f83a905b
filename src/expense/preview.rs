//! The expense preview modal.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    alert::Alert,
    api::FetchError,
    endpoints::backend,
    expense::{
        ExpenseState, backend_expense_url,
        models::{
            Expense, ReimbursementStatus, Tone, format_display_date, non_empty,
            reimbursable_badge, status_badge,
        },
    },
    html::{
        BADGE_STYLE, BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, LINK_STYLE,
        format_currency,
    },
};

const DEFAULT_CATEGORY_COLOR: &str = "#6c757d";
const NOT_SPECIFIED: &str = "Not specified";

pub(super) fn badge(text: &str, tone: Tone) -> Markup {
    html!(
        span class={ (BADGE_STYLE) " " (tone.class()) } { (text) }
    )
}

pub(super) fn category_badge(expense: &Expense) -> Markup {
    match &expense.category {
        Some(category) => {
            let color = category.color.as_deref().unwrap_or(DEFAULT_CATEGORY_COLOR);
            html!(
                span
                    class=(BADGE_STYLE)
                    style={ "background-color: " (color) "; color: #fff;" }
                {
                    (category.name)
                }
            )
        }
        None => badge("Uncategorized", Tone::Secondary),
    }
}

pub(super) fn payment_method_badge(expense: &Expense) -> Markup {
    let name = expense
        .payment_method
        .as_ref()
        .map_or("Unknown", |payment_method| payment_method.name.as_str());

    badge(name, Tone::Info)
}

pub(super) fn reimbursable_view(expense: &Expense) -> Markup {
    let (label, tone) = reimbursable_badge(expense.is_reimbursable, &expense.reimbursement_status);
    badge(label, tone)
}

/// The badge for the reimbursement status, `None` when reimbursement was never requested.
pub(super) fn reimbursement_status_view(status: &ReimbursementStatus) -> Option<Markup> {
    match status {
        ReimbursementStatus::NotRequested => None,
        ReimbursementStatus::Other(text) => Some(badge(text, Tone::Secondary)),
        known => status_badge(known).map(|(label, tone)| badge(label, tone)),
    }
}

pub(super) fn tags_view(expense: &Expense) -> Markup {
    let tags = expense.tag_list();

    html!(
        @if tags.is_empty() {
            span class="text-gray-500 dark:text-gray-400" { "No tags" }
        } @else {
            span class="flex flex-wrap gap-1"
            {
                @for tag in tags {
                    (badge(tag, Tone::Secondary))
                }
            }
        }
    )
}

fn detail_row(label: &str, value: Markup) -> Markup {
    html!(
        div
        {
            dt class="text-sm font-medium text-gray-500 dark:text-gray-400" { (label) }
            dd class="mt-1" { (value) }
        }
    )
}

fn text_or_not_specified(value: &Option<String>) -> Markup {
    html!((non_empty(value).unwrap_or(NOT_SPECIFIED)))
}

fn text_section(heading: &str, text: Option<&str>) -> Markup {
    html!(
        @if let Some(text) = text {
            section class="mt-4"
            {
                h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (heading) }
                p class="mt-1 whitespace-pre-line" { (text) }
            }
        }
    )
}

fn expense_preview_view(expense: &Expense, backend_url: &str) -> Markup {
    let edit_url = backend_expense_url(backend_url, backend::EDIT_EXPENSE, expense.id);
    let delete_url = backend_expense_url(backend_url, backend::DELETE_EXPENSE, expense.id);
    let receipt_url = backend_expense_url(backend_url, backend::EXPENSE_RECEIPT, expense.id);

    html!(
        div
            id="expense-preview"
            class="fixed inset-0 z-40 flex items-center justify-center p-4 bg-gray-900/50"
        {
            div
                role="dialog"
                aria-labelledby="expense-preview-title"
                class="w-full max-w-2xl max-h-full overflow-y-auto p-6 rounded-lg shadow-lg
                    bg-white dark:bg-gray-800 text-gray-900 dark:text-white"
            {
                div class="flex items-start justify-between gap-4 mb-4"
                {
                    div
                    {
                        h2 id="expense-preview-title" class="text-xl font-semibold"
                        {
                            (expense.display_title())
                        }
                        p class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            (format_display_date(expense.date.as_deref()))
                        }
                    }

                    p class="text-2xl font-bold" { (format_currency(expense.amount())) }
                }

                dl class="grid grid-cols-1 sm:grid-cols-2 gap-4"
                {
                    (detail_row("Category", category_badge(expense)))
                    (detail_row("Payment Method", payment_method_badge(expense)))
                    (detail_row("Location", text_or_not_specified(&expense.location)))
                    (detail_row("Vendor", text_or_not_specified(&expense.vendor)))
                    (detail_row("Reimbursable", reimbursable_view(expense)))

                    @if let Some(status) = reimbursement_status_view(&expense.reimbursement_status) {
                        (detail_row("Reimbursement Status", status))
                    }

                    (detail_row("Tags", tags_view(expense)))
                }

                (text_section("Description", non_empty(&expense.description)))
                (text_section("Notes", non_empty(&expense.notes)))
                (text_section("Reimbursement Notes", non_empty(&expense.reimbursement_notes)))

                @if expense.has_receipt {
                    section class="mt-4"
                    {
                        h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { "Receipt" }

                        a
                            id="receipt-link"
                            href=(receipt_url)
                            target="_blank"
                            rel="noopener"
                            class=(LINK_STYLE)
                        {
                            "View Receipt"
                        }

                        img
                            src=(receipt_url)
                            alt="Receipt thumbnail"
                            class="mt-2 max-h-40 rounded border border-gray-200 dark:border-gray-700";
                    }
                }

                p class="mt-4 text-xs text-gray-500 dark:text-gray-400"
                {
                    "Created: " (format_display_date(expense.created_at.as_deref()))
                    " | Updated: " (format_display_date(expense.updated_at.as_deref()))
                }

                div class="flex flex-wrap justify-end gap-2 mt-6"
                {
                    a href=(edit_url) class=(BUTTON_PRIMARY_STYLE) { "Edit" }

                    form
                        method="post"
                        action=(delete_url)
                        onsubmit="return confirm('Are you sure you want to delete this expense?');"
                    {
                        button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }
                    }

                    button
                        type="button"
                        class=(BUTTON_SECONDARY_STYLE)
                        onclick="document.getElementById('expense-preview').remove()"
                    {
                        "Close"
                    }
                }
            }
        }
    )
}

/// Fetch an expense and render the preview modal.
pub async fn get_expense_preview(
    State(state): State<ExpenseState>,
    Path(expense_id): Path<i64>,
) -> Response {
    match state.api.get_expense(expense_id).await {
        Ok(expense) => expense_preview_view(&expense, &state.backend_url).into_response(),
        Err(error) => {
            tracing::error!("Could not load expense {expense_id}: {error}");

            let status = match error {
                FetchError::Status(404) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            };

            (
                status,
                Alert::Error {
                    message: "Error loading expense details".to_owned(),
                    details: state.error_detail.fetch_error_message(&error),
                },
            )
                .into_response()
        }
    }
}
