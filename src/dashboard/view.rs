//! HTML views for the dashboard builder.

use maud::{Markup, PreEscaped, html};

use crate::{
    api::FetchError,
    dashboard::{
        builder::{DashboardBuilder, WidgetSlot, WidgetState},
        charts::{chart_view, widget_chart},
        data::{ExpenseData, RecentExpense, WidgetData, WidgetPayload},
        filters::{FilterOption, FilterSet, Period, StatusFilter},
        preset::Preset,
        widget::{Rendering, WidgetKind},
    },
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, ErrorDetail,
        FORM_CHECKBOX_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
        loading_spinner,
    },
    navigation::NavBar,
};

pub(super) const EMPTY_STATE_TEXT: &str = "Drag widgets from the left panel to build your dashboard";

const ECHARTS_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// The number of categories shown by the top categories widget.
const TOP_CATEGORY_COUNT: usize = 5;

const PANEL_STYLE: &str = "flex flex-col rounded-lg bg-white dark:bg-gray-800 \
    border border-gray-200 dark:border-gray-700 shadow-sm";

const ICON_BUTTON_STYLE: &str = "px-2 py-1 text-xs font-medium rounded \
    text-gray-600 hover:bg-gray-100 dark:text-gray-300 dark:hover:bg-gray-700";

/// Render the full dashboard page.
pub(super) fn dashboard_page(
    builder: &DashboardBuilder,
    presets: &[Preset],
    error_detail: ErrorDetail,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div
            class="px-2 lg:px-6 py-6 mx-auto max-w-screen-2xl text-gray-900 dark:text-white"
        {
            h1 class="text-2xl font-bold mb-4" { "Dashboard Builder" }

            (preset_bar(presets))

            div class="grid grid-cols-1 lg:grid-cols-5 gap-4"
            {
                aside class="lg:col-span-1" { (widget_palette()) }

                div class="lg:col-span-4"
                {
                    (dashboard_content(builder, error_detail))
                }
            }
        }
    );

    let head_elements = [
        HeadElement::ScriptLink(ECHARTS_URL.to_owned()),
        HeadElement::ScriptSource(PreEscaped(dashboard_script())),
    ];

    base("Dashboard", &head_elements, &content)
}

/// The filter form and widget grid, swapped as a unit when a preset is loaded.
pub(super) fn dashboard_content(builder: &DashboardBuilder, error_detail: ErrorDetail) -> Markup {
    html!(
        div id="dashboard-content" class="flex flex-col gap-4"
        {
            (filter_form(builder))
            (widget_grid(builder, error_detail))
        }
    )
}

fn preset_bar(presets: &[Preset]) -> Markup {
    html!(
        section
            id="preset-bar"
            class="flex flex-col lg:flex-row gap-4 mb-4 p-4 rounded-lg bg-white
                dark:bg-gray-800 border border-gray-200 dark:border-gray-700"
        {
            div class="flex flex-wrap items-end gap-2"
            {
                div
                {
                    label for="preset-select" class=(FORM_LABEL_STYLE) { "Preset" }

                    select id="preset-select" name="preset_id" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" { "Select a preset" }

                        @for preset in presets {
                            option value=(preset.id) selected[preset.is_default]
                            {
                                (preset.name)
                                @if preset.is_default { " (Default)" }
                            }
                        }
                    }
                }

                button
                    type="button"
                    class=(BUTTON_SECONDARY_STYLE)
                    data-method="POST"
                    data-endpoint=(endpoints::DASHBOARD_PRESET_LOAD)
                    data-target="#dashboard-content"
                    data-swap="outerHTML"
                    hx-target-error="#alert-container"
                    onclick="runPresetAction(this)"
                {
                    "Load"
                }

                button
                    type="button"
                    class=(BUTTON_SECONDARY_STYLE)
                    data-method="PUT"
                    data-endpoint=(endpoints::DASHBOARD_PRESET_DEFAULT)
                    hx-target-error="#alert-container"
                    onclick="runPresetAction(this)"
                {
                    "Set Default"
                }

                button
                    type="button"
                    class=(BUTTON_DELETE_STYLE)
                    data-method="DELETE"
                    data-endpoint=(endpoints::DASHBOARD_PRESET)
                    data-confirm="Are you sure you want to delete this preset?"
                    hx-target-error="#alert-container"
                    onclick="runPresetAction(this)"
                {
                    "Delete"
                }
            }

            form
                id="save-preset-form"
                hx-post=(endpoints::DASHBOARD_PRESETS)
                hx-swap="none"
                hx-target-error="#alert-container"
                class="flex flex-wrap items-end gap-2 lg:ml-auto"
            {
                div
                {
                    label for="preset-name" class=(FORM_LABEL_STYLE) { "Save current layout as" }

                    input
                        id="preset-name"
                        type="text"
                        name="name"
                        placeholder="Preset name"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                label class="flex items-center gap-2 mb-2 text-sm"
                {
                    input
                        type="checkbox"
                        name="is_default"
                        value="true"
                        class=(FORM_CHECKBOX_STYLE);
                    "Default"
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Preset" }
            }
        }
    )
}

fn widget_palette() -> Markup {
    html!(
        section
            id="widget-palette"
            class="p-4 rounded-lg bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700"
        {
            h2 class="text-lg font-semibold mb-3" { "Widgets" }

            ul class="flex flex-col gap-2"
            {
                @for kind in WidgetKind::ALL {
                    li
                        draggable="true"
                        data-widget-type=(kind.as_str())
                        class="flex items-center justify-between gap-2 px-3 py-2 rounded
                            cursor-grab bg-gray-50 dark:bg-gray-700 hover:bg-gray-100
                            dark:hover:bg-gray-600 text-sm"
                    {
                        span { (kind.default_title()) }

                        button
                            type="button"
                            class=(ICON_BUTTON_STYLE)
                            aria-label={ "Add " (kind.default_title()) }
                            hx-post=(endpoints::DASHBOARD_WIDGETS)
                            hx-vals=(format!(r#"{{"kind":"{}"}}"#, kind.as_str()))
                            hx-target="#dashboard-preview"
                            hx-target-error="#alert-container"
                            hx-swap="outerHTML"
                        {
                            "+"
                        }
                    }
                }
            }
        }
    )
}

fn option_checkboxes(
    name: &str,
    options: &[FilterOption],
    is_checked: impl Fn(i64) -> bool,
) -> Markup {
    html!(
        @if options.is_empty() {
            p class="text-sm text-gray-500 dark:text-gray-400" { "None available" }
        }

        @for option in options {
            label class="flex items-center gap-2 text-sm"
            {
                input
                    type="checkbox"
                    name=(name)
                    value=(option.id)
                    checked[is_checked(option.id)]
                    class=(FORM_CHECKBOX_STYLE);
                (option.name)
            }
        }
    )
}

fn amount_value(amount: Option<f64>) -> String {
    amount.map(|amount| amount.to_string()).unwrap_or_default()
}

fn filter_form(builder: &DashboardBuilder) -> Markup {
    let filters: &FilterSet = builder.filters();
    let options = builder.filter_options();

    html!(
        form
            id="dashboard-filters"
            hx-post=(endpoints::DASHBOARD_FILTERS)
            hx-target="#dashboard-preview"
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            hx-trigger="change, submit"
            class="p-4 rounded-lg bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700"
        {
            div class="grid grid-cols-1 md:grid-cols-2 xl:grid-cols-4 gap-4"
            {
                div
                {
                    label for="filter-period" class=(FORM_LABEL_STYLE) { "Period" }

                    select id="filter-period" name="period" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for period in Period::ALL {
                            option value=(period.as_str()) selected[filters.period == period]
                            {
                                (period.label())
                            }
                        }
                    }
                }

                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Categories" }

                    div class="flex flex-col gap-1 max-h-32 overflow-y-auto"
                    {
                        (option_checkboxes("categories", &options.categories, |id| {
                            filters.includes_category(id)
                        }))
                    }
                }

                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Payment Methods" }

                    div class="flex flex-col gap-1 max-h-32 overflow-y-auto"
                    {
                        (option_checkboxes("payment_methods", &options.payment_methods, |id| {
                            filters.includes_payment_method(id)
                        }))
                    }
                }

                div class="flex flex-col gap-2"
                {
                    label class="flex items-center gap-2 text-sm"
                    {
                        input
                            type="checkbox"
                            name="reimbursable_only"
                            value="true"
                            checked[filters.reimbursable_only]
                            class=(FORM_CHECKBOX_STYLE);
                        "Reimbursable only"
                    }

                    div
                    {
                        label for="filter-status" class=(FORM_LABEL_STYLE) { "Reimbursement Status" }

                        select
                            id="filter-status"
                            name="reimbursement_status"
                            class=(FORM_TEXT_INPUT_STYLE)
                        {
                            option value="all" selected[filters.reimbursement_status.is_none()]
                            {
                                "All"
                            }

                            @for status in StatusFilter::ALL {
                                option
                                    value=(status.as_str())
                                    selected[filters.reimbursement_status == Some(status)]
                                {
                                    (status.label())
                                }
                            }
                        }
                    }

                    div class="flex gap-2"
                    {
                        input
                            type="number"
                            name="min_amount"
                            step="0.01"
                            placeholder="Min"
                            aria-label="Minimum amount"
                            value=(amount_value(filters.min_amount))
                            class=(FORM_TEXT_INPUT_STYLE);

                        input
                            type="number"
                            name="max_amount"
                            step="0.01"
                            placeholder="Max"
                            aria-label="Maximum amount"
                            value=(amount_value(filters.max_amount))
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }
            }
        }
    )
}

/// Render the widget grid, or the empty-state placeholder when there are no widgets.
pub(super) fn widget_grid(builder: &DashboardBuilder, error_detail: ErrorDetail) -> Markup {
    html!(
        div
            id="dashboard-preview"
            hx-target-error="#alert-container"
            class="grid grid-cols-4 gap-4 min-h-64 p-4 rounded-lg border-2 border-dashed
                border-gray-300 dark:border-gray-600"
        {
            @if builder.is_empty() {
                div
                    id="dashboard-empty-state"
                    class="col-span-4 flex items-center justify-center text-gray-500
                        dark:text-gray-400"
                {
                    p { (EMPTY_STATE_TEXT) }
                }
            }

            @for slot in builder.slots() {
                (widget_panel(slot, error_detail))
            }
        }
    )
}

fn widget_panel(slot: &WidgetSlot, error_detail: ErrorDetail) -> Markup {
    let widget = &slot.widget;
    let widget_id = widget.id.as_str();
    let content_id = format!("{widget_id}-content");

    html!(
        div
            id=(widget_id)
            data-widget-type=(widget.kind.as_str())
            data-widget-size=(widget.size.as_str())
            class={ (PANEL_STYLE) " " (widget.size.grid_class()) }
        {
            div
                class="flex items-center justify-between px-4 py-2 border-b
                    border-gray-200 dark:border-gray-700"
            {
                h3 class="font-semibold" { (widget.title) }

                div class="flex gap-1"
                {
                    button
                        type="button"
                        class=(ICON_BUTTON_STYLE)
                        title="Resize"
                        hx-post=(format_endpoint(endpoints::DASHBOARD_WIDGET_RESIZE, widget_id))
                        hx-target="#dashboard-preview"
                        hx-swap="outerHTML"
                    {
                        "Resize"
                    }

                    button
                        type="button"
                        class=(ICON_BUTTON_STYLE)
                        title="Remove"
                        hx-delete=(format_endpoint(endpoints::DASHBOARD_WIDGET, widget_id))
                        hx-target="#dashboard-preview"
                        hx-swap="outerHTML"
                    {
                        "Remove"
                    }
                }
            }

            @match &slot.state {
                WidgetState::Loading => {
                    div
                        id=(content_id)
                        class="p-4"
                        hx-get=(format_endpoint(endpoints::DASHBOARD_WIDGET_CONTENT, widget_id))
                        hx-trigger="load"
                        hx-swap="innerHTML"
                    {
                        (loading_spinner())
                    }
                }
                _ => {
                    div id=(content_id) class="p-4"
                    {
                        (widget_content(slot, error_detail))
                    }
                }
            }
        }
    )
}

/// Render the body of a widget panel for its current state.
pub(super) fn widget_content(slot: &WidgetSlot, error_detail: ErrorDetail) -> Markup {
    let result = match &slot.state {
        WidgetState::Loading => return loading_spinner(),
        WidgetState::Failed(error) => Err(error.clone()),
        WidgetState::Loaded(payload) => loaded_content(slot, payload),
    };

    match result {
        Ok(markup) => markup,
        Err(error) => error_panel(&error, error_detail),
    }
}

fn loaded_content(slot: &WidgetSlot, payload: &WidgetPayload) -> Result<Markup, FetchError> {
    let kind = slot.widget.kind;

    match (kind.rendering(), payload) {
        (Rendering::Chart(chart_kind), WidgetPayload::Expense(data)) => {
            Ok(chart_view(&slot.widget.id, &widget_chart(chart_kind, data)))
        }
        (Rendering::Summary, WidgetPayload::Expense(data)) => expense_summary(kind, data),
        (Rendering::Summary, WidgetPayload::Widget(data)) => widget_summary(kind, data),
        (Rendering::Chart(_), WidgetPayload::Widget(_)) => Err(mismatched_payload(kind)),
    }
}

fn mismatched_payload(kind: WidgetKind) -> FetchError {
    FetchError::Decode(format!("{kind} widgets cannot display this data"))
}

fn expense_summary(kind: WidgetKind, data: &ExpenseData) -> Result<Markup, FetchError> {
    match kind {
        WidgetKind::ExpenseCount => Ok(big_number(&data.expense_count.to_string(), "Expenses")),
        WidgetKind::AvgExpense => Ok(big_number(
            &format_currency(data.average_expense()),
            "Per expense",
        )),
        WidgetKind::TopCategories => {
            let rows = data
                .top_categories(TOP_CATEGORY_COUNT)
                .into_iter()
                .map(|(name, amount)| (name.to_owned(), amount))
                .collect::<Vec<_>>();
            Ok(amount_table("Category", &rows, "No categories"))
        }
        other => Err(mismatched_payload(other)),
    }
}

fn widget_summary(kind: WidgetKind, data: &WidgetData) -> Result<Markup, FetchError> {
    match (kind, data) {
        (WidgetKind::TotalSpent, WidgetData::Value(value)) => {
            Ok(big_number(&format_currency(*value), "Total spent"))
        }
        (WidgetKind::ReimbursableAmount, WidgetData::Value(value)) => {
            Ok(big_number(&format_currency(*value), "Reimbursable"))
        }
        (WidgetKind::PendingReimbursements, WidgetData::Pending { count, total }) => Ok(html!(
            div class="text-center"
            {
                p class="text-3xl font-bold text-yellow-600 dark:text-yellow-400"
                {
                    (count) " Items"
                }
                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Total: " (format_currency(*total))
                }
            }
        )),
        (WidgetKind::RecentExpenses, WidgetData::Recent(expenses)) => {
            let rows = expenses
                .iter()
                .map(|RecentExpense { title, amount }| {
                    (
                        title.clone().unwrap_or_else(|| "Untitled Expense".to_owned()),
                        *amount,
                    )
                })
                .collect::<Vec<_>>();
            Ok(amount_table("Title", &rows, "No recent expenses"))
        }
        (other, _) => Err(mismatched_payload(other)),
    }
}

fn big_number(value: &str, caption: &str) -> Markup {
    html!(
        div class="text-center"
        {
            p class="text-3xl font-bold text-blue-600 dark:text-blue-400" { (value) }
            p class="text-sm text-gray-600 dark:text-gray-400" { (caption) }
        }
    )
}

fn amount_table(label_heading: &str, rows: &[(String, f64)], empty_text: &str) -> Markup {
    html!(
        @if rows.is_empty() {
            p class="text-sm text-center text-gray-500 dark:text-gray-400" { (empty_text) }
        } @else {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class="px-4 py-2" { (label_heading) }
                        th scope="col" class="px-4 py-2 text-right" { "Amount" }
                    }
                }

                tbody
                {
                    @for (label, amount) in rows {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (label) }
                            td class={ (TABLE_CELL_STYLE) " text-right" } { (format_currency(*amount)) }
                        }
                    }
                }
            }
        }
    )
}

fn error_panel(error: &FetchError, error_detail: ErrorDetail) -> Markup {
    html!(
        div
            class="widget-error p-4 text-center text-sm rounded text-red-800 bg-red-50
                dark:bg-gray-800 dark:text-red-400"
        {
            (error_detail.fetch_error_message(error))
        }
    )
}

fn dashboard_script() -> String {
    format!(
        r#"
        function runPresetAction(button) {{
            const presetId = document.getElementById('preset-select').value;
            if (!presetId) return;

            const confirmText = button.dataset.confirm;
            if (confirmText && !confirm(confirmText)) return;

            const endpoint = button.dataset.endpoint.replace('{{preset_id}}', presetId);
            htmx.ajax(button.dataset.method, endpoint, {{
                source: button,
                target: button.dataset.target || '#alert-container',
                swap: button.dataset.swap || 'innerHTML',
            }});
        }}

        document.addEventListener('dragstart', (event) => {{
            const item = event.target.closest && event.target.closest('[data-widget-type]');
            if (!item || !item.closest('#widget-palette')) return;
            event.dataTransfer.setData('text/plain', item.dataset.widgetType);
            event.dataTransfer.effectAllowed = 'copy';
        }});

        document.addEventListener('dragover', (event) => {{
            const grid = event.target.closest && event.target.closest('#dashboard-preview');
            if (!grid) return;
            event.preventDefault();
            grid.classList.add('drag-over');
        }});

        document.addEventListener('dragleave', (event) => {{
            const grid = event.target.closest && event.target.closest('#dashboard-preview');
            if (grid && !grid.contains(event.relatedTarget)) grid.classList.remove('drag-over');
        }});

        document.addEventListener('drop', (event) => {{
            const grid = event.target.closest && event.target.closest('#dashboard-preview');
            if (!grid) return;
            event.preventDefault();
            grid.classList.remove('drag-over');

            const kind = event.dataTransfer.getData('text/plain');
            if (!kind) return;

            htmx.ajax('POST', '{add_widget}', {{
                source: grid,
                values: {{ kind }},
                target: '#dashboard-preview',
                swap: 'outerHTML',
            }});
        }});
        "#,
        add_widget = endpoints::DASHBOARD_WIDGETS,
    )
}
