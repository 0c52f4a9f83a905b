//! ECharts options for the chart widgets.
//!
//! The options are built with `charming`, serialized to JSON and initialised by
//! an inline script that htmx runs when the widget content is swapped in.

use charming::{
    Chart,
    component::{Axis, Grid, Legend},
    element::{
        AreaStyle, AxisLabel, AxisType, Color, ItemStyle, JsFunction, Tooltip, Trigger,
    },
    series::{Line, Pie, bar::Bar},
};
use maud::{Markup, PreEscaped, html};

use crate::dashboard::{
    data::{ExpenseData, LabeledSeries, ReimbursementStats},
    widget::{Breakdown, ChartKind, WidgetId},
};

/// The colours used for pie slices, in order.
pub(super) const PALETTE: [&str; 10] = [
    "#0d6efd", "#28a745", "#dc3545", "#ffc107", "#17a2b8", "#6f42c1", "#fd7e14", "#20c997",
    "#e83e8c", "#6c757d",
];

const CATEGORY_BAR_COLOR: &str = "#0d6efd";
const PAYMENT_BAR_COLOR: &str = "#28a745";
const TREND_COLOR: &str = "#0d6efd";
const REIMBURSEMENT_COLORS: [&str; 3] = ["#ffc107", "#17a2b8", "#28a745"];

/// Build the chart options for a chart widget.
pub(super) fn widget_chart(kind: ChartKind, data: &ExpenseData) -> Chart {
    match kind {
        ChartKind::Pie(breakdown) => breakdown_pie(breakdown_series(breakdown, data)),
        ChartKind::Bar(Breakdown::Category) => breakdown_bar(&data.categories, CATEGORY_BAR_COLOR),
        ChartKind::Bar(Breakdown::PaymentMethod) => {
            breakdown_bar(&data.payment_methods, PAYMENT_BAR_COLOR)
        }
        ChartKind::Line => trend_chart(&data.daily_trend, false),
        ChartKind::Area => trend_chart(&data.daily_trend, true),
        ChartKind::ReimbursementDoughnut => reimbursement_doughnut(&data.reimbursement_stats),
    }
}

fn breakdown_series(breakdown: Breakdown, data: &ExpenseData) -> &LabeledSeries {
    match breakdown {
        Breakdown::Category => &data.categories,
        Breakdown::PaymentMethod => &data.payment_methods,
    }
}

fn palette(colors: &[&str]) -> Vec<Color> {
    colors.iter().map(|&color| Color::from(color)).collect()
}

fn breakdown_pie(series: &LabeledSeries) -> Chart {
    let data: Vec<(f64, &str)> = series.pairs().map(|(label, value)| (value, label)).collect();

    Chart::new()
        .color(palette(&PALETTE))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().bottom(0))
        .series(Pie::new().name("Amount").radius("65%").data(data))
}

fn breakdown_bar(series: &LabeledSeries, color: &str) -> Chart {
    Chart::new()
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(series.labels.clone()),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            Bar::new()
                .name("Amount")
                .item_style(ItemStyle::new().color(color))
                .data(series.data.clone()),
        )
}

fn trend_chart(series: &LabeledSeries, filled: bool) -> Chart {
    let mut line = Line::new()
        .name("Daily Spending")
        .item_style(ItemStyle::new().color(TREND_COLOR))
        .data(series.data.clone());

    if filled {
        line = line.area_style(AreaStyle::new());
    }

    Chart::new()
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(series.labels.clone()),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(line)
}

fn reimbursement_doughnut(stats: &ReimbursementStats) -> Chart {
    Chart::new()
        .color(palette(&REIMBURSEMENT_COLORS))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().bottom(0))
        .series(
            Pie::new()
                .name("Reimbursements")
                .radius(vec!["40%", "70%"])
                .data(vec![
                    (stats.pending, "Pending"),
                    (stats.approved, "Approved"),
                    (stats.received, "Received"),
                ]),
        )
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// The DOM id of a widget's chart container.
pub(super) fn chart_element_id(widget_id: &WidgetId) -> String {
    format!("{widget_id}-chart")
}

/// Render a chart container and the script that initialises it.
pub(super) fn chart_view(widget_id: &WidgetId, chart: &Chart) -> Markup {
    let element_id = chart_element_id(widget_id);
    // The options are embedded in a script tag, so "</" must not appear verbatim.
    let options = chart.to_string().replace("</", "<\\/");
    let script = format!(
        r#"(function() {{
            const chartDom = document.getElementById("{element_id}");
            if (!chartDom || typeof echarts === "undefined") return;
            const chart = echarts.getInstanceByDom(chartDom) || echarts.init(chartDom);
            const option = {options};
            chart.setOption(option, true);

            new ResizeObserver(() => chart.resize()).observe(chartDom);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
            }};
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }})();"#
    );

    html!(
        div id=(element_id) class="w-full h-64" {}
        script { (PreEscaped(script)) }
    )
}
