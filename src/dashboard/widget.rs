//! Widget descriptors: the closed set of widget kinds, their sizes and ids.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The kinds of widget that can be placed on the dashboard.
///
/// Each kind maps to exactly one [Rendering] and one [DataSource].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    CategoryPie,
    CategoryBar,
    PaymentPie,
    PaymentBar,
    TrendLine,
    TrendArea,
    ReimbursementBreakdown,
    TotalSpent,
    ReimbursableAmount,
    PendingReimbursements,
    ExpenseCount,
    AvgExpense,
    RecentExpenses,
    TopCategories,
}

/// Which breakdown of the expense data a chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakdown {
    Category,
    PaymentMethod,
}

/// The chart drawn by a chart widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie(Breakdown),
    Bar(Breakdown),
    Line,
    Area,
    ReimbursementDoughnut,
}

/// How a widget presents its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    /// An ECharts chart.
    Chart(ChartKind),
    /// A headline number or a small table.
    Summary,
}

/// Which backend endpoint a widget reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// The aggregate breakdowns from `/api/expense_data`.
    ExpenseData,
    /// The per-kind summary from `/api/widgets/data`.
    WidgetData,
}

impl WidgetKind {
    /// Every widget kind in palette order.
    pub const ALL: [WidgetKind; 14] = [
        WidgetKind::CategoryPie,
        WidgetKind::CategoryBar,
        WidgetKind::PaymentPie,
        WidgetKind::PaymentBar,
        WidgetKind::TrendLine,
        WidgetKind::TrendArea,
        WidgetKind::ReimbursementBreakdown,
        WidgetKind::TotalSpent,
        WidgetKind::ReimbursableAmount,
        WidgetKind::PendingReimbursements,
        WidgetKind::ExpenseCount,
        WidgetKind::AvgExpense,
        WidgetKind::RecentExpenses,
        WidgetKind::TopCategories,
    ];

    /// The kebab-case name used in forms, presets and backend queries.
    pub fn as_str(self) -> &'static str {
        match self {
            WidgetKind::CategoryPie => "category-pie",
            WidgetKind::CategoryBar => "category-bar",
            WidgetKind::PaymentPie => "payment-pie",
            WidgetKind::PaymentBar => "payment-bar",
            WidgetKind::TrendLine => "trend-line",
            WidgetKind::TrendArea => "trend-area",
            WidgetKind::ReimbursementBreakdown => "reimbursement-breakdown",
            WidgetKind::TotalSpent => "total-spent",
            WidgetKind::ReimbursableAmount => "reimbursable-amount",
            WidgetKind::PendingReimbursements => "pending-reimbursements",
            WidgetKind::ExpenseCount => "expense-count",
            WidgetKind::AvgExpense => "avg-expense",
            WidgetKind::RecentExpenses => "recent-expenses",
            WidgetKind::TopCategories => "top-categories",
        }
    }

    /// The title shown in the palette and used when a widget is added without one.
    pub fn default_title(self) -> &'static str {
        match self {
            WidgetKind::CategoryPie => "Category Breakdown",
            WidgetKind::CategoryBar => "Category Comparison",
            WidgetKind::PaymentPie => "Payment Methods",
            WidgetKind::PaymentBar => "Payment Comparison",
            WidgetKind::TrendLine => "Spending Trend",
            WidgetKind::TrendArea => "Cumulative Trend",
            WidgetKind::ReimbursementBreakdown => "Reimbursement Status",
            WidgetKind::TotalSpent => "Total Spent",
            WidgetKind::ReimbursableAmount => "Reimbursable Amount",
            WidgetKind::PendingReimbursements => "Pending Reimbursements",
            WidgetKind::ExpenseCount => "Expense Count",
            WidgetKind::AvgExpense => "Average Expense",
            WidgetKind::RecentExpenses => "Recent Expenses",
            WidgetKind::TopCategories => "Top Categories",
        }
    }

    pub fn rendering(self) -> Rendering {
        match self {
            WidgetKind::CategoryPie => Rendering::Chart(ChartKind::Pie(Breakdown::Category)),
            WidgetKind::CategoryBar => Rendering::Chart(ChartKind::Bar(Breakdown::Category)),
            WidgetKind::PaymentPie => Rendering::Chart(ChartKind::Pie(Breakdown::PaymentMethod)),
            WidgetKind::PaymentBar => Rendering::Chart(ChartKind::Bar(Breakdown::PaymentMethod)),
            WidgetKind::TrendLine => Rendering::Chart(ChartKind::Line),
            WidgetKind::TrendArea => Rendering::Chart(ChartKind::Area),
            WidgetKind::ReimbursementBreakdown => {
                Rendering::Chart(ChartKind::ReimbursementDoughnut)
            }
            WidgetKind::TotalSpent
            | WidgetKind::ReimbursableAmount
            | WidgetKind::PendingReimbursements
            | WidgetKind::ExpenseCount
            | WidgetKind::AvgExpense
            | WidgetKind::RecentExpenses
            | WidgetKind::TopCategories => Rendering::Summary,
        }
    }

    pub fn data_source(self) -> DataSource {
        match self {
            WidgetKind::TotalSpent
            | WidgetKind::ReimbursableAmount
            | WidgetKind::PendingReimbursements
            | WidgetKind::RecentExpenses => DataSource::WidgetData,
            WidgetKind::CategoryPie
            | WidgetKind::CategoryBar
            | WidgetKind::PaymentPie
            | WidgetKind::PaymentBar
            | WidgetKind::TrendLine
            | WidgetKind::TrendArea
            | WidgetKind::ReimbursementBreakdown
            | WidgetKind::ExpenseCount
            | WidgetKind::AvgExpense
            | WidgetKind::TopCategories => DataSource::ExpenseData,
        }
    }
}

impl Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The widget type string did not name a known [WidgetKind].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown widget type \"{0}\"")]
pub struct UnknownWidgetKind(pub String);

impl FromStr for WidgetKind {
    type Err = UnknownWidgetKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WidgetKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownWidgetKind(s.to_owned()))
    }
}

/// How much of the grid a widget spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetSize {
    Small,
    #[default]
    Medium,
    Large,
    Full,
}

impl WidgetSize {
    /// The next size in the resize cycle, wrapping from full back to small.
    pub fn next(self) -> Self {
        match self {
            WidgetSize::Small => WidgetSize::Medium,
            WidgetSize::Medium => WidgetSize::Large,
            WidgetSize::Large => WidgetSize::Full,
            WidgetSize::Full => WidgetSize::Small,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WidgetSize::Small => "small",
            WidgetSize::Medium => "medium",
            WidgetSize::Large => "large",
            WidgetSize::Full => "full",
        }
    }

    /// Tailwind classes for the widget's span in the four column grid.
    pub(super) fn grid_class(self) -> &'static str {
        match self {
            WidgetSize::Small => "col-span-4 md:col-span-2 lg:col-span-1",
            WidgetSize::Medium => "col-span-4 md:col-span-2",
            WidgetSize::Large => "col-span-4 lg:col-span-3",
            WidgetSize::Full => "col-span-4",
        }
    }
}

/// An opaque, time-based widget identifier of the form `widget-<millis>-<sequence>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    /// Create an id from the current time and a per-builder sequence number.
    ///
    /// The sequence number keeps ids unique when several widgets are created
    /// within the same millisecond, e.g., when a preset is loaded.
    pub(super) fn generate(sequence: u64) -> Self {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        Self(format!("widget-{millis}-{sequence}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
impl From<&str> for WidgetId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// A widget placed on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub id: WidgetId,
    pub kind: WidgetKind,
    pub title: String,
    pub size: WidgetSize,
}
