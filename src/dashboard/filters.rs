//! The dashboard filter set and how it is built from the filter form.
//!
//! A [FilterSet] travels three ways: as the query string of backend requests,
//! as JSON inside a saved preset, and as the posted filter form. Reading JSON is
//! lenient so that presets saved with string ids and string flags still load.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The time window the backend aggregates over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Week, Period::Month, Period::Quarter, Period::Year];

    /// Parse a period name, falling back to [Period::Month] for anything unknown.
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "week" => Period::Week,
            "quarter" => Period::Quarter,
            "year" => Period::Year,
            _ => Period::Month,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Week => "Last 7 days",
            Period::Month => "Last 30 days",
            Period::Quarter => "Last 90 days",
            Period::Year => "Last 365 days",
        }
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = Option::<String>::deserialize(deserializer)?;
        Ok(text.as_deref().map(Period::parse).unwrap_or_default())
    }
}

/// A reimbursement status to filter by.
///
/// The "all" choice in the form is represented by the absence of a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[serde(rename = "none")]
    NotRequested,
    Pending,
    Approved,
    Received,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 4] = [
        StatusFilter::NotRequested,
        StatusFilter::Pending,
        StatusFilter::Approved,
        StatusFilter::Received,
    ];

    /// Parse a status name. "all" and unknown names mean no status filter.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "none" => Some(StatusFilter::NotRequested),
            "pending" => Some(StatusFilter::Pending),
            "approved" => Some(StatusFilter::Approved),
            "received" => Some(StatusFilter::Received),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::NotRequested => "none",
            StatusFilter::Pending => "pending",
            StatusFilter::Approved => "approved",
            StatusFilter::Received => "received",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::NotRequested => "Not requested",
            StatusFilter::Pending => "Pending",
            StatusFilter::Approved => "Approved",
            StatusFilter::Received => "Received",
        }
    }
}

/// The filters applied to every widget's data request.
///
/// `None` for a list filter means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub period: Period,

    #[serde(
        rename = "categories[]",
        alias = "categories",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_ids"
    )]
    pub categories: Option<Vec<i64>>,

    #[serde(
        rename = "payment_methods[]",
        alias = "payment_methods",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_ids"
    )]
    pub payment_methods: Option<Vec<i64>>,

    #[serde(
        default,
        skip_serializing_if = "is_false",
        deserialize_with = "lenient_flag"
    )]
    pub reimbursable_only: bool,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_status"
    )]
    pub reimbursement_status: Option<StatusFilter>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_amount"
    )]
    pub min_amount: Option<f64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_amount"
    )]
    pub max_amount: Option<f64>,
}

impl FilterSet {
    /// The key-value pairs for a backend query string.
    ///
    /// List filters repeat their key once per id, with the `[]` suffix.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("period", self.period.as_str().to_owned())];

        for id in self.categories.iter().flatten() {
            pairs.push(("categories[]", id.to_string()));
        }

        for id in self.payment_methods.iter().flatten() {
            pairs.push(("payment_methods[]", id.to_string()));
        }

        if self.reimbursable_only {
            pairs.push(("reimbursable_only", "true".to_owned()));
        }

        if let Some(status) = self.reimbursement_status {
            pairs.push(("reimbursement_status", status.as_str().to_owned()));
        }

        if let Some(amount) = self.min_amount {
            pairs.push(("min_amount", amount.to_string()));
        }

        if let Some(amount) = self.max_amount {
            pairs.push(("max_amount", amount.to_string()));
        }

        pairs
    }

    /// Build the filter set from the posted filter form.
    ///
    /// A list filter is dropped when every known option is selected and when
    /// none is. Otherwise it holds the selected ids in option order. Ids that
    /// are not among the known options are ignored.
    pub fn from_form(form: &FilterForm, options: &FilterOptions) -> Self {
        Self {
            period: Period::parse(&form.period),
            categories: compact_selection(&form.categories, &options.categories),
            payment_methods: compact_selection(&form.payment_methods, &options.payment_methods),
            reimbursable_only: form.reimbursable_only.as_deref() == Some("true"),
            reimbursement_status: StatusFilter::parse(&form.reimbursement_status),
            min_amount: parse_amount(&form.min_amount),
            max_amount: parse_amount(&form.max_amount),
        }
    }

    /// Apply the form's list rules to stored filters, such as those of a preset.
    ///
    /// Lists are left untouched while the matching options are unknown.
    pub fn compacted(mut self, options: &FilterOptions) -> Self {
        self.categories = compact_stored(self.categories, &options.categories);
        self.payment_methods = compact_stored(self.payment_methods, &options.payment_methods);
        self
    }

    /// Whether the category checkbox for `id` should be rendered checked.
    pub fn includes_category(&self, id: i64) -> bool {
        self.categories
            .as_ref()
            .is_none_or(|categories| categories.contains(&id))
    }

    /// Whether the payment method checkbox for `id` should be rendered checked.
    pub fn includes_payment_method(&self, id: i64) -> bool {
        self.payment_methods
            .as_ref()
            .is_none_or(|methods| methods.contains(&id))
    }
}

fn compact_selection(selected: &[i64], options: &[FilterOption]) -> Option<Vec<i64>> {
    let chosen: Vec<i64> = options
        .iter()
        .map(|option| option.id)
        .filter(|id| selected.contains(id))
        .collect();

    if chosen.is_empty() || chosen.len() == options.len() {
        None
    } else {
        Some(chosen)
    }
}

fn compact_stored(stored: Option<Vec<i64>>, options: &[FilterOption]) -> Option<Vec<i64>> {
    match stored {
        Some(ids) if !options.is_empty() => compact_selection(&ids, options),
        stored => stored,
    }
}

fn parse_amount(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

fn is_false(value: &bool) -> bool {
    !value
}

fn lenient_ids<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?;

    let ids: Vec<i64> = values
        .unwrap_or_default()
        .iter()
        .filter_map(|value| match value {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        })
        .collect();

    Ok((!ids.is_empty()).then_some(ids))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(Value::Bool(flag)) => flag,
        Some(Value::String(text)) => text.trim() == "true",
        _ => false,
    })
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<StatusFilter>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = Option::<String>::deserialize(deserializer)?;
    Ok(text.as_deref().and_then(StatusFilter::parse))
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => parse_amount(&text),
        _ => None,
    })
}

/// A category or payment method the user can filter by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    pub id: i64,
    pub name: String,
}

/// The known options for the list filters, as last fetched from the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub categories: Vec<FilterOption>,
    pub payment_methods: Vec<FilterOption>,
}

/// The filter form as posted by the browser.
#[derive(Debug, Default, Deserialize)]
pub struct FilterForm {
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub categories: Vec<i64>,
    #[serde(default)]
    pub payment_methods: Vec<i64>,
    #[serde(default)]
    pub reimbursable_only: Option<String>,
    #[serde(default)]
    pub reimbursement_status: String,
    #[serde(default)]
    pub min_amount: String,
    #[serde(default)]
    pub max_amount: String,
}

#[cfg(test)]
mod tests {
    use super::{FilterForm, FilterOption, FilterOptions, FilterSet, Period, StatusFilter};

    fn options() -> FilterOptions {
        let option = |id: i64, name: &str| FilterOption {
            id,
            name: name.to_owned(),
        };

        FilterOptions {
            categories: vec![option(1, "Lodging"), option(2, "Fuel"), option(3, "Meals")],
            payment_methods: vec![option(10, "Cash"), option(11, "Card")],
        }
    }

    #[test]
    fn stored_filters_follow_form_rules() {
        let stored = FilterSet {
            period: Period::Week,
            categories: Some(vec![3, 1, 2]),
            payment_methods: Some(vec![11, 99]),
            reimbursable_only: true,
            ..Default::default()
        };

        let filters = stored.compacted(&options());

        assert_eq!(filters.categories, None);
        assert_eq!(filters.payment_methods, Some(vec![11]));
        assert_eq!(filters.period, Period::Week);
        assert!(filters.reimbursable_only);
    }

    #[test]
    fn stored_filters_kept_without_options() {
        let stored = FilterSet {
            categories: Some(vec![3, 1]),
            payment_methods: Some(vec![99]),
            ..Default::default()
        };

        let filters = stored.clone().compacted(&FilterOptions::default());

        assert_eq!(filters, stored);
    }

    #[test]
    fn all_selected_omits_filter() {
        let form = FilterForm {
            categories: vec![1, 2, 3],
            payment_methods: vec![10, 11],
            ..Default::default()
        };

        let filters = FilterSet::from_form(&form, &options());

        assert_eq!(filters.categories, None);
        assert_eq!(filters.payment_methods, None);
    }

    #[test]
    fn none_selected_omits_filter() {
        let filters = FilterSet::from_form(&FilterForm::default(), &options());

        assert_eq!(filters.categories, None);
        assert_eq!(filters.payment_methods, None);
    }

    #[test]
    fn strict_subset_keeps_selected_ids_in_option_order() {
        let form = FilterForm {
            categories: vec![3, 1],
            payment_methods: vec![11],
            ..Default::default()
        };

        let filters = FilterSet::from_form(&form, &options());

        assert_eq!(filters.categories, Some(vec![1, 3]));
        assert_eq!(filters.payment_methods, Some(vec![11]));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let form = FilterForm {
            categories: vec![2, 99],
            ..Default::default()
        };

        let filters = FilterSet::from_form(&form, &options());

        assert_eq!(filters.categories, Some(vec![2]));
    }

    #[test]
    fn scalar_fields_parse_from_form() {
        let form = FilterForm {
            period: "quarter".to_owned(),
            reimbursable_only: Some("true".to_owned()),
            reimbursement_status: "all".to_owned(),
            min_amount: " 12.5 ".to_owned(),
            max_amount: "lots".to_owned(),
            ..Default::default()
        };

        let filters = FilterSet::from_form(&form, &options());

        assert_eq!(filters.period, Period::Quarter);
        assert!(filters.reimbursable_only);
        assert_eq!(filters.reimbursement_status, None);
        assert_eq!(filters.min_amount, Some(12.5));
        assert_eq!(filters.max_amount, None);
    }

    #[test]
    fn unknown_period_falls_back_to_month() {
        assert_eq!(Period::parse("fortnight"), Period::Month);
        assert_eq!(Period::parse(""), Period::Month);
    }

    #[test]
    fn form_parses_repeated_checkbox_values() {
        let form: FilterForm = serde_html_form::from_str(
            "period=week&categories=1&categories=3&payment_methods=10&reimbursement_status=pending",
        )
        .unwrap();

        assert_eq!(form.period, "week");
        assert_eq!(form.categories, vec![1, 3]);
        assert_eq!(form.payment_methods, vec![10]);
        assert_eq!(form.reimbursable_only, None);
        assert_eq!(form.reimbursement_status, "pending");
    }

    #[test]
    fn query_pairs_use_bracketed_list_keys() {
        let filters = FilterSet {
            period: Period::Week,
            categories: Some(vec![1, 3]),
            payment_methods: None,
            reimbursable_only: true,
            reimbursement_status: Some(StatusFilter::NotRequested),
            min_amount: Some(5.0),
            max_amount: None,
        };

        let pairs = filters.to_query_pairs();

        assert_eq!(
            pairs,
            vec![
                ("period", "week".to_owned()),
                ("categories[]", "1".to_owned()),
                ("categories[]", "3".to_owned()),
                ("reimbursable_only", "true".to_owned()),
                ("reimbursement_status", "none".to_owned()),
                ("min_amount", "5".to_owned()),
            ]
        );
    }

    #[test]
    fn default_filters_only_send_period() {
        assert_eq!(
            FilterSet::default().to_query_pairs(),
            vec![("period", "month".to_owned())]
        );
    }

    #[test]
    fn reads_filters_saved_with_string_values() {
        let json = r#"{
            "period": "year",
            "categories[]": ["2", "3"],
            "payment_methods[]": [10],
            "reimbursable_only": "true",
            "reimbursement_status": "approved",
            "min_amount": "20",
            "max_amount": 150.5
        }"#;

        let filters: FilterSet = serde_json::from_str(json).unwrap();

        assert_eq!(
            filters,
            FilterSet {
                period: Period::Year,
                categories: Some(vec![2, 3]),
                payment_methods: Some(vec![10]),
                reimbursable_only: true,
                reimbursement_status: Some(StatusFilter::Approved),
                min_amount: Some(20.0),
                max_amount: Some(150.5),
            }
        );
    }

    #[test]
    fn reads_empty_filters_as_defaults() {
        let filters: FilterSet = serde_json::from_str("{}").unwrap();

        assert_eq!(filters, FilterSet::default());
    }

    #[test]
    fn writes_only_active_filters() {
        let filters = FilterSet {
            categories: Some(vec![4]),
            ..Default::default()
        };

        let json = serde_json::to_value(&filters).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "period": "month", "categories[]": [4] })
        );
    }

    #[test]
    fn unrestricted_filters_include_every_option() {
        let filters = FilterSet {
            payment_methods: Some(vec![11]),
            ..Default::default()
        };

        assert!(filters.includes_category(1));
        assert!(filters.includes_payment_method(11));
        assert!(!filters.includes_payment_method(10));
    }
}
