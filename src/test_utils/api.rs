use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tokio::sync::Notify;

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

/// An [ExpenseApi] that serves canned data and records the writes it receives.
#[derive(Default)]
pub(crate) struct FakeExpenseApi {
    pub expense_data: ExpenseData,
    pub widget_data: HashMap<WidgetKind, WidgetData>,
    pub categories: Vec<FilterOption>,
    pub payment_methods: Vec<FilterOption>,
    pub presets: Vec<Preset>,
    pub expenses: Vec<Expense>,
    /// Every call fails with this error when set.
    pub fail_with: Option<FetchError>,
    /// The number of upcoming preset list requests that fail, as if the backend were down.
    pub preset_list_outages: Mutex<u32>,
    /// Notified when a data fetch starts.
    pub started: Option<Arc<Notify>>,
    /// Data fetches wait for this to be notified before answering.
    pub gate: Option<Arc<Notify>>,
    pub created_presets: Mutex<Vec<NewPreset>>,
    pub default_preset_ids: Mutex<Vec<i64>>,
    pub deleted_preset_ids: Mutex<Vec<i64>>,
    pub requested_filters: Mutex<Vec<FilterSet>>,
}

impl FakeExpenseApi {
    /// The filter sets that data fetches were made with, in order.
    pub fn requested_filters(&self) -> Vec<FilterSet> {
        self.requested_filters.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), FetchError> {
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn data_fetch(&self, filters: &FilterSet) -> Result<(), FetchError> {
        self.requested_filters.lock().unwrap().push(filters.clone());

        if let Some(started) = &self.started {
            started.notify_one();
        }

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.check()
    }
}

#[async_trait]
impl ExpenseApi for FakeExpenseApi {
    async fn expense_data(&self, filters: &FilterSet) -> Result<ExpenseData, FetchError> {
        self.data_fetch(filters).await?;
        Ok(self.expense_data.clone())
    }

    async fn widget_data(
        &self,
        filters: &FilterSet,
        kind: WidgetKind,
    ) -> Result<WidgetData, FetchError> {
        self.data_fetch(filters).await?;
        self.widget_data
            .get(&kind)
            .cloned()
            .ok_or(FetchError::Status(404))
    }

    async fn categories(&self) -> Result<Vec<FilterOption>, FetchError> {
        self.check()?;
        Ok(self.categories.clone())
    }

    async fn payment_methods(&self) -> Result<Vec<FilterOption>, FetchError> {
        self.check()?;
        Ok(self.payment_methods.clone())
    }

    async fn list_presets(&self) -> Result<Vec<Preset>, FetchError> {
        self.check()?;

        let mut outages = self.preset_list_outages.lock().unwrap();
        if *outages > 0 {
            *outages -= 1;
            return Err(FetchError::Request("connection refused".to_owned()));
        }
        drop(outages);

        Ok(self.presets.clone())
    }

    async fn get_preset(&self, preset_id: i64) -> Result<Preset, FetchError> {
        self.check()?;
        self.presets
            .iter()
            .find(|preset| preset.id == preset_id)
            .cloned()
            .ok_or(FetchError::Status(404))
    }

    async fn create_preset(&self, preset: &NewPreset) -> Result<(), FetchError> {
        self.check()?;
        self.created_presets.lock().unwrap().push(preset.clone());
        Ok(())
    }

    async fn set_default_preset(&self, preset_id: i64) -> Result<(), FetchError> {
        self.check()?;
        self.default_preset_ids.lock().unwrap().push(preset_id);
        Ok(())
    }

    async fn delete_preset(&self, preset_id: i64) -> Result<(), FetchError> {
        self.check()?;
        self.deleted_preset_ids.lock().unwrap().push(preset_id);
        Ok(())
    }

    async fn get_expense(&self, expense_id: i64) -> Result<Expense, FetchError> {
        self.check()?;
        self.expenses
            .iter()
            .find(|expense| expense.id == expense_id)
            .cloned()
            .ok_or(FetchError::Status(404))
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>, FetchError> {
        self.check()?;
        Ok(self.expenses.clone())
    }
}
