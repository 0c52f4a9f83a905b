//! The server-side state of the dashboard builder.
//!
//! Every widget slot carries a generation number. A fetch takes a ticket that
//! records the generation it was issued under, and its result is only applied
//! if the slot still exists and still has that generation. Changing the
//! filters gives every widget a new generation, so slow responses for
//! superseded filters are discarded instead of overwriting newer data.

use crate::{
    api::FetchError,
    dashboard::{
        data::WidgetPayload,
        filters::{FilterOptions, FilterSet},
        preset::{Preset, PresetConfig, PresetWidget},
        widget::{Widget, WidgetId, WidgetKind, WidgetSize},
    },
};

/// What a widget panel currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetState {
    Loading,
    Loaded(WidgetPayload),
    Failed(FetchError),
}

/// A widget and its content.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSlot {
    pub widget: Widget,
    pub generation: u64,
    pub state: WidgetState,
}

/// A ticket for fetching one widget's data outside of the builder lock.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetFetch {
    pub widget_id: WidgetId,
    pub kind: WidgetKind,
    pub filters: FilterSet,
    pub generation: u64,
}

/// Whether a completed fetch changed the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// The widget was removed or its generation moved on while the fetch was in flight.
    Stale,
}

/// The widgets, filters and preset bookkeeping of the dashboard.
#[derive(Debug, Default)]
pub struct DashboardBuilder {
    slots: Vec<WidgetSlot>,
    filters: FilterSet,
    filter_options: FilterOptions,
    next_generation: u64,
    next_sequence: u64,
    default_preset_checked: bool,
}

impl DashboardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The widget slots in render order.
    pub fn slots(&self) -> &[WidgetSlot] {
        &self.slots
    }

    pub fn slot(&self, widget_id: &WidgetId) -> Option<&WidgetSlot> {
        self.slots.iter().find(|slot| &slot.widget.id == widget_id)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.filter_options
    }

    pub fn set_filter_options(&mut self, options: FilterOptions) {
        self.filter_options = options;
    }

    fn bump_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Append a widget in the loading state and return its new id.
    pub fn add_widget(&mut self, kind: WidgetKind, title: &str, size: WidgetSize) -> WidgetId {
        self.next_sequence += 1;
        let id = WidgetId::generate(self.next_sequence);
        let title = match title.trim() {
            "" => kind.default_title().to_owned(),
            title => title.to_owned(),
        };
        let generation = self.bump_generation();

        self.slots.push(WidgetSlot {
            widget: Widget {
                id: id.clone(),
                kind,
                title,
                size,
            },
            generation,
            state: WidgetState::Loading,
        });

        id
    }

    /// Remove a widget. Returns `false` if no widget has `widget_id`.
    pub fn remove_widget(&mut self, widget_id: &WidgetId) -> bool {
        let count = self.slots.len();
        self.slots.retain(|slot| &slot.widget.id != widget_id);
        self.slots.len() != count
    }

    /// Advance a widget to its next size and return the new size.
    ///
    /// The content is kept, so no fetch is needed.
    pub fn resize_widget(&mut self, widget_id: &WidgetId) -> Option<WidgetSize> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| &slot.widget.id == widget_id)?;

        slot.widget.size = slot.widget.size.next();
        Some(slot.widget.size)
    }

    /// Replace the filter set and mark every widget for a fresh fetch.
    pub fn set_filters(&mut self, filters: FilterSet) {
        self.filters = filters;

        for index in 0..self.slots.len() {
            let generation = self.bump_generation();
            let slot = &mut self.slots[index];
            slot.generation = generation;
            slot.state = WidgetState::Loading;
        }
    }

    /// Issue a fetch ticket for the widget's current generation.
    pub fn begin_fetch(&self, widget_id: &WidgetId) -> Option<WidgetFetch> {
        self.slot(widget_id).map(|slot| WidgetFetch {
            widget_id: slot.widget.id.clone(),
            kind: slot.widget.kind,
            filters: self.filters.clone(),
            generation: slot.generation,
        })
    }

    /// Apply a fetch result if its ticket is still current.
    pub fn complete_fetch(
        &mut self,
        fetch: &WidgetFetch,
        result: Result<WidgetPayload, FetchError>,
    ) -> FetchOutcome {
        let Some(slot) = self
            .slots
            .iter_mut()
            .find(|slot| slot.widget.id == fetch.widget_id)
        else {
            tracing::debug!("Discarding data for removed widget {}", fetch.widget_id);
            return FetchOutcome::Stale;
        };

        if slot.generation != fetch.generation {
            tracing::debug!(
                "Discarding stale data for widget {} (generation {} superseded by {})",
                fetch.widget_id,
                fetch.generation,
                slot.generation
            );
            return FetchOutcome::Stale;
        }

        slot.state = match result {
            Ok(payload) => WidgetState::Loaded(payload),
            Err(error) => WidgetState::Failed(error),
        };

        FetchOutcome::Applied
    }

    /// Replace every widget and the filter set with the contents of `preset`.
    ///
    /// Widgets get fresh ids. Entries naming an unknown widget type are skipped.
    pub fn load_preset(&mut self, preset: &Preset) {
        self.slots.clear();
        self.set_filters(preset.filters.clone().compacted(&self.filter_options));

        for entry in &preset.config.widgets {
            match entry.kind.parse::<WidgetKind>() {
                Ok(kind) => {
                    self.add_widget(kind, &entry.title, entry.size);
                }
                Err(error) => {
                    tracing::warn!("Skipping widget in preset \"{}\": {error}", preset.name);
                }
            }
        }
    }

    /// The current widgets as a preset configuration.
    pub fn preset_config(&self) -> PresetConfig {
        PresetConfig {
            widgets: self
                .slots
                .iter()
                .map(|slot| PresetWidget {
                    id: Some(slot.widget.id.clone()),
                    kind: slot.widget.kind.as_str().to_owned(),
                    title: slot.widget.title.clone(),
                    size: slot.widget.size,
                })
                .collect(),
            layout: "grid".to_owned(),
        }
    }

    /// Whether the default preset still needs to be looked up.
    pub fn default_preset_pending(&self) -> bool {
        !self.default_preset_checked
    }

    /// Record that the default preset has been considered.
    ///
    /// Returns `true` only the first time it is called, so the default preset
    /// is loaded at most once per builder.
    pub fn mark_default_preset_checked(&mut self) -> bool {
        !std::mem::replace(&mut self.default_preset_checked, true)
    }
}
