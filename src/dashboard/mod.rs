//! The dashboard builder: a grid of widgets, each showing one view of the
//! expense data under a shared filter set, plus named presets of the layout.

mod builder;
mod charts;
pub mod data;
pub mod filters;
mod handlers;
pub mod preset;
mod refresh;
mod view;
pub mod widget;

pub use builder::DashboardBuilder;
pub use handlers::{
    DashboardState, add_widget, delete_preset, get_dashboard_page, get_widget_content,
    load_preset, remove_widget, resize_widget, save_preset, set_default_preset, update_filters,
};
