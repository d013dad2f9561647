//! Terminal User Interface for the dashboard

mod app;
mod ui;

pub use app::{TuiApp, TuiEvent};
pub use ui::draw;
