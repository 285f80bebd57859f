//! TUI module: Terminal User Interface using Ratatui.
//!
//! One form screen collecting the nine indicators, one result screen, and a
//! toggleable panel describing each indicator.

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::ClinicalTheme;
