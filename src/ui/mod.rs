//! ImGui overlay: platform plumbing and the settings panel.

pub mod manager;
pub mod panel;

pub use manager::UiManager;
pub use panel::{settings_panel, PanelAction};
