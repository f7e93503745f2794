pub mod actions;
pub mod panels;
pub mod state;
pub mod theme;

pub use actions::UiActions;
pub use panels::{PanelStats, draw_help_overlay, draw_side_panel, draw_warning_modal};
pub use state::UiState;
pub use theme::apply_theme;
