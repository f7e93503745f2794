use crate::scene::{LevelError, MeshSource, SceneDriver};
use crate::ui::state::UiState;

/// Button presses collected during one egui pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiActions {
    pub increase_level: bool,
    pub decrease_level: bool,
    pub toggle_rotation: bool,
    pub dismiss_warning: bool,
}

impl UiActions {
    pub fn apply<S: MeshSource>(self, driver: &mut SceneDriver<S>, ui: &mut UiState) {
        if self.dismiss_warning {
            ui.pending_warning = None;
        }

        // A pending warning is modal.
        if ui.is_blocked() {
            return;
        }

        if self.increase_level {
            report(driver.increase_level(), ui);
        }

        if self.decrease_level {
            report(driver.decrease_level(), ui);
        }

        if self.toggle_rotation {
            let rotating = driver.toggle_rotation();
            log::debug!("rotation {}", if rotating { "on" } else { "off" });
        }
    }
}

fn report(result: Result<u32, LevelError>, ui: &mut UiState) {
    match result {
        Ok(_) => {}
        Err(err @ LevelError::AtFloor) => {
            log::warn!("{err}");
            ui.pending_warning = Some(err.to_string());
        }
        Err(err @ LevelError::AtCeiling(_)) => log::warn!("{err}"),
        Err(err) => log::error!("could not rebuild fractal: {err}"),
    }
}
