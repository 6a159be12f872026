// src/gui/mod.rs - Desktop window adapter over an editing session

mod state;
mod render;
mod events;
mod components;

use std::time::Duration;
use log::info;
use minifb::{Window, WindowOptions};

use crate::errors::{Result, WatermarkError};
use crate::session::EditingSession;

use self::state::GuiState;

/// Run the interactive editor until the window closes.
/// Returns the session so the caller can save whatever was produced.
pub fn run_gui(session: EditingSession) -> Result<EditingSession> {
    let mut window = Window::new(
        "Watermark Remover",
        state::WINDOW_WIDTH,
        state::WINDOW_HEIGHT,
        WindowOptions {
            resize: false,
            scale: minifb::Scale::X1,
            ..WindowOptions::default()
        },
    )
    .map_err(|e| WatermarkError::Gui(format!("Failed to create window: {}", e)))?;

    window.limit_update_rate(Some(Duration::from_millis(50))); // 20 FPS

    let mut state = GuiState::new(session);
    let mut title = String::new();

    info!("Entering main loop");
    while window.is_open() {
        if !events::handle_events(&mut window, &mut state)? {
            break;
        }

        render::update_buffer(&mut state);

        let next_title = state.window_title();
        if next_title != title {
            window.set_title(&next_title);
            title = next_title;
        }

        window
            .update_with_buffer(&state.buffer, state::WINDOW_WIDTH, state::WINDOW_HEIGHT)
            .map_err(|e| WatermarkError::Gui(format!("Failed to update window: {}", e)))?;
    }

    info!("GUI closed");
    Ok(state.session)
}
