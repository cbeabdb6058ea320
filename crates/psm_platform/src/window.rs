use std::sync::Arc;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Fullscreen, Window, WindowAttributes};

pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl PlatformConfig {
    /// Window sized as an integer multiple of the game resolution.
    pub fn scaled(title: &str, screen_width: u32, screen_height: u32, scale: u32) -> Self {
        let scale = scale.max(1);
        Self {
            title: title.to_string(),
            width: screen_width * scale,
            height: screen_height * scale,
        }
    }
}

pub fn create_window(event_loop: &ActiveEventLoop, config: &PlatformConfig) -> Arc<Window> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

    let window = event_loop
        .create_window(attrs)
        .expect("Failed to create window");
    window.set_cursor_visible(false);
    Arc::new(window)
}

/// Switch between windowed and borderless fullscreen on the current monitor.
pub fn toggle_fullscreen(window: &Window) {
    if window.fullscreen().is_some() {
        log::info!("Leaving fullscreen");
        window.set_fullscreen(None);
    } else {
        log::info!("Entering fullscreen");
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    }
}
