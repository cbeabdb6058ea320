//! Protostriker M -- window, event loop and entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. Every redraw runs one
//! `GameLoop` frame: fixed-step simulation of the state stack, then a draw of
//! every state into the software frame buffer, which the `Presenter` scales
//! onto the window.

mod assets;
mod audio;
mod bullet;
mod collision;
mod config;
mod context;
mod enemy;
mod entity;
mod explosion;
mod gamepad;
mod level;
mod player;
mod powerup;
#[cfg(test)]
mod replay;
mod sprites;
mod states;
mod weapons;
mod world;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use psm_core::game_loop::GameLoop;
use psm_core::input::Key;
use psm_platform::window::PlatformConfig;
use psm_render::{FrameBuffer, GpuContext, Presenter};

use audio::LogAudio;
use config::{load_config, GameConfig};
use context::GameContext;
use gamepad::Gamepads;
use states::TitleState;

const DEFAULT_RES_DIR: &str = "res";
const CONFIG_FILE: &str = "config.json";
const TITLE_REFRESH: Duration = Duration::from_millis(500);

struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    presenter: Presenter,
    frame: FrameBuffer,
    game: GameLoop<GameContext>,
    gamepads: Option<Gamepads>,
    last_title_update: Instant,
}

impl EngineState {
    fn new(window: Arc<Window>, config: GameConfig, res_dir: &Path) -> Self {
        let gpu = GpuContext::new(window.clone())
            .unwrap_or_else(|err| panic!("Failed to initialise graphics: {err}"));
        let (width, height) = (config.engine.screen_width, config.engine.screen_height);
        let presenter = Presenter::new(&gpu, width, height);
        let frame = FrameBuffer::new(width, height);

        let manifest = res_dir.join(&config.asset_manifest);
        let assets = assets::load_assets(&manifest).unwrap_or_else(|err| {
            log::error!("{err}");
            panic!("Failed to load assets '{}': {}", manifest.display(), err);
        });

        let engine = config.engine.clone();
        let ctx = GameContext::new(config, Arc::new(assets), Box::new(LogAudio), res_dir);
        let mut game = GameLoop::new(&engine, ctx);
        game.start(TitleState::boxed(), None)
            .unwrap_or_else(|err| panic!("Failed to start title screen: {err}"));
        let gamepads = Gamepads::new(&mut game.input);

        Self {
            window,
            gpu,
            presenter,
            frame,
            game,
            gamepads,
            last_title_update: Instant::now(),
        }
    }

    fn update_title(&mut self) {
        if self.last_title_update.elapsed() < TITLE_REFRESH {
            return;
        }
        self.last_title_update = Instant::now();
        let title = &self.game.ctx().config.title;
        let fps = self.game.time.smoothed_fps;
        self.window.set_title(&format!("{title} - {fps:.0} FPS"));
    }
}

struct App {
    config: PlatformConfig,
    game_config: Option<GameConfig>,
    res_dir: PathBuf,
    state: Option<EngineState>,
}

impl App {
    fn new(game_config: GameConfig, res_dir: PathBuf) -> Self {
        Self {
            config: PlatformConfig::scaled(
                &game_config.title,
                game_config.engine.screen_width,
                game_config.engine.screen_height,
                game_config.window_scale,
            ),
            game_config: Some(game_config),
            res_dir,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let Some(game_config) = self.game_config.take() else {
            return;
        };
        let window = psm_platform::window::create_window(event_loop, &self.config);
        log::info!(
            "Window created: {}x{}",
            self.config.width,
            self.config.height
        );
        self.state = Some(EngineState::new(window, game_config, &self.res_dir));
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(engine_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed if engine_key == Key::F11 => {
                                if !event.repeat {
                                    psm_platform::window::toggle_fullscreen(&state.window);
                                }
                            }
                            ElementState::Pressed => state.game.input.key_down(engine_key),
                            ElementState::Released => state.game.input.key_up(engine_key),
                        }
                    }
                }
            }

            WindowEvent::Focused(false) => {
                state.game.input.clear();
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }
                if let Some(pads) = state.gamepads.as_mut() {
                    pads.poll(&mut state.game.input);
                }
                match state.game.run_frame(&mut state.frame) {
                    Ok(true) => {
                        state.presenter.present(&state.gpu, &state.frame);
                        state.update_title();
                    }
                    Ok(false) => {
                        log::info!("No states left, exiting.");
                        event_loop.exit();
                    }
                    Err(err) => {
                        log::error!("{err}");
                        event_loop.exit();
                    }
                }
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    let letter = |c: char| Some(Key::Char(c));
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(Key::Return),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Space => Some(Key::Space),
        KeyCode::Quote => Some(Key::Quote),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Key::Shift),
        KeyCode::ControlLeft | KeyCode::ControlRight => Some(Key::Control),
        KeyCode::F11 => Some(Key::F11),
        KeyCode::KeyA => letter('a'),
        KeyCode::KeyB => letter('b'),
        KeyCode::KeyC => letter('c'),
        KeyCode::KeyD => letter('d'),
        KeyCode::KeyE => letter('e'),
        KeyCode::KeyF => letter('f'),
        KeyCode::KeyG => letter('g'),
        KeyCode::KeyH => letter('h'),
        KeyCode::KeyI => letter('i'),
        KeyCode::KeyJ => letter('j'),
        KeyCode::KeyK => letter('k'),
        KeyCode::KeyL => letter('l'),
        KeyCode::KeyM => letter('m'),
        KeyCode::KeyN => letter('n'),
        KeyCode::KeyO => letter('o'),
        KeyCode::KeyP => letter('p'),
        KeyCode::KeyQ => letter('q'),
        KeyCode::KeyR => letter('r'),
        KeyCode::KeyS => letter('s'),
        KeyCode::KeyT => letter('t'),
        KeyCode::KeyU => letter('u'),
        KeyCode::KeyV => letter('v'),
        KeyCode::KeyW => letter('w'),
        KeyCode::KeyX => letter('x'),
        KeyCode::KeyY => letter('y'),
        KeyCode::KeyZ => letter('z'),
        KeyCode::Digit0 => letter('0'),
        KeyCode::Digit1 => letter('1'),
        KeyCode::Digit2 => letter('2'),
        KeyCode::Digit3 => letter('3'),
        KeyCode::Digit4 => letter('4'),
        KeyCode::Digit5 => letter('5'),
        KeyCode::Digit6 => letter('6'),
        KeyCode::Digit7 => letter('7'),
        KeyCode::Digit8 => letter('8'),
        KeyCode::Digit9 => letter('9'),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Protostriker M starting...");

    let res_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RES_DIR));
    let config_path = res_dir.join(CONFIG_FILE);
    let game_config = load_config(&config_path).unwrap_or_else(|err| {
        log::error!("{err}");
        panic!("Failed to load config '{}': {}", config_path.display(), err);
    });

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(game_config, res_dir);
    event_loop.run_app(&mut app).expect("Event loop error");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_are_reachable_from_the_keyboard() {
        assert_eq!(map_key(KeyCode::KeyZ), Some(Key::Char('z')));
        assert_eq!(map_key(KeyCode::Quote), Some(Key::Quote));
        assert_eq!(map_key(KeyCode::Enter), Some(Key::Return));
        assert_eq!(map_key(KeyCode::F1), None);
    }
}
