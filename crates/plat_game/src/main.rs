//! Platformer host -- window, key mapping and the fixed-step loop.
//!
//! winit drives the event loop via `ApplicationHandler`. Each redraw:
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed the accumulator
//!   2. `while should_step()` -- advance the simulation by one fixed dt
//!   3. Build the frame view and publish a summary in the window title
//!
//! Passing `--replay <file>` skips the window entirely and runs a scripted
//! input sequence against the level, logging the outcome.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use plat_core::input::{InputState, Key};
use plat_core::time::FrameClock;
use plat_platform::window::PlatformConfig;
use plat_sim::{
    load_config_from_path, load_level_from_path, load_replay_from_path, SimConfig, SimContext,
    SimStatus, Simulation,
};

const CONFIG_PATH: &str = "assets/config/tuning.json";
const LEVEL_PATH: &str = "assets/levels/level1.json";
const FIXED_DT: f32 = 1.0 / 60.0;
const TITLE_REFRESH_FRAMES: u64 = 30;

struct GameState {
    window: Arc<Window>,
    sim: Simulation,
    input: InputState,
    clock: FrameClock,
    restart_on_death: bool,
}

impl GameState {
    fn new(window: Arc<Window>, sim: Simulation) -> Self {
        let restart_on_death = sim.context().config.world.restart_on_death;
        Self {
            window,
            sim,
            input: InputState::new(),
            clock: FrameClock::new(FIXED_DT),
            restart_on_death,
        }
    }

    /// Run the fixed steps owed for this frame. Returns false once the host should exit.
    fn advance(&mut self) -> bool {
        self.clock.begin_frame();
        while self.clock.should_step() {
            let status = self.sim.step(&self.input, self.clock.fixed_dt);
            // Edges are consumed by the first step that sees them.
            self.input.end_frame();
            match status {
                SimStatus::Continue => {}
                SimStatus::Quit => return false,
                SimStatus::PlayerDied if self.restart_on_death => {
                    if let Err(err) = self.sim.restart() {
                        log::error!("Restart failed: {err}");
                        return false;
                    }
                }
                SimStatus::PlayerDied => {
                    log::info!("Player died, exiting.");
                    return false;
                }
            }
        }
        true
    }

    fn publish(&mut self, base_title: &str) {
        let view = self.sim.frame_view();
        if self.clock.frame_count % TITLE_REFRESH_FRAMES != 0 {
            return;
        }
        let mut title = format!(
            "{base_title} | {:.0} fps | {} sprites",
            self.clock.smoothed_fps,
            view.sprites.len()
        );
        if let Some(text) = view.debug_text {
            title.push_str(" | ");
            title.push_str(&text);
        }
        self.window.set_title(&title);
    }
}

struct App {
    config: PlatformConfig,
    pending: Option<Simulation>,
    state: Option<GameState>,
}

impl App {
    fn new(sim: Simulation) -> Self {
        Self {
            config: PlatformConfig::default(),
            pending: Some(sim),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let Some(sim) = self.pending.take() else {
            return;
        };
        match plat_platform::window::create_window(event_loop, &self.config) {
            Ok(window) => self.state = Some(GameState::new(window, sim)),
            Err(err) => {
                log::error!("{err}");
                event_loop.exit();
            }
        }
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

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(key),
                            ElementState::Released => state.input.key_up(key),
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if !state.advance() {
                    event_loop.exit();
                    return;
                }
                state.publish(&self.config.title);
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::KeyK | KeyCode::Space => Some(Key::Jump),
        KeyCode::KeyJ => Some(Key::Fire),
        KeyCode::F12 => Some(Key::DebugToggle),
        KeyCode::Escape => Some(Key::Quit),
        _ => None,
    }
}

fn load_config(path: &Path) -> SimConfig {
    if !path.exists() {
        log::warn!("No tuning file at '{}', using defaults", path.display());
        return SimConfig::default();
    }
    let config = load_config_from_path(path).unwrap_or_else(|err| {
        panic!("Failed to load tuning '{}': {}", path.display(), err);
    });
    log::info!("Loaded tuning from '{}'", path.display());
    config
}

fn load_simulation() -> Simulation {
    let ctx = SimContext::new(load_config(Path::new(CONFIG_PATH)))
        .unwrap_or_else(|err| panic!("Invalid tuning: {err}"));
    let level_path = PathBuf::from(LEVEL_PATH);
    let level = load_level_from_path(&level_path).unwrap_or_else(|err| {
        panic!(
            "Failed to load initial level '{}': {}",
            level_path.display(),
            err
        );
    });
    Simulation::new(level, ctx).unwrap_or_else(|err| {
        panic!(
            "Failed to build initial level '{}': {}",
            level_path.display(),
            err
        );
    })
}

fn run_replay(path: &Path, mut sim: Simulation) {
    let replay = load_replay_from_path(path).unwrap_or_else(|err| {
        panic!("Failed to load replay '{}': {}", path.display(), err);
    });
    let result = replay.run(&mut sim);
    let player = sim.player();
    log::info!(
        "Replay '{}' finished after {} steps with {:?}",
        path.display(),
        result.steps,
        result.status
    );
    log::info!(
        "Player at ({:.2}, {:.2}), {}",
        player.pos.x,
        player.pos.y,
        sim.debug_line()
    );
}

fn replay_arg() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--replay" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Platformer starting...");
    let sim = load_simulation();

    if let Some(path) = replay_arg() {
        run_replay(&path, sim);
        return;
    }

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(sim);
    event_loop.run_app(&mut app).expect("Event loop error");
}
