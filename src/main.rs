#![deny(clippy::all)]
#![forbid(unsafe_code)]

use crate::config::Config;
use error_iter::ErrorIter as _;
use game_loop::{game_loop, Time, TimeTrait as _};
use gilrs::{Button, GamepadId, Gilrs};
use invaders_core::{
    Assets, Controls, Direction, FormationConfig, Leaderboard, LocalLeaderboard, Stage, TextInput,
    World, FPS, HEIGHT, TIME_STEP, WIDTH,
};
use log::{debug, error, info, warn};
use pixels::{Error, Pixels, SurfaceTexture};
use std::sync::Arc;
use std::time::Duration;
use winit::dpi::LogicalSize;
use winit::event_loop::EventLoop;
use winit::keyboard::KeyCode;
use winit::window::{Fullscreen, WindowBuilder};
use winit_input_helper::{TextChar, WinitInputHelper};

mod config;

/// Uber-struct representing the entire game.
struct Game {
    /// Software renderer.
    pixels: Pixels<'static>,
    /// Invaders world.
    world: World,
    /// Player controls for world updates.
    controls: Controls,
    /// Event manager.
    input: WinitInputHelper,
    /// GamePad manager, if the platform has one.
    gilrs: Option<Gilrs>,
    /// GamePad ID for the player.
    gamepad: Option<GamepadId>,
    /// Game pause state.
    paused: bool,
}

impl Game {
    fn new(pixels: Pixels<'static>, world: World) -> Self {
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => Some(gilrs),
            Err(err) => {
                warn!("Gamepads are unavailable: {err}");
                None
            }
        };

        Self {
            pixels,
            world,
            controls: Controls::default(),
            input: WinitInputHelper::new(),
            gilrs,
            gamepad: None,
            paused: false,
        }
    }

    fn update_controls(&mut self) {
        let stage = self.world.stage();

        // Keyboard controls
        let mut left = self.input.key_held(KeyCode::ArrowLeft);
        let mut right = self.input.key_held(KeyCode::ArrowRight);
        let mut fire = self.input.key_held(KeyCode::Space);
        let mut confirm =
            self.input.key_pressed(KeyCode::Enter) | self.input.key_pressed(KeyCode::NumpadEnter);
        let mut cancel = stage != Stage::Intro && self.input.key_pressed(KeyCode::Escape);
        let mut pause = false;
        let scores = stage == Stage::Intro && self.input.key_pressed(KeyCode::KeyS);

        // Letter keys are typed into the name while it is being entered
        let text = if stage == Stage::ScoreEntry {
            self.input
                .text()
                .iter()
                .map(|text| match text {
                    TextChar::Char(c) => TextInput::Char(*c),
                    TextChar::Back => TextInput::Backspace,
                })
                .collect()
        } else {
            pause = self.input.key_pressed(KeyCode::Pause) | self.input.key_pressed(KeyCode::KeyP);
            Vec::new()
        };

        // GamePad controls
        if let Some(gilrs) = &mut self.gilrs {
            // Pump the gilrs event loop and find an active gamepad
            while let Some(gilrs::Event { id, event, .. }) = gilrs.next_event() {
                let pad = gilrs.gamepad(id);
                if self.gamepad.is_none() {
                    debug!("Gamepad with id {} is connected: {}", id, pad.name());
                    self.gamepad = Some(id);
                } else if event == gilrs::ev::EventType::Disconnected {
                    debug!("Gamepad with id {} is disconnected: {}", id, pad.name());
                    self.gamepad = None;
                }
            }

            if let Some(id) = self.gamepad {
                let gamepad = gilrs.gamepad(id);
                let just_pressed = |button| {
                    gamepad.button_data(button).is_some_and(|data| {
                        data.is_pressed() && data.counter() == gilrs.counter()
                    })
                };

                left |= gamepad.is_pressed(Button::DPadLeft);
                right |= gamepad.is_pressed(Button::DPadRight);
                fire |= gamepad.is_pressed(Button::South);
                confirm |= stage != Stage::Playing && just_pressed(Button::South);
                cancel |= stage != Stage::Intro && just_pressed(Button::East);
                pause |= just_pressed(Button::Start);
            }
            gilrs.inc();
        }

        if pause {
            self.paused = !self.paused;
            info!("{}", if self.paused { "Paused" } else { "Resumed" });
        }

        let direction = if left {
            Direction::Left
        } else if right {
            Direction::Right
        } else {
            Direction::Still
        };

        self.controls = Controls {
            direction,
            fire,
            confirm,
            cancel,
            scores,
            text,
        };
    }

    /// Advance the world by one frame.
    ///
    /// Presses are only seen by the first update after the input that produced them.
    fn step(&mut self) {
        self.world.update(&self.controls);

        self.controls.confirm = false;
        self.controls.cancel = false;
        self.controls.scores = false;
        self.controls.text.clear();
    }

    fn reset_game(&mut self) {
        self.paused = false;
        self.world.reset_game();
    }
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let config = Config::from_env().map_err(|err| Error::UserDefined(Box::new(err)))?;
    debug!("{config:?}");

    let assets = Assets::load(&config.assets).map_err(|err| {
        log_error("Assets::load", &err);
        Error::UserDefined(Box::new(err))
    })?;
    let leaderboard: Box<dyn Leaderboard> = match &config.scores {
        Some(path) => Box::new(
            LocalLeaderboard::open(path).map_err(|err| Error::UserDefined(Box::new(err)))?,
        ),
        None => Box::new(LocalLeaderboard::new()),
    };
    let world = World::new(
        assets,
        FormationConfig::default(),
        generate_seed()?,
        config.debug,
        leaderboard,
    )
    .map_err(|err| Error::UserDefined(Box::new(err)))?;

    let event_loop = EventLoop::new().map_err(|err| Error::UserDefined(Box::new(err)))?;

    let window = {
        let size = LogicalSize::new(WIDTH as f64, HEIGHT as f64);
        let scaled_size =
            LogicalSize::new(WIDTH as f64 * config.scale, HEIGHT as f64 * config.scale);
        let window = WindowBuilder::new()
            .with_title("alien invaders")
            .with_inner_size(scaled_size)
            .with_min_inner_size(size)
            .build(&event_loop)
            .map_err(|err| Error::UserDefined(Box::new(err)))?;
        Arc::new(window)
    };

    let pixels = {
        let window_size = window.inner_size();
        let surface_texture =
            SurfaceTexture::new(window_size.width, window_size.height, Arc::clone(&window));
        Pixels::new(WIDTH as u32, HEIGHT as u32, surface_texture)?
    };

    let game = Game::new(pixels, world);

    let res = game_loop(
        event_loop,
        window,
        game,
        FPS as u32,
        0.1,
        move |g| {
            // Update the world
            if !g.game.paused {
                g.game.step();
            }
        },
        move |g| {
            // Drawing
            g.game.world.draw(g.game.pixels.frame_mut());
            if let Err(err) = g.game.pixels.render() {
                log_error("pixels.render", &err);
                g.exit();
            }

            // Sleep the main thread to limit drawing to the fixed time step.
            // See: https://github.com/parasyte/pixels/issues/174
            let dt = TIME_STEP.as_secs_f64() - Time::now().sub(&g.current_instant());
            if dt > 0.0 {
                std::thread::sleep(Duration::from_secs_f64(dt));
            }
        },
        |g, event| {
            // Let winit_input_helper collect events to build its state.
            if g.game.input.update(event) {
                // Update controls
                g.game.update_controls();

                // Close events
                let on_title = g.game.world.stage() == Stage::Intro;
                if (on_title && g.game.input.key_pressed(KeyCode::Escape))
                    || g.game.input.close_requested()
                {
                    g.exit();
                    return;
                }

                // Reset game
                let playing = g.game.world.stage() == Stage::Playing;
                if playing && g.game.input.key_pressed(KeyCode::KeyR) {
                    g.game.reset_game();
                }

                // Toggle fullscreen
                if g.game.input.key_pressed(KeyCode::F11) {
                    let fullscreen = match g.window.fullscreen() {
                        Some(_) => None,
                        None => Some(Fullscreen::Borderless(None)),
                    };
                    g.window.set_fullscreen(fullscreen);
                }

                // Resize the window
                if let Some(size) = g.game.input.window_resized() {
                    if let Err(err) = g.game.pixels.resize_surface(size.width, size.height) {
                        log_error("pixels.resize_surface", &err);
                        g.exit();
                    }
                }
            }
        },
    );
    res.map_err(|e| Error::UserDefined(Box::new(e)))
}

fn log_error<E: std::error::Error + 'static>(method_name: &str, err: &E) {
    error!("{method_name}() failed: {err}");
    for source in err.sources().skip(1) {
        error!("  Caused by: {source}");
    }
}

/// Generate a pseudorandom seed for the game's PRNG.
fn generate_seed() -> Result<(u64, u64), Error> {
    use byteorder::{ByteOrder, NativeEndian};
    use getrandom::getrandom;

    let mut seed = [0_u8; 16];

    getrandom(&mut seed).map_err(|err| Error::UserDefined(Box::new(err)))?;

    Ok((
        NativeEndian::read_u64(&seed[0..8]),
        NativeEndian::read_u64(&seed[8..16]),
    ))
}
