//! A Space Invaders clone rendered into a plain RGBA frame buffer.
//!
//! The game is built from [`Sprite`]s that ease toward their targets, detect collisions and play
//! an explosion when hit. A [`Formation`] moves a grid of ufos back and forth, dropping bombs on
//! the player, and the [`World`] ties everything together into a playable game with a
//! leaderboard.

#![deny(clippy::all)]
#![forbid(unsafe_code)]

use randomize::PCG32;
use std::time::Duration;

pub use crate::controls::{Controls, Direction, TextInput};
pub use crate::error::Error;
pub use crate::formation::{Formation, FormationConfig, FormationStatus};
pub use crate::geo::{Point, Rect, Vec2D};
pub use crate::leaderboard::{AddScore, Leaderboard, LocalLeaderboard, UserScore, MIN_NAME_LEN};
pub use crate::loader::{load_image, rescale_to_fit, thumbnail, Assets, Frame};
pub use crate::screen::{blit, Drawable, Image, Screen, Surface};
pub use crate::sprites::{
    ease_speed_up, ease_standard, Animation, Hitbox, Sprite, SpriteEvent, SpriteId, SpriteOptions,
};
pub use crate::world::{Stage, World};

mod controls;
mod debug;
mod error;
mod formation;
mod geo;
mod leaderboard;
mod loader;
mod screen;
mod sprites;
#[cfg(test)]
mod testing;
mod world;

/// The screen width is constant (units are in pixels)
pub const WIDTH: usize = 640;
/// The screen height is constant (units are in pixels)
pub const HEIGHT: usize = 480;

// Fixed time step (60 fps)
pub const FPS: usize = 60;
pub const TIME_STEP: Duration = Duration::from_nanos(1_000_000_000 / FPS as u64);

/// A source of uniformly distributed numbers.
pub trait Random {
    /// A number in `0..n`. `n` must not be zero.
    fn below(&mut self, n: u32) -> u32;
}

impl Random for PCG32 {
    fn below(&mut self, n: u32) -> u32 {
        self.next_u32() % n
    }
}
