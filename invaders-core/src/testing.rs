//! Test doubles shared by the unit tests.

use std::collections::VecDeque;

use crate::geo::Vec2D;
use crate::screen::{Image, Surface};
use crate::Random;

/// A surface that remembers every draw instead of rasterizing it.
#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pub(crate) draws: Vec<(Image, Vec2D)>,
}

impl Surface for RecordingSurface {
    fn draw(&mut self, image: &Image, pos: Vec2D) {
        self.draws.push((image.clone(), pos));
    }
}

/// Replays a fixed script of values, then repeats `fallback` forever.
///
/// Every value is reduced modulo the requested range.
#[derive(Debug)]
pub(crate) struct ScriptedRandom {
    script: VecDeque<u32>,
    fallback: u32,
}

impl ScriptedRandom {
    pub(crate) fn new(script: &[u32], fallback: u32) -> ScriptedRandom {
        ScriptedRandom {
            script: script.iter().copied().collect(),
            fallback,
        }
    }

    pub(crate) fn constant(value: u32) -> ScriptedRandom {
        ScriptedRandom::new(&[], value)
    }
}

impl Random for ScriptedRandom {
    fn below(&mut self, n: u32) -> u32 {
        self.script.pop_front().unwrap_or(self.fallback) % n
    }
}
