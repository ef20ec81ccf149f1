//! The ufo formation and the bombs it drops.
//!
//! Every member of the grid shares a single horizontal translation (`block_x`). Each frame the
//! translation advances by `offset`; when any member would leave the play field the formation
//! reverses, speeds up and descends one step instead.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::error::Error;
use crate::geo::Vec2D;
use crate::loader::{Assets, Frame};
use crate::screen::{Image, Surface};
use crate::sprites::{Animation, Hitbox, Sprite, SpriteEvent, SpriteId, SpriteOptions};
use crate::{Random, HEIGHT, WIDTH};

/// Formation tuning.
#[derive(Clone, Debug)]
pub struct FormationConfig {
    pub cols: usize,
    pub rows: usize,
    /// Upper-left slot of the grid.
    pub origin: Vec2D,
    /// Distance between neighboring slots.
    pub spacing: Vec2D,
    pub ufo_size: Vec2D,
    /// The play field members must stay within.
    pub bounds: Vec2D,
    /// Initial horizontal step per frame. The sign is the direction.
    pub offset: f32,
    /// Added to the step magnitude on every bounce.
    pub speed_up: f32,
    /// Vertical drop on every bounce.
    pub descent: f32,
    /// The formation wins once a member's target reaches this line.
    pub loss_threshold: f32,
    pub explosion_delay: u32,
    /// A member becomes a bomb candidate with a `1 / bomb_chance` probability.
    pub bomb_chance: u32,
    pub first_bomb_delay: u32,
    pub bomb_delay_min: u32,
    pub bomb_delay_range: u32,
    pub bomb_size: Vec2D,
    pub bomb_target_y: f32,
    pub bomb_rate: f32,
}

/// What happened during one formation frame.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct FormationStatus {
    /// No members remain.
    pub cleared: bool,
    /// The formation descended onto the loss line.
    pub lost: bool,
    /// Number of bombs that hit the player.
    pub player_hits: u32,
}

/// A grid member.
#[derive(Debug)]
struct Ufo {
    sprite: Sprite,
    /// Horizontal slot position before translation.
    slot: f32,
}

/// The ufo grid and its bombs.
#[derive(Debug)]
pub struct Formation {
    config: FormationConfig,
    ufos: BTreeMap<SpriteId, Ufo>,
    bombs: BTreeMap<SpriteId, Sprite>,
    ship_rows: Vec<Vec<Image>>,
    explosion: Vec<Image>,
    bomb_image: Image,
    offset: f32,
    block_x: f32,
    frame: u32,
    bomb_delay: u32,
    next_bomb: u32,
    events: Vec<SpriteEvent>,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            cols: 5,
            rows: 3,
            origin: Vec2D::new(1.0, 45.0),
            spacing: Vec2D::new(80.0, 60.0),
            ufo_size: Vec2D::new(40.0, 40.0),
            bounds: Vec2D::new(WIDTH as f32, HEIGHT as f32),
            offset: 2.0,
            speed_up: 0.3,
            descent: 10.0,
            loss_threshold: 380.0,
            explosion_delay: 2,
            bomb_chance: 8,
            first_bomb_delay: 200,
            bomb_delay_min: 20,
            bomb_delay_range: 120,
            bomb_size: Vec2D::new(20.0, 20.0),
            bomb_target_y: 450.0,
            bomb_rate: 40.0,
        }
    }
}

impl Formation {
    /// Create an empty formation. Call [`Formation::init`] to populate the grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for an empty grid, a non-positive step or a zero
    /// bomb chance.
    pub fn new(assets: &Assets, config: FormationConfig) -> Result<Formation, Error> {
        if config.cols == 0 || config.rows == 0 {
            return Err(Error::InvalidConfiguration(
                "the formation needs at least one row and column".into(),
            ));
        }
        if !config.offset.is_finite()
            || config.offset <= 0.0
            || config.bomb_chance == 0
            || config.bomb_delay_range == 0
        {
            return Err(Error::InvalidConfiguration(
                "the formation step and bomb odds must be positive".into(),
            ));
        }

        let ship_rows = (0..config.rows)
            .map(|row| assets.sequence(&Frame::ufo_row(row)))
            .collect();

        Ok(Formation {
            offset: config.offset,
            bomb_delay: config.first_bomb_delay,
            config,
            ufos: BTreeMap::new(),
            bombs: BTreeMap::new(),
            ship_rows,
            explosion: assets.sequence(&Frame::explosion()),
            bomb_image: assets.get(Frame::Bomb).clone(),
            block_x: 0.0,
            frame: 0,
            next_bomb: 0,
            events: Vec::new(),
        })
    }

    /// Fill every grid slot with a fresh ufo.
    ///
    /// The current speed is kept, so a formation re-initialised for the next level is as fast
    /// as the last one was.
    pub fn init(&mut self) -> Result<(), Error> {
        self.ufos.clear();
        self.block_x = 0.0;

        let config = &self.config;
        for col in 0..config.cols {
            for row in 0..config.rows {
                let id = SpriteId::Ufo((col * config.rows + row) as u32);
                let slot = config.origin.x + col as f32 * config.spacing.x;
                let position = Vec2D::new(slot, config.origin.y + row as f32 * config.spacing.y);
                let sprite = Sprite::new(
                    self.ship_rows[row].clone(),
                    config.ufo_size,
                    SpriteOptions {
                        id,
                        position,
                        bounds: config.bounds,
                        soft: true,
                        animation: Animation::Always,
                        explosion: self.explosion.clone(),
                        explosion_delay: config.explosion_delay,
                        ..SpriteOptions::default()
                    },
                )?;

                self.ufos.insert(id, Ufo { sprite, slot });
            }
        }

        debug!(
            "Formation ready with {} ufos, step {}",
            self.ufos.len(),
            self.offset
        );

        Ok(())
    }

    /// Render and advance the formation by one frame.
    ///
    /// `player` is the only thing bombs can hit; pass `None` to let them fall through.
    pub fn advance_and_render<S, R>(
        &mut self,
        surface: &mut S,
        rng: &mut R,
        player: Option<Hitbox>,
    ) -> FormationStatus
    where
        S: Surface + ?Sized,
        R: Random + ?Sized,
    {
        let mut status = FormationStatus::default();

        // Draw the fleet and pick the members that may drop a bomb
        let mut candidates = Vec::new();
        for (&id, ufo) in self.ufos.iter_mut() {
            ufo.sprite.render(surface, &[], &mut self.events);

            if !ufo.sprite.in_post_collision_animation()
                && rng.below(self.config.bomb_chance) == 3 % self.config.bomb_chance
            {
                candidates.push(id);
            }
        }
        for event in self.events.drain(..) {
            if let SpriteEvent::AnimationComplete { id } = event {
                if let Some(mut ufo) = self.ufos.remove(&id) {
                    ufo.sprite.close();
                    debug!("{:?} destroyed", id);
                }
            }
        }
        candidates.retain(|id| self.ufos.contains_key(id));

        self.translate(&mut status);

        // Bombs
        let targets: Vec<Hitbox> = player.into_iter().collect();
        for bomb in self.bombs.values_mut() {
            bomb.render(surface, &targets, &mut self.events);
        }
        for event in self.events.drain(..) {
            if let SpriteEvent::CollisionDetected { id, .. } = event {
                if let Some(mut bomb) = self.bombs.remove(&id) {
                    bomb.close();
                    status.player_hits += 1;
                }
            }
        }
        self.bombs.retain(|_, bomb| bomb.is_moving());

        if self.frame == self.bomb_delay {
            self.frame = 0;
            self.bomb_delay = rng.below(self.config.bomb_delay_range) + self.config.bomb_delay_min;

            if !candidates.is_empty() {
                let id = candidates[rng.below(candidates.len() as u32) as usize];
                if let Err(err) = self.drop_bomb(id) {
                    warn!("{:?} could not drop a bomb: {}", id, err);
                }
            }
        } else {
            self.frame += 1;
        }

        status.cleared = self.ufos.is_empty();

        status
    }

    /// Collision targets for the members that are still in play.
    pub fn hitboxes(&self) -> Vec<Hitbox> {
        self.ufos
            .values()
            .filter(|ufo| !ufo.sprite.in_post_collision_animation())
            .map(|ufo| ufo.sprite.hitbox())
            .collect()
    }

    /// Start the explosion of a member. Returns `false` if it is gone or already exploding.
    pub fn explode(&mut self, id: SpriteId) -> bool {
        match self.ufos.get_mut(&id) {
            Some(ufo) if !ufo.sprite.in_post_collision_animation() => {
                ufo.sprite.trigger_post_collision_animation();
                true
            }
            _ => false,
        }
    }

    /// Remove a member immediately, without an explosion.
    pub fn remove(&mut self, id: SpriteId) -> bool {
        match self.ufos.remove(&id) {
            Some(mut ufo) => {
                ufo.sprite.close();
                true
            }
            None => false,
        }
    }

    /// Number of members, exploding or not.
    pub fn len(&self) -> usize {
        self.ufos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ufos.is_empty()
    }

    /// The level is won once every member is gone.
    pub fn is_cleared(&self) -> bool {
        self.is_empty()
    }

    /// The signed horizontal step per frame.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn bombs(&self) -> impl Iterator<Item = &Sprite> {
        self.bombs.values()
    }

    pub fn ufo(&self, id: SpriteId) -> Option<&Sprite> {
        self.ufos.get(&id).map(|ufo| &ufo.sprite)
    }

    pub fn ufos(&self) -> impl Iterator<Item = &Sprite> {
        self.ufos.values().map(|ufo| &ufo.sprite)
    }

    /// Move the block sideways, or bounce it off the edge of the play field.
    fn translate(&mut self, status: &mut FormationStatus) {
        let next_x = self.block_x + self.offset;
        let hit_edge = self.ufos.values().any(|ufo| {
            let target = Vec2D::new(next_x + ufo.slot, ufo.sprite.target().y);

            !ufo.sprite.accepts(target)
        });

        if !hit_edge {
            self.block_x = next_x;
            for ufo in self.ufos.values_mut() {
                ufo.sprite.set_x(next_x + ufo.slot);
            }

            return;
        }

        self.offset = -self.offset.signum() * (self.offset.abs() + self.config.speed_up);
        for ufo in self.ufos.values_mut() {
            ufo.sprite.move_y(self.config.descent);

            if ufo.sprite.target().y >= self.config.loss_threshold {
                status.lost = true;
            }
        }

        debug!("Formation bounced, step is now {}", self.offset);
    }

    fn drop_bomb(&mut self, from: SpriteId) -> Result<(), Error> {
        let position = match self.ufos.get(&from) {
            Some(ufo) => ufo.sprite.position(),
            None => return Ok(()),
        };

        self.next_bomb += 1;
        let id = SpriteId::Bomb(self.next_bomb);
        let mut bomb = Sprite::new(
            vec![self.bomb_image.clone()],
            self.config.bomb_size,
            SpriteOptions {
                id,
                position,
                bounds: self.config.bounds,
                soft_rate: Vec2D::new(20.0, self.config.bomb_rate),
                speed_up: true,
                animation: Animation::OnMove,
                collides_with: vec![SpriteId::Player],
                ..SpriteOptions::default()
            },
        )?;
        bomb.set_soft(true);
        bomb.set_y(self.config.bomb_target_y);

        debug!("{:?} dropped {:?} at {:?}", from, id, position);
        self.bombs.insert(id, bomb);

        Ok(())
    }
}
