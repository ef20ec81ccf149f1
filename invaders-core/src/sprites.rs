//! Sprites are the movable, animated and collidable entities of the game.
//!
//! A [`Sprite`] tracks two positions: the logical `target` requested by its owner and the
//! `current` position it is drawn at. With soft movement enabled the current position eases
//! toward the target a little on every rendered frame.
//!
//! Sprites never call back into the game. Anything worth reacting to (a collision, the end of
//! the explosion sequence) is pushed as a [`SpriteEvent`] onto the queue passed to
//! [`Sprite::render`], and the owner drains that queue after rendering.

use crate::error::Error;
use crate::geo::{Rect, Vec2D};
use crate::screen::{Image, Surface};
use crate::{HEIGHT, WIDTH};
use log::trace;

/// Identifies a sprite to its owner and to collision reports.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum SpriteId {
    Player,
    Ufo(u32),
    Bullet(u32),
    Bomb(u32),
}

/// How a sprite cycles through its frames.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Animation {
    /// Always show the first frame.
    Still,
    /// Cycle frames on every render.
    #[default]
    Always,
    /// Cycle frames only while the sprite is easing toward its target.
    OnMove,
}

/// Things that happened to a sprite while it was rendered.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SpriteEvent {
    /// The sprite overlaps every sprite in `hits` during this frame.
    CollisionDetected { id: SpriteId, hits: Vec<SpriteId> },
    /// The post-collision animation has played to the end.
    AnimationComplete { id: SpriteId },
}

/// A snapshot of a sprite's collision rectangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hitbox {
    pub id: SpriteId,
    pub rect: Rect,
}

/// Construction parameters for a [`Sprite`].
#[derive(Clone, Debug)]
pub struct SpriteOptions {
    pub id: SpriteId,
    /// Initial target position.
    pub position: Vec2D,
    /// The area the sprite must stay within.
    pub bounds: Vec2D,
    /// Ease toward the target instead of jumping to it.
    pub soft: bool,
    /// Easing divisors for each axis. Larger is slower.
    pub soft_rate: Vec2D,
    /// Accelerate vertically while approaching the target (projectiles).
    pub speed_up: bool,
    pub animation: Animation,
    /// Number of renders to hold each frame, minus one.
    pub animation_speed: u32,
    /// Only these sprites are considered for collisions.
    pub collides_with: Vec<SpriteId>,
    /// Images played once by [`Sprite::trigger_post_collision_animation`].
    pub explosion: Vec<Image>,
    /// Number of renders to hold each explosion image.
    pub explosion_delay: u32,
}

/// A movable, animated entity.
#[derive(Debug)]
pub struct Sprite {
    id: SpriteId,
    frames: Vec<Image>,
    frame: usize,
    size: Vec2D,
    target: Vec2D,
    current: Vec2D,
    bounds: Vec2D,
    soft: bool,
    soft_rate: Vec2D,
    speed_up: bool,
    animation: Animation,
    animation_speed: u32,
    animation_count: u32,
    collides_with: Vec<SpriteId>,
    explosion: Vec<Image>,
    explosion_delay: u32,
    exploding: Option<Explosion>,
    closed: bool,
}

/// Progress through the post-collision animation.
#[derive(Copy, Clone, Debug, Default)]
struct Explosion {
    image: usize,
    dt: u32,
}

impl Default for SpriteOptions {
    fn default() -> Self {
        Self {
            id: SpriteId::Player,
            position: Vec2D::default(),
            bounds: Vec2D::new(WIDTH as f32, HEIGHT as f32),
            soft: false,
            soft_rate: Vec2D::new(20.0, 20.0),
            speed_up: false,
            animation: Animation::Always,
            animation_speed: 50,
            collides_with: Vec::new(),
            explosion: Vec::new(),
            explosion_delay: 1,
        }
    }
}

impl Sprite {
    /// Create a sprite of the given `size` that cycles through `frames`.
    ///
    /// The initial position is requested with the usual bounds checks. A soft sprite starts
    /// drawn at the origin and eases toward it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when `frames` is empty, the size is not positive
    /// or an easing rate is below 1.
    pub fn new(frames: Vec<Image>, size: Vec2D, options: SpriteOptions) -> Result<Sprite, Error> {
        if frames.is_empty() {
            return Err(Error::InvalidConfiguration(format!(
                "{:?} requires at least one image",
                options.id
            )));
        }
        if !(size.x > 0.0 && size.y > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "{:?} has a non-positive size",
                options.id
            )));
        }
        if !(options.soft_rate.x >= 1.0 && options.soft_rate.y >= 1.0) {
            return Err(Error::InvalidConfiguration(format!(
                "{:?} easing rates must be at least 1",
                options.id
            )));
        }

        let mut sprite = Sprite {
            id: options.id,
            frames,
            frame: 0,
            size,
            target: Vec2D::default(),
            current: Vec2D::default(),
            bounds: options.bounds,
            soft: options.soft,
            soft_rate: options.soft_rate,
            speed_up: options.speed_up,
            animation: options.animation,
            animation_speed: options.animation_speed,
            animation_count: options.animation_speed,
            collides_with: options.collides_with,
            explosion: options.explosion,
            explosion_delay: options.explosion_delay.max(1),
            exploding: None,
            closed: false,
        };

        if !sprite.set_x(options.position.x) || !sprite.set_y(options.position.y) {
            trace!("{:?} initial position is out of bounds", sprite.id);
        }

        Ok(sprite)
    }

    pub fn id(&self) -> SpriteId {
        self.id
    }

    /// Change the identity. Ignored once closed.
    pub fn set_id(&mut self, id: SpriteId) {
        if !self.closed {
            self.id = id;
        }
    }

    /// The position the sprite is currently drawn at.
    pub fn position(&self) -> Vec2D {
        self.current
    }

    /// The position the sprite is moving toward.
    pub fn target(&self) -> Vec2D {
        self.target
    }

    pub fn size(&self) -> Vec2D {
        self.size
    }

    /// The drawn rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_size(self.current, self.size)
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox {
            id: self.id,
            rect: self.rect(),
        }
    }

    pub fn frame_index(&self) -> usize {
        self.frame
    }

    /// Request a new horizontal target.
    ///
    /// Returns `false` without changing anything when the sprite is closed or `x` lies outside
    /// `[0, bounds.x - width]`.
    pub fn set_x(&mut self, x: f32) -> bool {
        if self.closed || !self.accepts_x(x) {
            return false;
        }

        self.target.x = x;
        if !self.soft {
            self.current.x = x;
        }

        true
    }

    /// Request a new vertical target.
    ///
    /// Returns `false` without changing anything when the sprite is closed or `y` lies outside
    /// `[0, bounds.y - height]`.
    pub fn set_y(&mut self, y: f32) -> bool {
        if self.closed || !self.accepts_y(y) {
            return false;
        }

        self.target.y = y;
        if !self.soft {
            self.current.y = y;
        }

        true
    }

    /// Request a new target on both axes. Nothing changes unless both are in bounds.
    pub fn set_position(&mut self, pos: Vec2D) -> bool {
        if self.closed || !self.accepts(pos) {
            return false;
        }

        self.set_x(pos.x) && self.set_y(pos.y)
    }

    /// Shift the target horizontally.
    pub fn move_x(&mut self, dx: f32) -> bool {
        self.set_x(self.target.x + dx)
    }

    /// Shift the target vertically.
    pub fn move_y(&mut self, dy: f32) -> bool {
        self.set_y(self.target.y + dy)
    }

    /// Shift the target on both axes.
    pub fn move_by(&mut self, delta: Vec2D) -> bool {
        self.set_position(self.target + delta)
    }

    pub fn set_soft(&mut self, soft: bool) {
        self.soft = soft;
    }

    pub fn set_animation(&mut self, animation: Animation) {
        self.animation = animation;
    }

    /// `true` when `pos` would be accepted as a target.
    pub fn accepts(&self, pos: Vec2D) -> bool {
        self.accepts_x(pos.x) && self.accepts_y(pos.y)
    }

    /// `true` while the drawn position has not yet reached the target.
    pub fn is_moving(&self) -> bool {
        self.current != self.target
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Permanently retire the sprite.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Start playing the explosion images from the beginning.
    pub fn trigger_post_collision_animation(&mut self) {
        if !self.closed {
            self.exploding = Some(Explosion::default());
        }
    }

    pub fn in_post_collision_animation(&self) -> bool {
        self.exploding.is_some()
    }

    /// Draw the sprite and advance it by one frame.
    ///
    /// While exploding, only the explosion is drawn; once it is exhausted the next call pushes
    /// [`SpriteEvent::AnimationComplete`] and the sprite resumes normal rendering afterward.
    /// Otherwise the current frame is drawn, collisions against `candidates` are reported, the
    /// position eases one step and the animation advances.
    pub fn render<S>(
        &mut self,
        surface: &mut S,
        candidates: &[Hitbox],
        events: &mut Vec<SpriteEvent>,
    ) where
        S: Surface + ?Sized,
    {
        if self.closed {
            return;
        }

        if let Some(mut explosion) = self.exploding {
            if let Some(image) = self.explosion.get(explosion.image) {
                surface.draw(image, self.current);

                explosion.dt += 1;
                if explosion.dt >= self.explosion_delay {
                    explosion.image += 1;
                    explosion.dt = 0;
                }
                self.exploding = Some(explosion);
            } else {
                self.exploding = None;
                events.push(SpriteEvent::AnimationComplete { id: self.id });
            }

            return;
        }

        surface.draw(&self.frames[self.frame], self.current);
        self.detect_collisions(candidates, events);
        self.ease();
        self.step_frame();
    }

    fn accepts_x(&self, x: f32) -> bool {
        (0.0..=self.bounds.x - self.size.x).contains(&x)
    }

    fn accepts_y(&self, y: f32) -> bool {
        (0.0..=self.bounds.y - self.size.y).contains(&y)
    }

    fn detect_collisions(&self, candidates: &[Hitbox], events: &mut Vec<SpriteEvent>) {
        if self.collides_with.is_empty() {
            return;
        }

        let rect = self.rect();
        let hits: Vec<SpriteId> = candidates
            .iter()
            .filter(|other| other.id != self.id && self.collides_with.contains(&other.id))
            .filter(|other| rect.intersects(other.rect))
            .map(|other| other.id)
            .collect();

        if !hits.is_empty() {
            events.push(SpriteEvent::CollisionDetected { id: self.id, hits });
        }
    }

    fn ease(&mut self) {
        if !self.soft {
            return;
        }

        if self.speed_up {
            if !self.is_moving() {
                return;
            }

            self.current.x = ease_standard(self.current.x, self.target.x, self.soft_rate.x);
            self.current.y = match ease_speed_up(self.current.y, self.target.y, self.soft_rate.y)
            {
                Ok(y) => y,
                Err(err) => {
                    trace!("{:?}: {}, snapping to target", self.id, err);
                    self.target.y
                }
            };

            return;
        }

        self.current.x = ease_standard(self.current.x, self.target.x, self.soft_rate.x);
        self.current.y = ease_standard(self.current.y, self.target.y, self.soft_rate.y);
    }

    fn step_frame(&mut self) {
        match self.animation {
            Animation::Still => return,
            Animation::OnMove if !self.is_moving() => return,
            _ => (),
        }

        if self.animation_count == 0 {
            self.animation_count = self.animation_speed;
            self.frame = (self.frame + 1) % self.frames.len();
        } else {
            self.animation_count -= 1;
        }
    }
}

/// Move `current` a `1 / rate` fraction of the way to `target`.
///
/// Snaps to `target` once less than one unit remains.
pub fn ease_standard(current: f32, target: f32, rate: f32) -> f32 {
    let next = current + (target - current) / rate;

    if (target - next).abs() < 1.0 {
        target
    } else {
        next
    }
}

/// Move `current` toward `target` by `rate * 5 / distance`, a step that grows as the distance
/// shrinks.
///
/// # Errors
///
/// Returns [`Error::DegenerateEasing`] when no distance remains or when the step would reach or
/// pass the target.
pub fn ease_speed_up(current: f32, target: f32, rate: f32) -> Result<f32, Error> {
    let distance = target - current;
    if distance == 0.0 {
        return Err(Error::DegenerateEasing);
    }

    let step = rate * 5.0 / distance;
    if !step.is_finite() || step.abs() >= distance.abs() {
        return Err(Error::DegenerateEasing);
    }

    Ok(current + step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSurface;

    const RED: [u8; 4] = [255, 0, 0, 255];

    fn images(count: usize) -> Vec<Image> {
        (0..count).map(|_| Image::solid(1, 1, RED)).collect()
    }

    fn sprite(options: SpriteOptions) -> Sprite {
        Sprite::new(images(1), Vec2D::new(40.0, 40.0), options).unwrap()
    }

    #[test]
    fn set_position_within_bounds_is_idempotent() {
        let mut s = sprite(SpriteOptions::default());

        for &x in &[0.0, 123.5, 600.0] {
            assert!(s.set_x(x));
            assert!(s.set_x(x));
            assert_eq!(s.target().x, x);
            assert_eq!(s.position().x, x);
        }
        for &y in &[0.0, 440.0] {
            assert!(s.set_y(y));
            assert!(s.set_y(y));
            assert_eq!(s.target().y, y);
        }
    }

    #[test]
    fn set_position_out_of_bounds_is_rejected() {
        let mut s = sprite(SpriteOptions {
            position: Vec2D::new(10.0, 20.0),
            ..SpriteOptions::default()
        });

        assert!(!s.set_x(-1.0));
        assert!(!s.set_x(600.5));
        assert!(!s.set_x(f32::NAN));
        assert!(!s.set_y(440.1));
        assert!(!s.move_y(-21.0));
        assert_eq!(s.target(), Vec2D::new(10.0, 20.0));
        assert_eq!(s.position(), Vec2D::new(10.0, 20.0));
    }

    #[test]
    fn move_by_checks_both_axes_first() {
        let mut s = sprite(SpriteOptions {
            position: Vec2D::new(10.0, 20.0),
            ..SpriteOptions::default()
        });

        assert!(!s.move_by(Vec2D::new(5.0, 1000.0)));
        assert_eq!(s.target(), Vec2D::new(10.0, 20.0));

        assert!(s.move_by(Vec2D::new(5.0, -20.0)));
        assert_eq!(s.target(), Vec2D::new(15.0, 0.0));
    }

    #[test]
    fn standard_easing_converges_without_overshoot() {
        let mut s = sprite(SpriteOptions {
            soft: true,
            ..SpriteOptions::default()
        });
        let mut surface = RecordingSurface::default();
        let mut events = Vec::new();

        assert!(s.set_position(Vec2D::new(100.0, 300.0)));
        assert_eq!(s.position(), Vec2D::new(0.0, 0.0));
        assert!(s.is_moving());

        let mut distance = (300.0_f32).max(100.0);
        let mut steps = 0;
        while s.is_moving() {
            s.render(&mut surface, &[], &mut events);
            let pos = s.position();
            assert!(pos.x <= 100.0 && pos.y <= 300.0, "overshoot at {:?}", pos);

            let remaining = (100.0 - pos.x).max(300.0 - pos.y);
            assert!(remaining < distance, "distance must shrink");
            distance = remaining;

            steps += 1;
            assert!(steps < 200, "easing must converge");
        }

        assert_eq!(s.position(), Vec2D::new(100.0, 300.0));
        assert!(events.is_empty());
    }

    #[test]
    fn hard_movement_snaps() {
        let mut s = sprite(SpriteOptions::default());

        assert!(s.set_position(Vec2D::new(50.0, 60.0)));
        assert!(!s.is_moving());
        assert_eq!(s.position(), Vec2D::new(50.0, 60.0));
    }

    #[test]
    fn speed_up_step_grows_near_target() {
        let far = ease_speed_up(0.0, 400.0, 40.0).unwrap();
        let near = ease_speed_up(350.0, 400.0, 40.0).unwrap() - 350.0;

        assert!(far > 0.0 && near > far);
        assert!(ease_speed_up(100.0, 0.0, 40.0).unwrap() < 100.0);
    }

    #[test]
    fn speed_up_step_is_guarded() {
        assert!(matches!(
            ease_speed_up(400.0, 400.0, 40.0),
            Err(Error::DegenerateEasing)
        ));
        assert!(matches!(
            ease_speed_up(395.0, 400.0, 40.0),
            Err(Error::DegenerateEasing)
        ));
    }

    #[test]
    fn speed_up_sprite_lands_on_target() {
        let mut s = Sprite::new(
            images(1),
            Vec2D::new(20.0, 20.0),
            SpriteOptions {
                id: SpriteId::Bomb(1),
                position: Vec2D::new(100.0, 45.0),
                soft_rate: Vec2D::new(20.0, 40.0),
                speed_up: true,
                animation: Animation::OnMove,
                ..SpriteOptions::default()
            },
        )
        .unwrap();
        s.set_soft(true);
        assert!(s.set_y(450.0));

        let mut surface = RecordingSurface::default();
        let mut events = Vec::new();
        let mut frames = 0;
        while s.is_moving() {
            s.render(&mut surface, &[], &mut events);
            assert!(s.position().y.is_finite());
            assert!(s.position().y <= 450.0);
            frames += 1;
            assert!(frames < 1000, "bomb must land");
        }

        assert_eq!(s.position(), Vec2D::new(100.0, 450.0));
    }

    #[test]
    fn collision_reports_overlapping_set_once() {
        let mut a = Sprite::new(
            images(1),
            Vec2D::new(20.0, 20.0),
            SpriteOptions {
                id: SpriteId::Bullet(0),
                collides_with: vec![SpriteId::Ufo(0), SpriteId::Ufo(1)],
                ..SpriteOptions::default()
            },
        )
        .unwrap();
        let candidates = [
            Hitbox {
                id: SpriteId::Ufo(0),
                rect: Rect::from_size(Vec2D::new(10.0, 10.0), Vec2D::new(20.0, 20.0)),
            },
            Hitbox {
                id: SpriteId::Ufo(1),
                rect: Rect::from_size(Vec2D::new(25.0, 25.0), Vec2D::new(5.0, 5.0)),
            },
        ];
        let mut surface = RecordingSurface::default();
        let mut events = Vec::new();

        a.render(&mut surface, &candidates, &mut events);

        assert_eq!(
            events,
            vec![SpriteEvent::CollisionDetected {
                id: SpriteId::Bullet(0),
                hits: vec![SpriteId::Ufo(0)],
            }]
        );
    }

    #[test]
    fn collision_batches_every_hit_and_ignores_strangers() {
        let mut a = Sprite::new(
            images(1),
            Vec2D::new(20.0, 20.0),
            SpriteOptions {
                id: SpriteId::Bullet(3),
                collides_with: vec![SpriteId::Ufo(0), SpriteId::Ufo(1)],
                ..SpriteOptions::default()
            },
        )
        .unwrap();
        let rect = Rect::from_size(Vec2D::new(5.0, 5.0), Vec2D::new(10.0, 10.0));
        let candidates = [
            Hitbox { id: SpriteId::Ufo(0), rect },
            Hitbox { id: SpriteId::Ufo(1), rect },
            Hitbox { id: SpriteId::Ufo(2), rect },
            Hitbox { id: SpriteId::Bullet(3), rect },
        ];
        let mut surface = RecordingSurface::default();
        let mut events = Vec::new();

        a.render(&mut surface, &candidates, &mut events);

        assert_eq!(
            events,
            vec![SpriteEvent::CollisionDetected {
                id: SpriteId::Bullet(3),
                hits: vec![SpriteId::Ufo(0), SpriteId::Ufo(1)],
            }]
        );
    }

    #[test]
    fn post_collision_animation_completes_once() {
        let explosion = images(11);
        let mut s = Sprite::new(
            images(3),
            Vec2D::new(40.0, 40.0),
            SpriteOptions {
                id: SpriteId::Ufo(7),
                explosion: explosion.clone(),
                explosion_delay: 2,
                ..SpriteOptions::default()
            },
        )
        .unwrap();
        let mut surface = RecordingSurface::default();
        let mut events = Vec::new();

        s.trigger_post_collision_animation();
        for _ in 0..11 * 2 {
            s.render(&mut surface, &[], &mut events);
        }
        assert!(events.is_empty());
        assert_eq!(surface.draws.len(), 22);
        for (i, (image, _)) in surface.draws.iter().enumerate() {
            assert!(image.ptr_eq(&explosion[i / 2]), "draw {} shows the wrong image", i);
        }

        s.render(&mut surface, &[], &mut events);
        assert_eq!(events, vec![SpriteEvent::AnimationComplete { id: SpriteId::Ufo(7) }]);
        assert_eq!(surface.draws.len(), 22);
        assert!(!s.in_post_collision_animation());

        s.render(&mut surface, &[], &mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(surface.draws.len(), 23);
    }

    #[test]
    fn closed_sprite_is_inert() {
        let mut s = sprite(SpriteOptions {
            position: Vec2D::new(10.0, 10.0),
            ..SpriteOptions::default()
        });
        let mut surface = RecordingSurface::default();
        let mut events = Vec::new();

        s.close();
        s.close();
        assert!(s.is_closed());
        assert!(!s.set_x(20.0));
        assert!(!s.move_by(Vec2D::new(1.0, 1.0)));
        s.set_id(SpriteId::Bomb(9));
        assert_eq!(s.id(), SpriteId::Player);

        s.trigger_post_collision_animation();
        s.render(&mut surface, &[], &mut events);
        assert!(surface.draws.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn animation_modes() {
        let mut always = Sprite::new(
            images(3),
            Vec2D::new(10.0, 10.0),
            SpriteOptions {
                animation_speed: 2,
                ..SpriteOptions::default()
            },
        )
        .unwrap();
        let mut on_move = Sprite::new(
            images(3),
            Vec2D::new(10.0, 10.0),
            SpriteOptions {
                animation: Animation::OnMove,
                animation_speed: 0,
                ..SpriteOptions::default()
            },
        )
        .unwrap();
        let mut surface = RecordingSurface::default();
        let mut events = Vec::new();

        // Each frame is held for `animation_speed + 1` renders, wrapping around
        let mut seen = Vec::new();
        for _ in 0..9 {
            seen.push(always.frame_index());
            always.render(&mut surface, &[], &mut events);
        }
        assert_eq!(seen, vec![0, 0, 0, 1, 1, 1, 2, 2, 2]);
        assert_eq!(always.frame_index(), 0);

        for _ in 0..5 {
            on_move.render(&mut surface, &[], &mut events);
        }
        assert_eq!(on_move.frame_index(), 0);
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let empty = Sprite::new(Vec::new(), Vec2D::new(1.0, 1.0), SpriteOptions::default());
        assert!(matches!(empty, Err(Error::InvalidConfiguration(_))));

        let slow = Sprite::new(
            images(1),
            Vec2D::new(1.0, 1.0),
            SpriteOptions {
                soft_rate: Vec2D::new(0.5, 20.0),
                ..SpriteOptions::default()
            },
        );
        assert!(matches!(slow, Err(Error::InvalidConfiguration(_))));

        let flat = Sprite::new(images(1), Vec2D::new(0.0, 1.0), SpriteOptions::default());
        assert!(matches!(flat, Err(Error::InvalidConfiguration(_))));
    }
}
