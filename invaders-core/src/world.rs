//! The game itself: title screen, play field, name entry and leaderboard.

use std::collections::BTreeMap;

use log::{debug, error, info, warn};
use randomize::PCG32;

use crate::controls::{Controls, Direction, TextInput};
use crate::debug;
use crate::error::Error;
use crate::formation::{Formation, FormationConfig, FormationStatus};
use crate::geo::{Point, Vec2D};
use crate::leaderboard::{Leaderboard, UserScore, MIN_NAME_LEN};
use crate::loader::{thumbnail, Assets, Frame};
use crate::screen::{Image, Screen, Surface};
use crate::sprites::{Animation, Sprite, SpriteEvent, SpriteId, SpriteOptions};
use crate::{HEIGHT, WIDTH};

// Game rules
const LIVES: u32 = 3;
const LEVELS: u32 = 4;
// Frames to show the won or lost image before name entry
const GAME_OVER_FRAMES: u32 = 120;

// Player positioning
const PLAYER_SIZE: Vec2D = Vec2D::new(50.0, 50.0);
const PLAYER_START: Vec2D = Vec2D::new((WIDTH as f32 - 50.0) / 2.0, 430.0);
const PLAYER_RATE: Vec2D = Vec2D::new(20.0, 60.0);
const PLAYER_SPEED: f32 = 5.0;

// Projectile positioning
const BULLET_SIZE: Vec2D = Vec2D::new(20.0, 20.0);
const BULLET_OFFSET: Vec2D = Vec2D::new(15.0, -5.0);
const BULLET_RATE: Vec2D = Vec2D::new(20.0, 50.0);

// Name entry
const MAX_NAME_LEN: usize = 20;
const CURSOR_PERIOD: u32 = 100;
const INPUT_BOX: Point = Point::new(200, 135);
const GLYPH_WIDTH: i32 = 10;

// Colors
const WHITE: [u8; 4] = [255, 255, 255, 255];
const GRAY: [u8; 4] = [33, 33, 33, 255];
const LIGHT_GRAY: [u8; 4] = [200, 200, 200, 255];
const YELLOW: [u8; 4] = [255, 220, 0, 255];
const BLUE: [u8; 4] = [40, 90, 220, 255];
const GREEN: [u8; 4] = [40, 200, 90, 255];

/// Which screen the game is showing.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Stage {
    /// Title screen.
    #[default]
    Intro,
    Playing,
    /// The player types a name for the leaderboard.
    ScoreEntry,
    /// The top ten scores.
    Leaderboard,
}

/// The end of a game, shown for a little while before name entry.
#[derive(Copy, Clone, Debug)]
struct GameOver {
    won: bool,
    frames: u32,
}

#[derive(Debug)]
pub struct World {
    stage: Stage,
    assets: Assets,
    config: FormationConfig,
    formation: Formation,
    player: Sprite,
    bullets: BTreeMap<SpriteId, Sprite>,
    next_bullet: u32,
    life_icon: Image,
    lives: u32,
    level: u32,
    score: u32,
    game_over: Option<GameOver>,
    name: String,
    cursor: u32,
    scores: Option<Vec<UserScore>>,
    leaderboard: Box<dyn Leaderboard>,
    fire_held: bool,
    events: Vec<SpriteEvent>,
    screen: Vec<u8>,
    prng: PCG32,
    debug: bool,
}

impl World {
    /// Create a new `World` showing the title screen.
    ///
    /// # Arguments
    ///
    /// * `assets`: Images for every sprite and screen.
    /// * `config`: Formation tuning, validated here.
    /// * `seed`: Seed for the PRNG.
    /// * `debug`: Enable debug mode (draws hitboxes).
    /// * `leaderboard`: Where high scores are kept.
    pub fn new(
        assets: Assets,
        config: FormationConfig,
        seed: (u64, u64),
        debug: bool,
        leaderboard: Box<dyn Leaderboard>,
    ) -> Result<World, Error> {
        let mut formation = Formation::new(&assets, config.clone())?;
        formation.init()?;
        let player = make_player(&assets)?;
        let life_icon = thumbnail(assets.get(Frame::Player), 20, 20);

        // Create a screen with the correct size
        let screen = vec![0; WIDTH * HEIGHT * 4];

        Ok(World {
            stage: Stage::Intro,
            assets,
            config,
            formation,
            player,
            bullets: BTreeMap::new(),
            next_bullet: 0,
            life_icon,
            lives: LIVES,
            level: 1,
            score: 0,
            game_over: None,
            name: String::new(),
            cursor: 0,
            scores: None,
            leaderboard,
            fire_held: false,
            events: Vec::new(),
            screen,
            prng: PCG32::seed(seed.0, seed.1),
            debug,
        })
    }

    /// Advance one frame and render it to the internal screen.
    pub fn update(&mut self, controls: &Controls) {
        match self.stage {
            Stage::Intro => self.step_intro(controls),
            Stage::Playing => self.step_game(controls),
            Stage::ScoreEntry => self.step_score_entry(controls),
            Stage::Leaderboard => self.step_leaderboard(controls),
        }
    }

    /// Draw the last rendered frame to the screen.
    ///
    /// Calling this method more than once without an `update` call between draws the same frame.
    pub fn draw(&self, screen: &mut [u8]) {
        screen.copy_from_slice(&self.screen);
    }

    /// Abandon the current game and return to the title screen.
    pub fn reset_game(&mut self) {
        self.stage = Stage::Intro;
        self.bullets.clear();
        self.game_over = None;
        self.lives = LIVES;
        self.level = 1;
        self.score = 0;
        self.name.clear();
        self.scores = None;
        info!("Game reset");
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    fn step_intro(&mut self, controls: &Controls) {
        if controls.confirm {
            self.start_game();
        } else if controls.scores {
            self.stage = Stage::Leaderboard;
            self.scores = None;
        }

        let mut screen = Screen::new(&mut self.screen, WIDTH, HEIGHT);
        screen.clear();
        screen.draw(self.assets.get(Frame::Title), Vec2D::default());

        // Play and Scores buttons
        screen.fill(Point::new(50, 400), Point::new(180, 428), BLUE);
        screen.fill(Point::new(450, 400), Point::new(585, 428), GREEN);
    }

    fn start_game(&mut self) {
        let ready = Formation::new(&self.assets, self.config.clone()).and_then(|mut formation| {
            formation.init()?;
            let player = make_player(&self.assets)?;

            Ok((formation, player))
        });

        match ready {
            Ok((formation, player)) => {
                self.formation = formation;
                self.player = player;
                self.bullets.clear();
                self.game_over = None;
                self.lives = LIVES;
                self.level = 1;
                self.score = 0;
                self.stage = Stage::Playing;
                info!("New game started");
            }
            Err(err) => error!("Cannot start a game: {}", err),
        }
    }

    fn step_game(&mut self, controls: &Controls) {
        if let Some(game_over) = &mut self.game_over {
            game_over.frames += 1;
            let frame = if game_over.won { Frame::Won } else { Frame::Lost };
            let done = game_over.frames >= GAME_OVER_FRAMES;

            let mut screen = Screen::new(&mut self.screen, WIDTH, HEIGHT);
            screen.clear();
            screen.draw(self.assets.get(frame), Vec2D::default());

            if done {
                self.game_over = None;
                self.name.clear();
                self.cursor = 0;
                self.stage = Stage::ScoreEntry;
            }

            return;
        }

        // Handle player movement
        match controls.direction {
            Direction::Left => {
                self.player.move_x(-PLAYER_SPEED);
            }
            Direction::Right => {
                self.player.move_x(PLAYER_SPEED);
            }
            Direction::Still => (),
        }

        // Only the first frame of a press fires
        if controls.fire && !self.fire_held {
            self.fire();
        }
        self.fire_held = controls.fire;

        let mut screen = Screen::new(&mut self.screen, WIDTH, HEIGHT);
        screen.clear();
        screen.draw(self.assets.get(Frame::Sky), Vec2D::default());

        // The player resumes normal rendering after its explosion; nothing else to do
        self.player.render(&mut screen, &[], &mut self.events);
        self.events.clear();

        // Bullets against the ufos that can still be hit
        let targets = self.formation.hitboxes();
        for bullet in self.bullets.values_mut() {
            bullet.render(&mut screen, &targets, &mut self.events);
        }
        for event in self.events.drain(..) {
            if let SpriteEvent::CollisionDetected { id, hits } = event {
                if let Some(mut bullet) = self.bullets.remove(&id) {
                    bullet.close();
                }
                for ufo in hits {
                    if self.formation.explode(ufo) {
                        self.score += 1;
                        debug!("{:?} shot {:?}, score {}", id, ufo, self.score);
                    }
                }
            }
        }
        self.bullets.retain(|_, bullet| bullet.is_moving());

        // The player is out of harm's way while exploding
        let player = if self.player.in_post_collision_animation() {
            None
        } else {
            Some(self.player.hitbox())
        };
        let status = self
            .formation
            .advance_and_render(&mut screen, &mut self.prng, player);

        draw_hud(&mut screen, &self.life_icon, self.lives, self.level);

        if self.debug {
            debug::draw_formation(&mut screen, &self.formation);
            debug::draw_bullets(&mut screen, &self.bullets);
            debug::draw_player(&mut screen, &self.player);
        }

        self.settle(status);
    }

    /// Apply the outcome of a formation frame.
    fn settle(&mut self, status: FormationStatus) {
        if status.player_hits > 0 {
            self.lives = self.lives.saturating_sub(status.player_hits);
            self.player.trigger_post_collision_animation();
            info!("Player hit, {} lives left", self.lives);
        }

        if status.lost || self.lives == 0 {
            self.finish(false);
        } else if status.cleared {
            if self.level >= LEVELS {
                self.finish(true);
            } else {
                self.level += 1;
                self.bullets.clear();
                if let Err(err) = self.formation.init() {
                    error!("Cannot set up level {}: {}", self.level, err);
                }
                info!("Level {}", self.level);
            }
        }
    }

    fn finish(&mut self, won: bool) {
        info!(
            "Game {} at level {} with score {}",
            if won { "won" } else { "lost" },
            self.level,
            self.score
        );
        self.game_over = Some(GameOver { won, frames: 0 });
    }

    fn fire(&mut self) {
        self.next_bullet += 1;
        let id = SpriteId::Bullet(self.next_bullet);
        let position = self.player.target() + BULLET_OFFSET;
        let targets = self.formation.hitboxes().iter().map(|hit| hit.id).collect();

        match make_bullet(&self.assets, id, position, targets) {
            Ok(bullet) => {
                self.bullets.insert(id, bullet);
            }
            Err(err) => warn!("Cannot fire {:?}: {}", id, err),
        }
    }

    fn step_score_entry(&mut self, controls: &Controls) {
        for input in &controls.text {
            match *input {
                TextInput::Char(c)
                    if (' '..='~').contains(&c) && self.name.len() < MAX_NAME_LEN =>
                {
                    self.name.push(c);
                }
                TextInput::Backspace => {
                    self.name.pop();
                }
                TextInput::Char(_) => (),
            }
        }
        self.cursor = (self.cursor + 1) % CURSOR_PERIOD;

        if controls.cancel {
            self.stage = Stage::Intro;
        } else if controls.confirm && self.name.len() >= MIN_NAME_LEN {
            if let Err(err) = self.leaderboard.add_score(&self.name, self.score) {
                error!("Cannot save score: {}", err);
            }
            self.stage = Stage::Intro;
        }

        let mut screen = Screen::new(&mut self.screen, WIDTH, HEIGHT);
        screen.clear();

        // Score as a row of pips
        for i in 0..self.score.min(50) as i32 {
            let x = 60 + i * 10;
            screen.fill(Point::new(x, 85), Point::new(x + 6, 91), YELLOW);
        }

        // Input box with one block per character and a blinking cursor
        let corner = INPUT_BOX;
        screen.fill(corner, corner + Point::new(250, 30), GRAY);
        let mut x = corner.x + 5;
        for _ in self.name.chars() {
            screen.fill(
                Point::new(x, corner.y + 7),
                Point::new(x + GLYPH_WIDTH - 2, corner.y + 23),
                LIGHT_GRAY,
            );
            x += GLYPH_WIDTH;
        }
        if self.cursor < CURSOR_PERIOD / 2 {
            screen.fill(
                Point::new(x + 2, corner.y + 4),
                Point::new(x + 4, corner.y + 26),
                WHITE,
            );
        }

        // Cancel and Save buttons
        screen.fill(Point::new(50, 400), Point::new(120, 428), BLUE);
        let save = if self.name.len() >= MIN_NAME_LEN {
            GREEN
        } else {
            GRAY
        };
        screen.fill(Point::new(500, 400), Point::new(555, 428), save);
    }

    fn step_leaderboard(&mut self, controls: &Controls) {
        if self.scores.is_none() {
            let scores = match self.leaderboard.top10() {
                Ok(scores) => scores,
                Err(err) => {
                    error!("Cannot load scores: {}", err);
                    Vec::new()
                }
            };
            debug!("Showing {} scores", scores.len());
            self.scores = Some(scores);
        }

        if controls.confirm || controls.cancel {
            self.stage = Stage::Intro;
            self.scores = None;
            return;
        }

        let mut screen = Screen::new(&mut self.screen, WIDTH, HEIGHT);
        screen.clear();

        // One bar per score, scaled to the best one
        let scores = self.scores.as_deref().unwrap_or_default();
        let best = scores.iter().map(|s| s.score).max().unwrap_or(0).max(1);
        for (i, score) in scores.iter().enumerate() {
            let y = 100 + i as i32 * 25;
            let width = (u64::from(score.score) * 500 / u64::from(best)) as i32;
            let color = if i % 2 == 0 { YELLOW } else { LIGHT_GRAY };

            screen.fill(Point::new(50, y), Point::new(50 + width.max(2), y + 18), color);
        }

        // OK button
        screen.fill(Point::new(250, 400), Point::new(290, 428), BLUE);
    }
}

fn draw_hud(screen: &mut Screen<'_>, icon: &Image, lives: u32, level: u32) {
    for i in 0..lives {
        screen.draw(icon, Vec2D::new(10.0 + i as f32 * 24.0, 8.0));
    }

    for i in 0..level as i32 {
        let x = WIDTH as i32 - 20 - i * 14;
        screen.fill(Point::new(x, 14), Point::new(x + 8, 22), YELLOW);
    }
}

fn make_player(assets: &Assets) -> Result<Sprite, Error> {
    Sprite::new(
        vec![assets.get(Frame::Player).clone()],
        PLAYER_SIZE,
        SpriteOptions {
            id: SpriteId::Player,
            position: PLAYER_START,
            soft: true,
            soft_rate: PLAYER_RATE,
            animation: Animation::OnMove,
            explosion: assets.sequence(&Frame::explosion()),
            ..SpriteOptions::default()
        },
    )
}

/// A bullet that flies from `position` to the top of the screen.
fn make_bullet(
    assets: &Assets,
    id: SpriteId,
    position: Vec2D,
    targets: Vec<SpriteId>,
) -> Result<Sprite, Error> {
    let mut bullet = Sprite::new(
        vec![assets.get(Frame::Bullet).clone()],
        BULLET_SIZE,
        SpriteOptions {
            id,
            position,
            soft_rate: BULLET_RATE,
            animation: Animation::OnMove,
            collides_with: targets,
            ..SpriteOptions::default()
        },
    )?;
    bullet.set_soft(true);
    bullet.set_y(0.0);

    Ok(bullet)
}
