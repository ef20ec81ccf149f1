use std::collections::BTreeMap;

use crate::formation::Formation;
use crate::geo::{Point, Rect, Vec2D};
use crate::screen::Screen;
use crate::sprites::{Sprite, SpriteId};

// Colors
const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const YELLOW: [u8; 4] = [255, 255, 0, 255];

/// Draw bounding boxes for the formation and each ufo.
///
/// Exploding ufos are drawn in red; they no longer collide.
pub(crate) fn draw_formation(screen: &mut Screen<'_>, formation: &Formation) {
    let mut bounds: Option<Rect> = None;

    for ufo in formation.ufos() {
        let rect = ufo.rect();
        let color = if ufo.in_post_collision_animation() {
            RED
        } else {
            GREEN
        };
        draw_rect(screen, rect, color);

        bounds = Some(match bounds {
            Some(b) => Rect::new(
                Vec2D::new(b.p1.x.min(rect.p1.x), b.p1.y.min(rect.p1.y)),
                Vec2D::new(b.p2.x.max(rect.p2.x), b.p2.y.max(rect.p2.y)),
            ),
            None => rect,
        });
    }

    if let Some(bounds) = bounds {
        draw_rect(screen, bounds, BLUE);
    }

    for bomb in formation.bombs() {
        draw_rect(screen, bomb.rect(), RED);
    }
}

/// Draw bounding boxes for bullets.
pub(crate) fn draw_bullets(screen: &mut Screen<'_>, bullets: &BTreeMap<SpriteId, Sprite>) {
    for bullet in bullets.values() {
        draw_rect(screen, bullet.rect(), YELLOW);
    }
}

/// Draw bounding box for the player.
pub(crate) fn draw_player(screen: &mut Screen<'_>, player: &Sprite) {
    let color = if player.in_post_collision_animation() {
        RED
    } else {
        GREEN
    };

    draw_rect(screen, player.rect(), color);
}

fn draw_rect(screen: &mut Screen<'_>, rect: Rect, color: [u8; 4]) {
    screen.rect(Point::from(rect.p1), Point::from(rect.p2), color);
}
