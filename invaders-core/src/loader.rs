use std::collections::HashMap;
use std::path::Path;

use image::imageops::FilterType;
use image::RgbaImage;
use log::debug;

use crate::error::Error;
use crate::screen::{Drawable, Image};

/// Asset identifier.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Frame {
    /// Nine ship images, three per formation row.
    Ship(usize),
    /// Eleven explosion images.
    Explosion(usize),
    Player,
    Bullet,
    Bomb,
    Sky,
    Title,
    Won,
    Lost,
}

/// Number of `Frame::Ship` images.
pub const SHIPS: usize = 9;
/// Number of `Frame::Explosion` images.
pub const EXPLOSIONS: usize = 11;

/// A list of assets loaded into memory.
///
/// Created once by whoever owns the game and handed to everything that builds sprites. It is
/// never modified after loading.
#[derive(Debug)]
pub struct Assets {
    images: HashMap<Frame, Image>,
}

impl Frame {
    /// Every asset the game needs.
    pub fn all() -> Vec<Frame> {
        use Frame::*;

        (0..SHIPS)
            .map(Ship)
            .chain((0..EXPLOSIONS).map(Explosion))
            .chain([Player, Bullet, Bomb, Sky, Title, Won, Lost])
            .collect()
    }

    /// The three animation frames for ships in formation row `row`.
    pub fn ufo_row(row: usize) -> [Frame; 3] {
        let first = (row % 3) * 3;

        [
            Frame::Ship(first),
            Frame::Ship(first + 1),
            Frame::Ship(first + 2),
        ]
    }

    /// The explosion sequence, in order.
    pub fn explosion() -> Vec<Frame> {
        (0..EXPLOSIONS).map(Frame::Explosion).collect()
    }

    /// Location relative to the asset root.
    pub fn path(&self) -> String {
        match self {
            Frame::Ship(0) => "images/Ships/Spaceship.png".into(),
            Frame::Ship(i) => format!("images/Ships/Spaceship{}.png", i + 1),
            Frame::Explosion(i) => format!("images/Rocks/up{:05}.png", i),
            Frame::Player => "images/robot-fighter.png".into(),
            Frame::Bullet => "images/Objects/star3.png".into(),
            Frame::Bomb => "images/Objects/xff2.png".into(),
            Frame::Sky => "images/BGS/sky.png".into(),
            Frame::Title => "images/BGS/robotitle.png".into(),
            Frame::Won => "images/youwon.png".into(),
            Frame::Lost => "images/lost.png".into(),
        }
    }

    /// The box the image is scaled to fit.
    pub fn fit(&self) -> (u32, u32) {
        match self {
            Frame::Ship(_) => (40, 40),
            Frame::Explosion(_) => (100, 100),
            Frame::Player => (50, 50),
            Frame::Bullet | Frame::Bomb => (20, 20),
            Frame::Sky | Frame::Title | Frame::Won | Frame::Lost => (640, 480),
        }
    }
}

impl Assets {
    /// Load and rescale every asset found under `root`.
    pub fn load(root: &Path) -> Result<Assets, Error> {
        let mut images = HashMap::new();

        for frame in Frame::all() {
            let path = root.join(frame.path());
            let (width, height) = frame.fit();
            let rescaled = rescale_to_fit(&load_image(&path)?, width, height);
            debug!(
                "Loaded {} as {}x{}",
                path.display(),
                rescaled.width(),
                rescaled.height()
            );

            images.insert(frame, to_image(rescaled));
        }

        Ok(Assets { images })
    }

    /// Look up a loaded asset.
    ///
    /// # Panics
    ///
    /// Every `Frame` is present after [`Assets::load`], so this only panics for assets built by
    /// hand without it.
    pub fn get(&self, frame: Frame) -> &Image {
        &self.images[&frame]
    }

    /// Look up a sequence of assets.
    pub fn sequence(&self, frames: &[Frame]) -> Vec<Image> {
        frames.iter().map(|&frame| self.get(frame).clone()).collect()
    }

    /// Solid-color stand-ins sized like the real assets.
    #[cfg(test)]
    pub(crate) fn placeholder() -> Assets {
        let images = Frame::all()
            .into_iter()
            .map(|frame| {
                let (width, height) = frame.fit();
                let image = Image::solid(width as usize, height as usize, [255, 255, 255, 255]);

                (frame, image)
            })
            .collect();

        Assets { images }
    }
}

/// Decode an image file into RGBA pixels.
pub fn load_image(path: &Path) -> Result<RgbaImage, Error> {
    let image = image::open(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(image.to_rgba8())
}

/// Scale `image` uniformly so it fits within `width` x `height`.
///
/// The aspect ratio is preserved; images smaller than the box are scaled up.
pub fn rescale_to_fit(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let width_ratio = width as f64 / image.width() as f64;
    let height_ratio = height as f64 / image.height() as f64;
    let scale = width_ratio.min(height_ratio);

    let new_width = ((image.width() as f64 * scale) as u32).max(1);
    let new_height = ((image.height() as f64 * scale) as u32).max(1);

    image::imageops::resize(image, new_width, new_height, FilterType::Triangle)
}

/// A copy of `image` scaled to fit within `width` x `height`.
pub fn thumbnail(image: &Image, width: u32, height: u32) -> Image {
    let raw = RgbaImage::from_raw(
        image.width() as u32,
        image.height() as u32,
        image.pixels().to_vec(),
    );

    match raw {
        Some(raw) => to_image(rescale_to_fit(&raw, width, height)),
        None => image.clone(),
    }
}

fn to_image(image: RgbaImage) -> Image {
    let (width, height) = image.dimensions();

    Image::new(width as usize, height as usize, image.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_keeps_aspect_ratio() {
        let wide = RgbaImage::new(200, 100);
        let rescaled = rescale_to_fit(&wide, 40, 40);
        assert_eq!(rescaled.dimensions(), (40, 20));

        let tall = RgbaImage::new(50, 200);
        let rescaled = rescale_to_fit(&tall, 100, 100);
        assert_eq!(rescaled.dimensions(), (25, 100));
    }

    #[test]
    fn rescale_scales_up() {
        let small = RgbaImage::from_pixel(10, 10, image::Rgba([1, 2, 3, 255]));
        let rescaled = rescale_to_fit(&small, 40, 40);

        assert_eq!(rescaled.dimensions(), (40, 40));
        assert_eq!(rescaled.get_pixel(20, 20), &image::Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn thumbnail_shrinks_image() {
        let player = Image::solid(50, 50, [7, 8, 9, 255]);
        let icon = thumbnail(&player, 20, 20);

        assert_eq!((icon.width(), icon.height()), (20, 20));
        assert_eq!(&icon.pixels()[..4], &[7, 8, 9, 255]);
    }

    #[test]
    fn frame_paths() {
        assert_eq!(Frame::Ship(0).path(), "images/Ships/Spaceship.png");
        assert_eq!(Frame::Ship(8).path(), "images/Ships/Spaceship9.png");
        assert_eq!(Frame::Explosion(10).path(), "images/Rocks/up00010.png");
        assert_eq!(Frame::all().len(), SHIPS + EXPLOSIONS + 7);
        assert_eq!(
            Frame::ufo_row(1),
            [Frame::Ship(3), Frame::Ship(4), Frame::Ship(5)]
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        match Assets::load(dir.path()) {
            Err(Error::Image { path, .. }) => assert!(path.ends_with(Frame::Ship(0).path())),
            other => panic!("Expected an image error, got {:?}", other),
        }
    }

    #[test]
    fn load_rescales_every_asset() {
        let dir = tempfile::tempdir().unwrap();
        for frame in Frame::all() {
            let path = dir.path().join(frame.path());
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            RgbaImage::from_pixel(8, 4, image::Rgba([9, 9, 9, 255]))
                .save(&path)
                .unwrap();
        }

        let assets = Assets::load(dir.path()).unwrap();
        let ship = assets.get(Frame::Ship(4));
        assert_eq!((ship.width(), ship.height()), (40, 20));
        let sky = assets.get(Frame::Sky);
        assert_eq!((sky.width(), sky.height()), (640, 320));
        assert_eq!(assets.sequence(&Frame::explosion()).len(), EXPLOSIONS);
    }
}
