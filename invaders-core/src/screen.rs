//! Pixel buffer drawing primitives.

use crate::geo::{Point, Vec2D};
use line_drawing::Bresenham;
use std::rc::Rc;

/// Decoded RGBA pixels shared between every sprite that displays them.
#[derive(Clone, Debug)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Rc<Vec<u8>>,
}

/// Drawables can be blitted to the pixel buffer.
pub trait Drawable {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn pixels(&self) -> &[u8];
}

/// Anything sprites can be drawn onto.
///
/// The game only ever draws whole images at a position; the rest is up to the implementation.
pub trait Surface {
    /// Draw `image` with its upper-left corner at `pos`.
    fn draw(&mut self, image: &Image, pos: Vec2D);
}

/// An RGBA frame buffer, e.g. the one handed out by `pixels`.
#[derive(Debug)]
pub struct Screen<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl Image {
    /// Wrap raw RGBA pixels.
    ///
    /// # Panics
    ///
    /// Asserts that `pixels` holds exactly `width * height` RGBA values.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Image {
        assert_eq!(pixels.len(), width * height * 4);

        Image {
            width,
            height,
            pixels: Rc::new(pixels),
        }
    }

    /// Create an image filled with a single color.
    pub fn solid(width: usize, height: usize, color: [u8; 4]) -> Image {
        let pixels = color
            .iter()
            .copied()
            .cycle()
            .take(width * height * 4)
            .collect();

        Image::new(width, height, pixels)
    }

    /// Two images are the same when they share pixel storage.
    pub fn ptr_eq(&self, other: &Image) -> bool {
        Rc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl Drawable for Image {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl<'a> Screen<'a> {
    /// Wrap a frame buffer of `width * height` RGBA pixels.
    ///
    /// # Panics
    ///
    /// Asserts that the frame buffer is large enough.
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Screen<'a> {
        assert!(frame.len() >= width * height * 4);

        Screen {
            frame,
            width,
            height,
        }
    }

    /// Fill the entire screen with opaque black.
    pub fn clear(&mut self) {
        for (i, byte) in self.frame.iter_mut().enumerate() {
            *byte = if i % 4 == 3 { 255 } else { 0 };
        }
    }

    /// Fill a rectangle with a solid color, clipped to the screen.
    pub fn fill(&mut self, p1: Point, p2: Point, color: [u8; 4]) {
        let x1 = p1.x.max(0) as usize;
        let y1 = p1.y.max(0) as usize;
        let x2 = (p2.x.max(0) as usize).min(self.width);
        let y2 = (p2.y.max(0) as usize).min(self.height);

        for y in y1..y2 {
            for x in x1..x2 {
                let i = (x + y * self.width) * 4;
                self.frame[i..i + 4].copy_from_slice(&color);
            }
        }
    }

    /// Draw a line using Bresenham's algorithm, clipped to the screen.
    pub fn line(&mut self, p1: Point, p2: Point, color: [u8; 4]) {
        for (x, y) in Bresenham::new((p1.x, p1.y), (p2.x, p2.y)) {
            if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
                continue;
            }
            let i = (x as usize + y as usize * self.width) * 4;

            self.frame[i..i + 4].copy_from_slice(&color);
        }
    }

    /// Draw a rectangle outline using two points in opposite corners.
    pub fn rect(&mut self, p1: Point, p2: Point, color: [u8; 4]) {
        let p3 = Point::new(p1.x, p2.y);
        let p4 = Point::new(p2.x, p1.y);

        self.line(p1, p3, color);
        self.line(p3, p2, color);
        self.line(p2, p4, color);
        self.line(p4, p1, color);
    }
}

impl Surface for Screen<'_> {
    fn draw(&mut self, image: &Image, pos: Vec2D) {
        blit(self.frame, self.width, self.height, Point::from(pos), image);
    }
}

/// Blit a drawable to the pixel buffer.
///
/// Pixels outside the buffer are clipped. Fully transparent pixels are skipped and partially
/// transparent pixels are blended over the existing contents.
pub fn blit<D>(screen: &mut [u8], width: usize, height: usize, dest: Point, drawable: &D)
where
    D: Drawable,
{
    let pixels = drawable.pixels();
    let stride = drawable.width() * 4;

    for y in 0..drawable.height() {
        let sy = dest.y + y as i32;
        if sy < 0 || sy as usize >= height {
            continue;
        }

        for x in 0..drawable.width() {
            let sx = dest.x + x as i32;
            if sx < 0 || sx as usize >= width {
                continue;
            }

            let s = y * stride + x * 4;
            let src = &pixels[s..s + 4];
            let i = (sx as usize + sy as usize * width) * 4;
            match src[3] {
                0 => (),
                255 => screen[i..i + 4].copy_from_slice(src),
                alpha => {
                    let alpha = u16::from(alpha);
                    for c in 0..3 {
                        let dst = u16::from(screen[i + c]);
                        let src = u16::from(src[c]);
                        screen[i + c] = ((src * alpha + dst * (255 - alpha)) / 255) as u8;
                    }
                    screen[i + 3] = 255;
                }
            }
        }
    }
}
