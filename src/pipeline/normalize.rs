//! Letterboxing: fit a rendered page onto a fixed-size canvas.
//!
//! Slides come in 16:9, 4:3, A4 portrait and anything in between. Every image
//! sent to the model has the same dimensions regardless: the page is scaled
//! uniformly until it touches the canvas on one axis, then centred with the
//! remaining area filled with a solid background. Nothing is cropped and
//! nothing is stretched.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

/// Target canvas for normalised slide images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub background: [u8; 3],
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            background: [255, 255, 255],
        }
    }
}

impl Canvas {
    /// Uniform scale factor that fits a `width × height` source inside the
    /// canvas without cropping.
    pub fn fit_scale(&self, width: f32, height: f32) -> f32 {
        if width <= 0.0 || height <= 0.0 {
            return 1.0;
        }
        (self.width as f32 / width).min(self.height as f32 / height)
    }

    /// Pixel dimensions of the source once fitted, never exceeding the canvas
    /// and never collapsing to zero.
    pub fn fit_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let scale = self.fit_scale(width as f32, height as f32);
        let w = ((width as f32 * scale).round() as u32).clamp(1, self.width);
        let h = ((height as f32 * scale).round() as u32).clamp(1, self.height);
        (w, h)
    }

    /// Fit `image` onto the canvas: scale to fit (if it does not already),
    /// then composite it centred over the background fill.
    pub fn letterbox(&self, image: &DynamicImage) -> RgbImage {
        let rgb = image.to_rgb8();
        let (fit_w, fit_h) = self.fit_dimensions(rgb.width(), rgb.height());

        let content = if (fit_w, fit_h) == rgb.dimensions() {
            rgb
        } else {
            imageops::resize(&rgb, fit_w, fit_h, FilterType::CatmullRom)
        };

        let mut canvas = RgbImage::from_pixel(self.width, self.height, Rgb(self.background));
        let offset_x = (self.width - fit_w) / 2;
        let offset_y = (self.height - fit_h) / 2;
        imageops::overlay(&mut canvas, &content, offset_x as i64, offset_y as i64);
        canvas
    }
}
