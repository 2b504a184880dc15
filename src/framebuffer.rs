use image::{ImageBuffer, Rgb};

use crate::color::{self, Color};

/// Color buffer plus a parallel depth buffer. Pixels start out background
/// black, depths at +infinity; one render pass owns the buffer exclusively.
pub struct Framebuffer {
    color: ImageBuffer<Rgb<f32>, Vec<f32>>,
    depth: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            color: ImageBuffer::new(width, height),
            depth: vec![f32::INFINITY; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.color.width()
    }

    pub fn height(&self) -> u32 {
        self.color.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        *self.color.get_pixel(x, y)
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.color.put_pixel(x, y, color);
    }

    /// Blend `color` over the existing pixel by `coverage` in [0, 1].
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Color, coverage: f32) {
        let blended = color::lerp(coverage, self.pixel(x, y), color);
        self.color.put_pixel(x, y, blended);
    }

    pub fn depth(&self, x: u32, y: u32) -> f32 {
        self.depth[(y * self.width() + x) as usize]
    }

    pub fn set_depth(&mut self, x: u32, y: u32, z: f32) {
        let width = self.width();
        self.depth[(y * width + x) as usize] = z;
    }

    /// Hand the color plane over for serialization.
    pub fn into_color(self) -> ImageBuffer<Rgb<f32>, Vec<f32>> {
        self.color
    }
}
