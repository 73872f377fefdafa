//! CPU pixel surface the brush engine paints onto.
//!
//! The pixel buffer is derived state: it can always be rebuilt by replaying
//! the completed-stroke history onto a cleared surface, which is also the only
//! way to revert a destructive (eraser) stroke.

/// RGBA surface with f32 components in 0.0..=1.0, row-major.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    /// Color the surface is cleared to before a replay.
    background: [f32; 4],
    pixels: Vec<[f32; 4]>,
}

/// Opaque white, matching a fresh drawing surface.
pub const BACKGROUND_WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

impl PixelSurface {
    /// Create a surface cleared to the white background.
    pub fn new(width: u32, height: u32) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            background: BACKGROUND_WHITE,
            pixels: vec![BACKGROUND_WHITE; pixel_count],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> [f32; 4] {
        self.background
    }

    /// Reset every pixel to the background color.
    pub fn clear_to_background(&mut self) {
        self.pixels.fill(self.background);
    }

    /// Reallocate for new dimensions. The content is discarded; the caller is
    /// expected to replay history afterwards.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![self.background; (width as usize) * (height as usize)];
    }

    /// Pixel at the given coordinates, or `None` out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y as usize) * (self.width as usize) + (x as usize)])
    }

    /// Source-over composite a color at the given opacity. Out-of-bounds
    /// coordinates are ignored.
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: [f32; 3], alpha: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        let dst = self.pixels[index];
        let inv = 1.0 - alpha;
        self.pixels[index] = [
            color[0] * alpha + dst[0] * inv,
            color[1] * alpha + dst[1] * inv,
            color[2] * alpha + dst[2] * inv,
            alpha + dst[3] * inv,
        ];
    }

    /// Destination-out composite: remove `amount` (0.0..=1.0) of the existing
    /// pixel, color and alpha alike.
    #[inline]
    pub fn erase_pixel(&mut self, x: u32, y: u32, amount: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        let remaining = (1.0 - amount).max(0.0);
        let dst = self.pixels[index];
        self.pixels[index] = [
            dst[0] * remaining,
            dst[1] * remaining,
            dst[2] * remaining,
            dst[3] * remaining,
        ];
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    /// Number of pixels that differ from the background color.
    pub fn painted_pixel_count(&self) -> usize {
        self.pixels.iter().filter(|p| **p != self.background).count()
    }
}
