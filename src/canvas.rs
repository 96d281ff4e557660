//! The drawing surface: a software RGBA raster buffer that freehand strokes
//! are rasterized into, sized to match the on-screen canvas widget.

use egui::{Color32, Pos2};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

use crate::tool::StrokeStyle;

/// Owns the raster pixel buffer. Mutation happens only through the stroke,
/// clear and resize operations below; the buffer itself is never handed out.
pub struct SketchSurface {
    buffer: RgbaImage,
    background: Color32,
    /// Last point of the in-progress stroke, if a press is active.
    anchor: Option<Pos2>,
    /// Bumped on every visible change, used for texture re-upload.
    version: u64,
}

impl SketchSurface {
    pub fn new(width: u32, height: u32, background: Color32) -> Self {
        let buffer = RgbaImage::from_pixel(width.max(1), height.max(1), to_rgba(background));
        Self {
            buffer,
            background,
            anchor: None,
            version: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn background(&self) -> Color32 {
        self.background
    }

    /// Change counter; bumped whenever the rendered pixels change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Start a new stroke at `point` (buffer-local coordinates). Paints
    /// nothing by itself; pixels appear on the first `extend_stroke`.
    pub fn begin_stroke(&mut self, point: Pos2) {
        self.anchor = Some(point);
    }

    /// Rasterize a segment from the last point to `point` with `style`,
    /// then advance the anchor. No-op while no stroke is active.
    pub fn extend_stroke(&mut self, point: Pos2, style: &StrokeStyle) {
        let Some(from) = self.anchor else { return };
        self.stamp_segment(from, point, to_rgba(style.color), style.width as f32 / 2.0);
        self.anchor = Some(point);
        self.version += 1;
    }

    /// Close the current stroke. Idempotent.
    pub fn end_stroke(&mut self) {
        self.anchor = None;
    }

    /// Fill the whole buffer with the background color, discarding all
    /// drawn content.
    pub fn clear(&mut self) {
        let background = to_rgba(self.background);
        for pixel in self.buffer.pixels_mut() {
            *pixel = background;
        }
        self.version += 1;
    }

    /// Resize the buffer to match a new layout box. A no-op when the
    /// dimensions are unchanged. Otherwise old content is copied top-left
    /// aligned into a background-filled buffer, so drawn pixels survive the
    /// resize and only newly exposed area shows the background; content
    /// outside the new bounds is clipped.
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        let new_width = new_width.max(1);
        let new_height = new_height.max(1);
        if new_width == self.width() && new_height == self.height() {
            return;
        }
        let mut next = RgbaImage::from_pixel(new_width, new_height, to_rgba(self.background));
        let copy_w = self.width().min(new_width);
        let copy_h = self.height().min(new_height);
        for y in 0..copy_h {
            for x in 0..copy_w {
                next.put_pixel(x, y, *self.buffer.get_pixel(x, y));
            }
        }
        self.buffer = next;
        self.version += 1;
    }

    /// Encode the buffer as lossless PNG, exactly as rendered (eraser
    /// strokes are background-colored pixels, not transparency).
    pub fn export_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut out = Cursor::new(Vec::new());
        self.buffer.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    /// The buffer as an egui image, for texture upload.
    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgba_unmultiplied(
            [self.width() as usize, self.height() as usize],
            self.buffer.as_raw(),
        )
    }

    /// Read a single pixel, mainly for tests.
    pub fn pixel(&self, x: u32, y: u32) -> Color32 {
        let Rgba([r, g, b, a]) = *self.buffer.get_pixel(x, y);
        Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    /// Paint a round-capped thick segment: every pixel whose center lies
    /// within `radius` of the segment gets the stroke color.
    fn stamp_segment(&mut self, from: Pos2, to: Pos2, color: Rgba<u8>, radius: f32) {
        let radius = radius.max(0.5);
        let (w, h) = (self.width() as f32, self.height() as f32);
        let min_x = (from.x.min(to.x) - radius).floor().clamp(0.0, w - 1.0) as u32;
        let max_x = (from.x.max(to.x) + radius).ceil().clamp(0.0, w - 1.0) as u32;
        let min_y = (from.y.min(to.y) - radius).floor().clamp(0.0, h - 1.0) as u32;
        let max_y = (from.y.max(to.y) + radius).ceil().clamp(0.0, h - 1.0) as u32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(center, from, to) <= radius {
                    self.buffer.put_pixel(x, y, color);
                }
            }
        }
    }
}

fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba([color.r(), color.g(), color.b(), 255])
}

fn distance_to_segment(point: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_sq();
    if length_sq <= f32::EPSILON {
        return (point - a).length();
    }
    let t = ((point - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    let closest = a + ab * t;
    (point - closest).length()
}
