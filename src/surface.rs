//! The 2D drawing surface the field renders against.
//!
//! The field issues clear / filled-circle / line-segment commands and nothing
//! else; executing them is the host's business. The production implementation
//! paints through an egui layer, tests record the command stream instead.

use glam::Vec2;

/// An sRGB color with straight (unmultiplied) alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// This color with its alpha set from an opacity in `[0, 1]`.
    pub fn with_alpha(self, opacity: f32) -> Self {
        Self {
            a: (opacity.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }
}

/// Drawing commands the field needs from its host surface.
pub trait Surface {
    fn clear(&mut self, color: Rgba);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    fn line_segment(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32);
}

/// Executes surface commands against an egui painter layer.
pub struct PainterSurface {
    painter: egui::Painter,
    rect: egui::Rect,
}

impl PainterSurface {
    pub fn new(painter: egui::Painter, rect: egui::Rect) -> Self {
        Self { painter, rect }
    }
}

impl Surface for PainterSurface {
    fn clear(&mut self, color: Rgba) {
        self.painter.rect_filled(self.rect, 0.0, to_color32(color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.painter
            .circle_filled(to_pos2(center), radius, to_color32(color));
    }

    fn line_segment(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        self.painter.line_segment(
            [to_pos2(from), to_pos2(to)],
            egui::Stroke::new(width, to_color32(color)),
        );
    }
}

fn to_color32(color: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

fn to_pos2(v: Vec2) -> egui::Pos2 {
    egui::Pos2::new(v.x, v.y)
}
