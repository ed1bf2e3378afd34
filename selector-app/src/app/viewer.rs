use egui::{Pos2, Rect, Response, Vec2};
use poly_select::Point;

/// Zoom and pan state for showing an image inside a viewport.
pub struct ImageViewer {
    // Zoom level (0.05..1.0)
    // 1.0 means, that image width or height fits the viewport and the other dimension is smaller than the viewport
    zoom: f32,
    // Offset of the top left-corner (in fractions of the rendered image size)
    pan_offset: Vec2,
}

/// Where the image lands on screen for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageLayout {
    pub rect: Rect,
    scale: f32,
}

impl ImageLayout {
    pub fn image_to_screen(&self, p: Point) -> Pos2 {
        self.rect.min + Vec2::new(p.x as f32, p.y as f32) * self.scale
    }

    pub fn screen_to_image(&self, pos: Pos2) -> Point {
        let v = (pos - self.rect.min) / self.scale;
        Point::new(v.x.floor() as i32, v.y.floor() as i32)
    }

    /// Screen pixels per image pixel.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    fn screen_to_image_exact(&self, pos: Pos2) -> Vec2 {
        (pos - self.rect.min) / self.scale
    }
}

impl ImageViewer {
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_offset = Vec2::ZERO;
    }

    pub fn modify_zoom(&mut self, zoom: impl Fn(f32) -> f32) {
        self.zoom = zoom(self.zoom).clamp(0.05, 1.0);
    }

    fn is_zoomed_out(&self) -> bool {
        (self.zoom - 1.0).abs() <= f32::EPSILON
    }

    /// Place an image of `image_size` pixels into `viewport`. While fully zoomed out
    /// the image is centered.
    pub fn layout(&mut self, viewport: Rect, image_size: Vec2) -> ImageLayout {
        let viewport_size = viewport.size();
        let fit_scale = (viewport_size.x / image_size.x).min(viewport_size.y / image_size.y);
        let scale = fit_scale / self.zoom;
        let image_size_px = image_size * scale;

        if self.is_zoomed_out() {
            let blank = ((viewport_size - image_size_px) * 0.5).max(Vec2::ZERO);
            self.pan_offset = -(blank / image_size_px);
        }

        let pixel_offset = image_size_px * -self.pan_offset;
        ImageLayout {
            rect: Rect::from_min_size(viewport.min + pixel_offset, image_size_px),
            scale,
        }
    }

    /// CTRL + drag pans, CTRL + scroll (or pinch) zooms around the pointer.
    /// Returns the layout after navigation.
    pub fn navigate(
        &mut self,
        ui: &egui::Ui,
        response: &Response,
        viewport: Rect,
        image_size: Vec2,
    ) -> ImageLayout {
        let layout = self.layout(viewport, image_size);

        let drag_delta = response.drag_delta();
        if drag_delta != Vec2::ZERO && ui.input(|i| i.modifiers.command || i.modifiers.ctrl) {
            self.pan_offset -= drag_delta / layout.rect.size();
        }

        if let Some(hover) = response.hover_pos() {
            let delta = ui.input(|i| i.zoom_delta());
            if delta != 1.0 {
                let anchor = layout.screen_to_image_exact(hover);
                self.modify_zoom(|z| z / delta);
                let zoomed = self.layout(viewport, image_size);
                let pixel_offset = (hover - viewport.min) - anchor * zoomed.scale;
                self.pan_offset = -(pixel_offset / zoomed.rect.size());
            }
        }

        self.layout(viewport, image_size)
    }
}

impl Default for ImageViewer {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_offset: Vec2::ZERO,
        }
    }
}
