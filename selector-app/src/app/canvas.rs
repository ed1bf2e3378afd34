use std::{cell::Cell, rc::Rc};

use egui::{Color32, PointerButton, Pos2, Rect, Sense, Shape, Stroke, TextureHandle};
use log::warn;
use poly_select::{ListenerId, Point, PolyLine, Property, SelectionModel, SelectionState};

use super::viewer::{ImageLayout, ImageViewer};
use crate::config::{Colors, color};

/// What a completed click asks the model to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    AddPoint,
    Finish,
    Undo,
}

impl ClickAction {
    /// Primary adds points, middle finishes, secondary undoes.
    pub fn for_click(state: SelectionState, button: PointerButton) -> Option<Self> {
        use SelectionState::*;
        match (button, state) {
            (PointerButton::Primary, NoSelection | Selecting) => Some(Self::AddPoint),
            (PointerButton::Middle, Selecting) => Some(Self::Finish),
            (PointerButton::Secondary, Selecting | Selected) => Some(Self::Undo),
            _ => None,
        }
    }

    fn apply(self, model: &mut SelectionModel, at: Point) {
        let result = match self {
            ClickAction::AddPoint => model.add_point(at),
            ClickAction::Finish => model.finish_selection(),
            ClickAction::Undo => model.undo(),
        };
        if let Err(e) = result {
            warn!("{self:?} rejected: {e}");
        }
    }
}

/// Overlay that draws a selection model on top of its image and turns pointer
/// input into model operations.
pub struct SelectionCanvas {
    viewer: ImageViewer,
    /// Control point being dragged
    selected_index: Option<usize>,
    /// Last pointer position in image coordinates, clamped to the image
    mouse_location: Point,
    /// Set by the model's "selection" notifications
    selection_changed: Rc<Cell<bool>>,
    listener: Option<ListenerId>,
    control_point_radius: f32,
    colors: Colors,
}

impl SelectionCanvas {
    pub fn new(control_point_radius: f32, colors: Colors) -> Self {
        Self {
            viewer: ImageViewer::default(),
            selected_index: None,
            mouse_location: Point::default(),
            selection_changed: Rc::new(Cell::new(false)),
            listener: None,
            control_point_radius,
            colors,
        }
    }

    /// Start observing `model`. Any drag on a previous model is discarded.
    pub fn attach(&mut self, model: &mut SelectionModel) {
        let changed = self.selection_changed.clone();
        self.listener = Some(
            model.add_property_listener(Property::Selection, move |_| changed.set(true)),
        );
        self.selected_index = None;
    }

    pub fn reset_view(&mut self) {
        self.viewer.reset();
    }

    pub fn mouse_location(&self) -> Point {
        self.mouse_location
    }

    fn is_interacting_with_point(&self, model: &SelectionModel) -> bool {
        model.state() == SelectionState::Selected && self.selected_index.is_some()
    }

    /// Maximum squared distance, in image pixels, for grabbing a control point.
    fn hit_tolerance(&self, layout: &ImageLayout) -> i64 {
        let r = self.control_point_radius / layout.scale();
        (r * r * 2.0).ceil() as i64
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, model: &mut SelectionModel, texture: &TextureHandle) {
        // The model changed since the drag started, the index may be stale
        if self.selection_changed.replace(false) {
            self.selected_index = None;
        }

        let viewport = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(viewport, Sense::click_and_drag());
        let image_size = texture.size_vec2();
        let layout = self.viewer.navigate(ui, &response, viewport, image_size);
        let (width, height) = (image_size.x as u32, image_size.y as u32);
        let panning = ui.input(|i| i.modifiers.command || i.modifiers.ctrl);

        if let Some(pos) = response.hover_pos().or(response.interact_pointer_pos()) {
            self.mouse_location = layout.screen_to_image(pos).clamp_to(width, height);
        }

        if !panning {
            self.handle_pointer(ui, &response, &layout, model, width, height);
        }

        let painter = ui.painter().with_clip_rect(viewport);
        painter.image(
            texture.id(),
            layout.rect,
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );
        self.paint(&painter, &layout, model, response.hovered());
    }

    fn handle_pointer(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        layout: &ImageLayout,
        model: &mut SelectionModel,
        width: u32,
        height: u32,
    ) {
        for button in [
            PointerButton::Primary,
            PointerButton::Middle,
            PointerButton::Secondary,
        ] {
            if response.clicked_by(button) {
                if let Some(action) = ClickAction::for_click(model.state(), button) {
                    action.apply(model, self.mouse_location);
                }
            }
        }

        if model.state() != SelectionState::Selected {
            return;
        }

        if response.drag_started_by(PointerButton::Primary) {
            let origin = ui
                .input(|i| i.pointer.press_origin())
                .map(|pos| layout.screen_to_image(pos).clamp_to(width, height))
                .unwrap_or(self.mouse_location);
            self.selected_index = model.closest_point(origin, self.hit_tolerance(layout));
        }

        if response.drag_stopped_by(PointerButton::Primary) {
            if let Some(index) = self.selected_index.take() {
                if let Err(e) = model.move_point(index, self.mouse_location) {
                    warn!("Moving point {index} failed: {e}");
                }
            }
        }
    }

    fn paint(
        &self,
        painter: &egui::Painter,
        layout: &ImageLayout,
        model: &SelectionModel,
        hovered: bool,
    ) {
        let to_screen = |line: &PolyLine| -> Vec<Pos2> {
            line.points()
                .iter()
                .map(|p| layout.image_to_screen(*p))
                .collect()
        };

        let perimeter = Stroke::new(1.5, color(self.colors.perimeter));
        for leg in model.selection() {
            painter.add(Shape::line(to_screen(leg), perimeter));
        }

        if self.is_interacting_with_point(model) {
            self.paint_move_guides(painter, layout, model);
        }

        if model.state() == SelectionState::Selecting && hovered {
            if let Ok(wire) = model.live_wire(self.mouse_location) {
                painter.add(Shape::line(
                    to_screen(&wire),
                    Stroke::new(1.5, color(self.colors.live_wire)),
                ));
            }
        }

        if model.state() == SelectionState::Selected {
            let fill = color(self.colors.control_point);
            for p in model.control_points() {
                painter.circle_filled(
                    layout.image_to_screen(p),
                    self.control_point_radius,
                    fill,
                );
            }
        }
    }

    /// Lines from the pointer to the control points before and after the dragged one.
    fn paint_move_guides(&self, painter: &egui::Painter, layout: &ImageLayout, model: &SelectionModel) {
        let segments = model.selection();
        let Some(index) = self.selected_index.filter(|i| *i < segments.len()) else {
            return;
        };
        let n = segments.len();
        let before = segments[(index + n - 1) % n].start();
        let after = segments[index].end();
        let mouse = layout.image_to_screen(self.mouse_location);
        let stroke = Stroke::new(1.0, color(self.colors.move_guide));
        for p in [before, after] {
            painter.line_segment([layout.image_to_screen(p), mouse], stroke);
        }
        painter.circle_stroke(mouse, self.control_point_radius, stroke);
    }
}
