use std::{cell::Cell, path::PathBuf, rc::Rc};

use image_state::ImageState;
use log::{debug, info};
use poly_select::{ChangeValue, Property, SelectionModel, SelectionState};

use crate::config::Config;
use canvas::SelectionCanvas;

mod canvas;
mod image_state;
mod menu;
mod native;
mod viewer;

pub use native::run_native;

/// Which commands are available in a given state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Controls {
    pub cancel: bool,
    pub undo: bool,
    pub finish: bool,
    pub reset: bool,
    pub save: bool,
}

impl Controls {
    pub fn for_state(state: SelectionState) -> Self {
        match state {
            SelectionState::NoSelection => Self::default(),
            SelectionState::Processing => Self {
                cancel: true,
                ..Self::default()
            },
            SelectionState::Selecting => Self {
                undo: true,
                finish: true,
                reset: true,
                ..Self::default()
            },
            SelectionState::Selected => Self {
                undo: true,
                reset: true,
                save: true,
                ..Self::default()
            },
        }
    }

    /// Undo also aborts a pending leg, so it is offered while processing.
    pub fn can_undo(&self) -> bool {
        self.undo || self.cancel
    }
}

pub(crate) struct SelectorApp {
    model: SelectionModel,
    image_state: ImageState,
    canvas: SelectionCanvas,
    /// State as last reported through notifications
    shown_state: Rc<Cell<SelectionState>>,
    /// Outcome of the last file operation
    message: Option<String>,
}

impl SelectorApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: &Config, image: Option<PathBuf>) -> Self {
        let mut model = SelectionModel::point_to_point(config.notify);
        let shown_state = Rc::new(Cell::new(model.state()));
        let state_sink = shown_state.clone();
        model.add_property_listener(Property::State, move |change| {
            if let ChangeValue::State(s) = change.new {
                debug!("Selection state is now {s}");
                state_sink.set(s);
            }
        });

        let mut canvas = SelectionCanvas::new(config.control_point_radius, config.colors);
        canvas.attach(&mut model);

        Self {
            model,
            image_state: image.map_or(ImageState::NotLoaded, ImageState::load),
            canvas,
            shown_state,
            message: None,
        }
    }

    fn controls(&self) -> Controls {
        if self.image_state.texture().is_none() {
            return Controls::default();
        }
        Controls::for_state(self.model.state())
    }

    fn open_image(&mut self, path: PathBuf) {
        info!("Open {}", path.display());
        self.message = None;
        self.image_state = ImageState::load(path);
    }

    fn close_image(&mut self) {
        self.model.set_image(None);
        self.image_state = ImageState::NotLoaded;
        self.message = None;
    }

    fn advance(&mut self, ctx: &egui::Context) {
        let model = &mut self.model;
        let canvas = &mut self.canvas;
        self.image_state.update(ctx, |image| {
            info!("Loaded image of {}x{} pixels", image.width(), image.height());
            model.set_image(Some(image));
            canvas.reset_view();
        });

        if self.model.poll_processing() {
            info!("{} finished a segment", self.model.strategy_name());
        }
        if self.model.state().is_processing() {
            ctx.request_repaint();
        }
        self.model.dispatch_pending();
    }
}

impl eframe::App for SelectorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.advance(ctx);
        self.handle_shortcuts(ctx);

        egui::TopBottomPanel::top("menu").show(ctx, |ui| self.menu_ui(ui));
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.status_ui(ui));
        egui::SidePanel::right("controls")
            .resizable(false)
            .show(ctx, |ui| self.controls_ui(ui));

        egui::CentralPanel::default().show(ctx, |ui| match &self.image_state {
            ImageState::Loaded(loaded) => {
                self.canvas.ui(ui, &mut self.model, &loaded.texture);
            }
            ImageState::Loading(path, _) => {
                ui.centered_and_justified(|ui| {
                    ui.label(format!("Loading {}", path.display()));
                });
            }
            ImageState::Error(error) => {
                ui.colored_label(ui.visuals().error_fg_color, error);
            }
            ImageState::NotLoaded => {
                ui.centered_and_justified(|ui| {
                    ui.label("Open an image to start a selection");
                });
            }
        });

        // Mutations from this frame's input are delivered before the next frame
        if self.model.dispatch_pending() > 0 {
            ctx.request_repaint();
        }
    }
}
