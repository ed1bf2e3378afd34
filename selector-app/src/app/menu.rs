use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use egui::{Button, Key, KeyboardShortcut, Modifiers, ViewportCommand};
use log::{info, warn};
use poly_select::{ExportError, SelectionModel};
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use super::SelectorApp;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff"];

const OPEN: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::O);
const SAVE: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::S);
const CLOSE: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::W);
const UNDO: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Z);

/// User requests from menus, buttons and shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Open,
    Save,
    Close,
    Exit,
    Undo,
    Finish,
    Cancel,
    Reset,
}

impl SelectorApp {
    pub(super) fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let controls = self.controls();
        let has_image = self.image_state.texture().is_some() || self.image_state.is_loading();
        let pressed = ctx.input_mut(|i| {
            [
                (OPEN, Command::Open, true),
                (SAVE, Command::Save, controls.save),
                (CLOSE, Command::Close, has_image),
                (UNDO, Command::Undo, controls.can_undo()),
            ]
            .into_iter()
            .filter(|(shortcut, _, enabled)| *enabled && i.consume_shortcut(shortcut))
            .map(|(_, command, _)| command)
            .collect::<Vec<_>>()
        });
        for command in pressed {
            self.execute(ctx, command);
        }
    }

    pub(super) fn menu_ui(&mut self, ui: &mut egui::Ui) {
        let controls = self.controls();
        let has_image = self.image_state.texture().is_some() || self.image_state.is_loading();
        let ctx = ui.ctx().clone();
        let mut command = None;

        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                command = command
                    .or(menu_entry(ui, "Open...", Some(&OPEN), true, Command::Open))
                    .or(menu_entry(ui, "Save selection...", Some(&SAVE), controls.save, Command::Save))
                    .or(menu_entry(ui, "Close", Some(&CLOSE), has_image, Command::Close));
                ui.separator();
                command = command.or(menu_entry(ui, "Exit", None, true, Command::Exit));
            });
            ui.menu_button("Edit", |ui| {
                command = command.or(menu_entry(ui, "Undo", Some(&UNDO), controls.can_undo(), Command::Undo));
            });
        });

        if let Some(command) = command {
            self.execute(&ctx, command);
        }
    }

    pub(super) fn controls_ui(&mut self, ui: &mut egui::Ui) {
        let controls = self.controls();
        let mut command = None;
        ui.vertical_centered_justified(|ui| {
            for (label, enabled, cmd) in [
                ("Cancel", controls.cancel, Command::Cancel),
                ("Undo", controls.undo, Command::Undo),
                ("Finish", controls.finish, Command::Finish),
                ("Reset", controls.reset, Command::Reset),
            ] {
                if ui.add_enabled(enabled, Button::new(label)).clicked() {
                    command = Some(cmd);
                }
            }
        });
        ui.separator();
        ui.label(format!("Strategy: {}", self.model.strategy_name()));

        if let Some(command) = command {
            self.execute(ui.ctx(), command);
        }
    }

    pub(super) fn status_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(self.shown_state.get().to_string());
            if self.image_state.texture().is_some() {
                let p = self.canvas.mouse_location();
                ui.separator();
                ui.label(format!("Pixel: {p}"));
            }
            if let Some(path) = self.image_state.path() {
                ui.separator();
                ui.label(path.display().to_string());
            }
            if let Some(message) = &self.message {
                ui.separator();
                ui.label(message);
            }
        });
    }

    fn execute(&mut self, ctx: &egui::Context, command: Command) {
        let result = match command {
            Command::Open => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Images", IMAGE_EXTENSIONS)
                    .pick_file()
                {
                    self.open_image(path);
                    ctx.send_viewport_cmd(ViewportCommand::Title(window_title(
                        self.image_state.path(),
                    )));
                }
                Ok(())
            }
            Command::Save => {
                self.save_dialog();
                Ok(())
            }
            Command::Close => {
                self.close_image();
                ctx.send_viewport_cmd(ViewportCommand::Title(window_title(None)));
                Ok(())
            }
            Command::Exit => {
                ctx.send_viewport_cmd(ViewportCommand::Close);
                Ok(())
            }
            Command::Undo => self.model.undo(),
            Command::Finish => self.model.finish_selection(),
            Command::Cancel => {
                self.model.cancel_processing();
                Ok(())
            }
            Command::Reset => {
                self.model.reset();
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!("{command:?} rejected: {e}");
        }
    }

    fn save_dialog(&mut self) {
        let suggested = self
            .image_state
            .path()
            .and_then(|p| p.file_stem())
            .map(|stem| format!("{}-selection.png", stem.to_string_lossy()))
            .unwrap_or_else(|| "selection.png".into());
        let path = loop {
            let Some(chosen) = rfd::FileDialog::new()
                .add_filter("PNG", &["png"])
                .set_file_name(&suggested)
                .save_file()
            else {
                return;
            };
            let path = with_png_extension(chosen.clone());
            if !needs_overwrite_prompt(&chosen, &path) || confirm_overwrite(&path) {
                break path;
            }
        };

        self.message = Some(match write_selection(&self.model, &path) {
            Ok(()) => format!("Saved {}", path.display()),
            Err(e) => {
                warn!("Saving {} failed: {e}", path.display());
                format!("Error during save: {e}")
            }
        });
    }
}

/// Encode first and touch the file only once the export succeeded.
fn write_selection(model: &SelectionModel, path: &Path) -> Result<(), ExportError> {
    let mut encoded = Cursor::new(Vec::new());
    model.save_selection(&mut encoded)?;
    std::fs::write(path, encoded.into_inner()).map_err(image::ImageError::from)?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// The dialog already confirmed overwriting `chosen`, but not a name we derived from it.
fn needs_overwrite_prompt(chosen: &Path, target: &Path) -> bool {
    chosen != target && target.exists()
}

fn confirm_overwrite(path: &Path) -> bool {
    MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title("File exists")
        .set_description(format!("{} already exists. Overwrite it?", path.display()))
        .set_buttons(MessageButtons::YesNo)
        .show()
        == MessageDialogResult::Yes
}

fn menu_entry(
    ui: &mut egui::Ui,
    label: &str,
    shortcut: Option<&KeyboardShortcut>,
    enabled: bool,
    command: Command,
) -> Option<Command> {
    let mut button = Button::new(label);
    if let Some(shortcut) = shortcut {
        button = button.shortcut_text(ui.ctx().format_shortcut(shortcut));
    }
    if ui.add_enabled(enabled, button).clicked() {
        ui.close_menu();
        Some(command)
    } else {
        None
    }
}

/// Selections are always written as PNG, whatever name the user picked.
fn with_png_extension(path: PathBuf) -> PathBuf {
    let is_png = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_png {
        return path;
    }
    let mut name = path.into_os_string();
    name.push(".png");
    PathBuf::from(name)
}

fn window_title(image: Option<&PathBuf>) -> String {
    match image.and_then(|p| p.file_name()) {
        Some(name) => format!("Polygon selector - {}", name.to_string_lossy()),
        None => "Polygon selector".into(),
    }
}
