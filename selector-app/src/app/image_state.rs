use std::{io, path::PathBuf};

use egui::{ColorImage, TextureHandle, TextureOptions};
use futures::FutureExt;
use image::DynamicImage;
use poly_select::{BoxFuture, PollTask, load_image, rgba_pixels};

#[allow(clippy::large_enum_variant)]
pub(super) enum ImageState {
    NotLoaded,
    Loading(PathBuf, PollTask<io::Result<DynamicImage>>),
    Loaded(ImageStateLoaded),
    Error(String),
}

pub(super) struct ImageStateLoaded {
    pub path: PathBuf,
    pub texture: TextureHandle,
}

impl ImageState {
    pub fn load(path: PathBuf) -> Self {
        let task = PollTask::new(read_image(path.clone()));
        ImageState::Loading(path, task)
    }

    pub fn texture(&self) -> Option<&TextureHandle> {
        match self {
            ImageState::Loaded(ImageStateLoaded { texture, .. }) => Some(texture),
            _ => None,
        }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ImageState::Loading(path, _) | ImageState::Loaded(ImageStateLoaded { path, .. }) => {
                Some(path)
            }
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ImageState::Loading(..))
    }

    /// Advance a pending load. `on_image_load` receives the decoded image once,
    /// right after its texture was created.
    pub fn update(&mut self, ctx: &egui::Context, on_image_load: impl FnOnce(DynamicImage)) {
        let ImageState::Loading(path, task) = self else {
            return;
        };
        let Some(result) = task.poll_ready() else {
            ctx.request_repaint();
            return;
        };
        let path = std::mem::take(path);
        *self = match result {
            Ok(image) => {
                let (size, pixels) = rgba_pixels(&image);
                let texture = ctx.load_texture(
                    path.to_string_lossy(),
                    ColorImage::from_rgba_unmultiplied(size, &pixels),
                    TextureOptions {
                        magnification: egui::TextureFilter::Nearest,
                        ..Default::default()
                    },
                );
                on_image_load(image);
                ImageState::Loaded(ImageStateLoaded { path, texture })
            }
            Err(e) => ImageState::Error(format!("Could not open {}: {e}", path.display())),
        };
    }
}

/// Read and decode on a worker thread, the returned future resolves once it is done.
fn read_image(path: PathBuf) -> BoxFuture<'static, io::Result<DynamicImage>> {
    let (tx, rx) = futures::channel::oneshot::channel();
    std::thread::spawn(move || {
        let r = std::fs::read(&path).and_then(|bytes| load_image(&bytes));
        // The receiver is gone if the load was abandoned
        let _ = tx.send(r);
    });
    async move { rx.await.map_err(io::Error::other).and_then(|r| r) }.boxed()
}
