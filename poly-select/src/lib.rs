mod async_task;
mod error;
mod extract;
mod image_utils;
mod point;
mod poly_line;
mod selection;

pub use async_task::*;
pub use error::*;
pub use extract::*;
pub use image_utils::*;
pub use point::*;
pub use poly_line::*;
pub use selection::*;
