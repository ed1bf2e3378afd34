mod app;
mod config;

pub use app::run_native;
pub use config::Config;
