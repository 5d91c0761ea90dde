mod battery;
mod bounding_box;
mod camera;
mod detector;
mod labels;
mod render;
mod scheduler;

pub mod app;
pub mod config;

pub use app::start_app;
