pub mod config;
pub mod error;
pub mod image;

pub use config::Config;
pub use error::*;
pub use image::{ImageRecord, ImageStatus};
