//! hOCR output rendering.

mod hocr;
mod options;

pub use hocr::HocrEmitter;
pub use options::{RenderOptions, TableMode};
