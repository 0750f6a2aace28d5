// src/stages/mod.rs

//! Concrete transform stages.

pub mod fonts;
pub mod images;
pub mod include;
pub mod scripts;
pub mod styles;

pub use fonts::{FontConvert, WebFont};
pub use images::ImageEncode;
pub use include::TemplateInclude;
pub use scripts::ScriptMinify;
pub use styles::StyleCompile;
