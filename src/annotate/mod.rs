//! Annotation layout and drawing.
//!
//! `layout` computes where boxes and labels go, `font` measures and draws
//! text, `render` puts both onto pixels.

pub mod font;
pub mod layout;
pub mod render;

pub use font::LabelFont;
pub use layout::{LabelLayout, compute_layout, label_text, text_origin};
pub use render::annotate;
