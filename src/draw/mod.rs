//! Rendering primitives and the Cairo-based rasterizer.
//!
//! This module defines the core drawing types used for code screenshots:
//! - [`Color`]: RGBA color representation with predefined color constants
//! - [`FontDescriptor`]: font family, pixel size and style bits
//! - [`PixelBuffer`]: the straight-alpha RGBA output of rasterization
//! - Painting functions shared by raster and vector output

pub mod color;
pub mod font;
pub mod pixels;
pub mod raster;
pub mod render;

// Re-export commonly used types at module level
pub use color::Color;
pub use font::FontDescriptor;
pub use pixels::PixelBuffer;
pub use raster::{RenderError, rasterize};
pub use render::{render_glyph_run, render_op, render_ops};
