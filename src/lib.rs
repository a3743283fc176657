//! Library exports for rendering code selections to images.
//!
//! The pipeline runs model -> [`layout`] -> [`draw`] (rasterize) -> [`codec`]
//! (encode) -> [`transfer`] (multi-representation package) -> [`shot`]
//! (file and clipboard delivery). Configuration lives in [`config`].

pub mod codec;
pub mod config;
pub mod draw;
pub mod layout;
pub mod model;
pub mod shot;
pub mod transfer;
pub mod util;

pub use codec::{EncodedImage, EncodingError, ImageFormat};
pub use config::{Config, RenderOptions};
pub use layout::{Layout, LayoutEngine};
pub use model::{ModelError, StyledTextModel};
pub use transfer::TransferPackage;
