//! Imaging module for Lenslate
//!
//! Transport encoding, thumbnail production, and the translation overlay
//! renderer.

pub mod codec;
pub mod overlay;

pub use codec::{encode, thumbnail, TransportImage};
pub use overlay::{layout_lines, OverlayRenderer, TextLayout};
