//! Rendering pipeline: layout tree -> positioned primitives -> SVG document
//! -> PNG pixels.

pub mod layout;
pub mod node;
pub mod raster;
pub mod svg;

/// A rasterized image: pixel dimensions plus encoded PNG bytes.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}
