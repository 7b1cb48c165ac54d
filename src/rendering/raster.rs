//! Rasterizer invocation: SVG document + provisioned fonts -> PNG buffer.
//!
//! Section images are produced at 2x the nominal width for crisper output on
//! high-density displays; the composite re-embeds those PNGs and rasterizes
//! at 1x. The background stays transparent. A font set missing the required
//! base family fails loudly here; the rasterizer runs outside any system
//! font-resolution environment, so there is no silent fallback.

use std::sync::Arc;

use resvg::usvg::fontdb;
use resvg::{tiny_skia, usvg};

use super::RasterImage;
use crate::error::{Error, Result};
use crate::fonts;

/// Scale applied to single-section renders.
pub const RETINA_SCALE: f32 = 2.0;

/// Rasterize an SVG document at the given scale.
pub fn rasterize(svg: &str, fonts: Arc<fontdb::Database>, scale: f32) -> Result<RasterImage> {
    fonts::ensure_base_family(&fonts)?;

    let mut options = usvg::Options::default();
    options.font_family = fonts::REQUIRED_FAMILY.to_string();
    options.fontdb = fonts;

    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| Error::Render(format!("SVG parse failed: {e}")))?;

    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width.max(1), height.max(1))
        .ok_or_else(|| Error::Render(format!("cannot allocate {width}x{height} pixmap")))?;

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let png = pixmap
        .encode_png()
        .map_err(|e| Error::Render(format!("PNG encoding failed: {e}")))?;

    Ok(RasterImage {
        width: width.max(1),
        height: height.max(1),
        png,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_font_set_fails_loudly() {
        let db = Arc::new(fontdb::Database::new());
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"></svg>"#;
        match rasterize(svg, db, RETINA_SCALE) {
            Err(Error::FontProvisioning(_)) => {}
            other => panic!("expected FontProvisioning error, got {other:?}"),
        }
    }
}
