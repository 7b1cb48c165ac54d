//! SVG document emitter: laid-out primitives in, a deterministic vector
//! document out. Coordinates are printed with two decimals so the same
//! layout always serializes to the same bytes.

use super::layout::{Layout, Primitive};
use crate::rendering::node::Align;

/// Font stack requested for every text run; the rasterizer resolves these
/// against the provisioned font set only.
pub const FONT_STACK: &str = "Inter, Noto Sans, sans-serif";

pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Serialize a layout to a standalone SVG document.
pub fn document(layout: &Layout) -> String {
    let mut defs = String::new();
    let mut body = String::new();
    let mut clip_seq = 0usize;

    for primitive in &layout.primitives {
        match primitive {
            Primitive::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
                radius,
            } => {
                body.push_str(&format!(
                    r#"<rect x="{x:.2}" y="{y:.2}" width="{width:.2}" height="{height:.2}""#
                ));
                if *radius > 0.0 {
                    body.push_str(&format!(r#" rx="{radius:.2}""#));
                }
                match fill {
                    Some(color) => body.push_str(&format!(r#" fill="{color}""#)),
                    None => body.push_str(r#" fill="none""#),
                }
                if let Some(color) = stroke {
                    body.push_str(&format!(r#" stroke="{color}" stroke-width="1""#));
                }
                body.push_str("/>");
            }
            Primitive::TextLine {
                x,
                y,
                content,
                size,
                weight,
                color,
                letter_spacing,
                anchor,
                rotate_about,
            } => {
                body.push_str(&format!(
                    r#"<text x="{x:.2}" y="{y:.2}" font-family="{FONT_STACK}" font-size="{size:.1}" font-weight="{weight}" fill="{color}""#
                ));
                if *letter_spacing != 0.0 {
                    body.push_str(&format!(r#" letter-spacing="{letter_spacing:.2}""#));
                }
                match anchor {
                    Align::Start => {}
                    Align::Center => body.push_str(r#" text-anchor="middle""#),
                    Align::End => body.push_str(r#" text-anchor="end""#),
                }
                if let Some((cx, cy)) = rotate_about {
                    body.push_str(&format!(r#" transform="rotate(-90 {cx:.2} {cy:.2})""#));
                }
                body.push_str(&format!(">{}</text>", escape_xml(content)));
            }
            Primitive::Image {
                x,
                y,
                width,
                height,
                href,
                radius,
                stroke,
            } => {
                let clip = if *radius > 0.0 {
                    clip_seq += 1;
                    let id = format!("clip{clip_seq}");
                    if *radius >= width.min(*height) / 2.0 {
                        defs.push_str(&format!(
                            r#"<clipPath id="{id}"><circle cx="{:.2}" cy="{:.2}" r="{:.2}"/></clipPath>"#,
                            x + width / 2.0,
                            y + height / 2.0,
                            width.min(*height) / 2.0,
                        ));
                    } else {
                        defs.push_str(&format!(
                            r#"<clipPath id="{id}"><rect x="{x:.2}" y="{y:.2}" width="{width:.2}" height="{height:.2}" rx="{radius:.2}"/></clipPath>"#
                        ));
                    }
                    Some(id)
                } else {
                    None
                };

                body.push_str(&format!(
                    r#"<image x="{x:.2}" y="{y:.2}" width="{width:.2}" height="{height:.2}" preserveAspectRatio="xMidYMid slice" href="{}""#,
                    escape_xml(href)
                ));
                if let Some(id) = &clip {
                    body.push_str(&format!(r#" clip-path="url(#{id})""#));
                }
                body.push_str("/>");

                // Outline drawn on top so the clip does not swallow it.
                if let Some(color) = stroke {
                    if *radius >= width.min(*height) / 2.0 {
                        body.push_str(&format!(
                            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{color}" stroke-width="1"/>"#,
                            x + width / 2.0,
                            y + height / 2.0,
                            width.min(*height) / 2.0,
                        ));
                    } else {
                        body.push_str(&format!(
                            r#"<rect x="{x:.2}" y="{y:.2}" width="{width:.2}" height="{height:.2}" rx="{radius:.2}" fill="none" stroke="{color}" stroke-width="1"/>"#
                        ));
                    }
                }
            }
        }
    }

    let defs_block = if defs.is_empty() {
        String::new()
    } else {
        format!("<defs>{defs}</defs>")
    };
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">{defs_block}{body}</svg>"#,
        w = layout.width,
        h = layout.height,
    )
}
