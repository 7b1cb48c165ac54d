//! Pure layout pass: a `Node` tree plus a target width in, absolutely
//! positioned paint primitives out. Measurement uses estimated text metrics
//! (character advance as a fraction of the font size); exact horizontal text
//! placement is delegated to SVG text anchors, so the estimates only steer
//! block sizing and never the anchor math.

use super::node::{Align, BoxStyle, Dimension, Direction, Justify, Node, TextStyle};

/// Estimated advance per character as a fraction of the font size.
const CHAR_WIDTH_FACTOR: f32 = 0.56;
/// Baseline offset from the line top as a fraction of the font size.
const ASCENT_FACTOR: f32 = 0.78;

/// One absolutely positioned drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<String>,
        stroke: Option<String>,
        radius: f32,
    },
    /// One line of text. `x` is the anchor point resolved per `anchor`;
    /// `y` is the baseline.
    TextLine {
        x: f32,
        y: f32,
        content: String,
        size: f32,
        weight: u16,
        color: String,
        letter_spacing: f32,
        anchor: Align,
        /// Center of a -90 degree rotation, when set.
        rotate_about: Option<(f32, f32)>,
    },
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        href: String,
        radius: f32,
        stroke: Option<String>,
    },
}

/// The laid-out document: final dimensions plus draw-ordered primitives.
#[derive(Debug, Clone)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub primitives: Vec<Primitive>,
}

/// Lay out `root` at the given width; height derives from content unless the
/// root style fixes it.
pub fn compute(root: &Node, target_width: f32) -> Layout {
    let (_, height) = measure(root, target_width);
    let mut primitives = Vec::new();
    place(root, 0.0, 0.0, target_width, height, &mut primitives);
    Layout {
        width: target_width,
        height,
        primitives,
    }
}

fn text_block_size(content: &str, style: &TextStyle, avail_w: f32) -> (f32, f32) {
    let widest = content
        .lines()
        .map(|line| {
            let n = line.chars().count() as f32;
            n * style.size * CHAR_WIDTH_FACTOR + style.letter_spacing * (n - 1.0).max(0.0)
        })
        .fold(0.0f32, f32::max);
    let lines = content.lines().count().max(1) as f32;
    (widest.min(avail_w), lines * style.size * style.line_height)
}

/// Measure the intrinsic size of a node given the available width.
fn measure(node: &Node, avail_w: f32) -> (f32, f32) {
    match node {
        Node::Text { content, style } => text_block_size(content, style, avail_w),
        Node::Image { width, height, .. } => (*width, *height),
        Node::Box { style, children } => {
            let resolved_w = match style.width {
                Dimension::Px(w) => w,
                _ => avail_w,
            };
            let inner_w = (resolved_w - 2.0 * style.padding).max(0.0);
            let sizes: Vec<(f32, f32)> = children.iter().map(|c| measure(c, inner_w)).collect();
            let gaps = style.gap * children.len().saturating_sub(1) as f32;

            let content_w = match style.direction {
                Direction::Row => sizes.iter().map(|s| s.0).sum::<f32>() + gaps,
                Direction::Column | Direction::Stack => {
                    sizes.iter().map(|s| s.0).fold(0.0, f32::max)
                }
            };
            let content_h = match style.direction {
                Direction::Column => sizes.iter().map(|s| s.1).sum::<f32>() + gaps,
                Direction::Row | Direction::Stack => sizes.iter().map(|s| s.1).fold(0.0, f32::max),
            };

            let w = match style.width {
                Dimension::Px(w) => w,
                Dimension::Fill => avail_w,
                Dimension::Auto => content_w + 2.0 * style.padding,
            };
            let h = match style.height {
                Dimension::Px(h) => h,
                _ => content_h + 2.0 * style.padding,
            };
            (w, h)
        }
    }
}

fn child_width(child: &Node, inner_w: f32) -> Option<f32> {
    // None marks a Fill child whose width the parent row resolves.
    match child {
        Node::Box { style, .. } => match style.width {
            Dimension::Px(w) => Some(w),
            Dimension::Fill => None,
            Dimension::Auto => Some(measure(child, inner_w).0),
        },
        Node::Text { .. } | Node::Image { .. } => Some(measure(child, inner_w).0),
    }
}

fn child_height(child: &Node, inner_w: f32) -> Option<f32> {
    match child {
        Node::Box { style, .. } => match style.height {
            Dimension::Px(h) => Some(h),
            Dimension::Fill => None,
            Dimension::Auto => Some(measure(child, inner_w).1),
        },
        Node::Text { .. } | Node::Image { .. } => Some(measure(child, inner_w).1),
    }
}

fn cross_offset(align: Align, avail: f32, used: f32) -> f32 {
    match align {
        Align::Start => 0.0,
        Align::Center => (avail - used) / 2.0,
        Align::End => avail - used,
    }
}

/// Emit primitives for `node` placed at the assigned rect.
fn place(node: &Node, x: f32, y: f32, w: f32, h: f32, out: &mut Vec<Primitive>) {
    match node {
        Node::Text { content, style } => place_text(content, style, x, y, w, h, out),
        Node::Image {
            href,
            radius,
            stroke,
            ..
        } => out.push(Primitive::Image {
            x,
            y,
            width: w,
            height: h,
            href: href.clone(),
            radius: *radius,
            stroke: stroke.clone(),
        }),
        Node::Box { style, children } => {
            if style.fill.is_some() || style.stroke.is_some() {
                out.push(Primitive::Rect {
                    x,
                    y,
                    width: w,
                    height: h,
                    fill: style.fill.clone(),
                    stroke: style.stroke.clone(),
                    radius: style.radius,
                });
            }
            let x0 = x + style.padding;
            let y0 = y + style.padding;
            let inner_w = (w - 2.0 * style.padding).max(0.0);
            let inner_h = (h - 2.0 * style.padding).max(0.0);
            match style.direction {
                Direction::Column => place_column(style, children, x0, y0, inner_w, inner_h, out),
                Direction::Row => place_row(style, children, x0, y0, inner_w, inner_h, out),
                Direction::Stack => {
                    for child in children {
                        let cw = child_width(child, inner_w).unwrap_or(inner_w);
                        let ch = child_height(child, inner_w).unwrap_or(inner_h);
                        let cx = x0 + (inner_w - cw) / 2.0;
                        let cy = y0 + (inner_h - ch) / 2.0;
                        place(child, cx, cy, cw, ch, out);
                    }
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn place_column(
    style: &BoxStyle,
    children: &[Node],
    x0: f32,
    y0: f32,
    inner_w: f32,
    inner_h: f32,
    out: &mut Vec<Primitive>,
) {
    let widths: Vec<f32> = children
        .iter()
        .map(|c| match c {
            // Text always spans the inner width and anchors itself.
            Node::Text { .. } => inner_w,
            _ => child_width(c, inner_w).unwrap_or(inner_w),
        })
        .collect();
    let heights: Vec<Option<f32>> = children.iter().map(|c| child_height(c, inner_w)).collect();

    let gaps = style.gap * children.len().saturating_sub(1) as f32;
    let fixed: f32 = heights.iter().flatten().sum();
    let fill_count = heights.iter().filter(|h| h.is_none()).count();
    let fill_each = if fill_count > 0 {
        ((inner_h - fixed - gaps) / fill_count as f32).max(0.0)
    } else {
        0.0
    };

    let used = fixed + fill_each * fill_count as f32 + gaps;
    let free = if fill_count > 0 { 0.0 } else { (inner_h - used).max(0.0) };
    let (mut cursor, extra_gap) = match style.justify {
        Justify::Start => (y0, 0.0),
        Justify::Center => (y0 + free / 2.0, 0.0),
        Justify::End => (y0 + free, 0.0),
        Justify::SpaceBetween if children.len() > 1 => {
            (y0, free / (children.len() - 1) as f32)
        }
        Justify::SpaceBetween => (y0, 0.0),
    };

    for (i, child) in children.iter().enumerate() {
        let cw = widths[i];
        let ch = heights[i].unwrap_or(fill_each);
        let cx = match child {
            Node::Text { .. } => x0,
            _ => x0 + cross_offset(style.align, inner_w, cw),
        };
        place(child, cx, cursor, cw, ch, out);
        cursor += ch + style.gap + extra_gap;
    }
}

#[allow(clippy::too_many_arguments)]
fn place_row(
    style: &BoxStyle,
    children: &[Node],
    x0: f32,
    y0: f32,
    inner_w: f32,
    inner_h: f32,
    out: &mut Vec<Primitive>,
) {
    let widths_raw: Vec<Option<f32>> = children.iter().map(|c| child_width(c, inner_w)).collect();
    let gaps = style.gap * children.len().saturating_sub(1) as f32;
    let fixed: f32 = widths_raw.iter().flatten().sum();
    let fill_count = widths_raw.iter().filter(|w| w.is_none()).count();
    let fill_each = if fill_count > 0 {
        ((inner_w - fixed - gaps) / fill_count as f32).max(0.0)
    } else {
        0.0
    };

    let used = fixed + fill_each * fill_count as f32 + gaps;
    let free = if fill_count > 0 { 0.0 } else { (inner_w - used).max(0.0) };
    let (mut cursor, extra_gap) = match style.justify {
        Justify::Start => (x0, 0.0),
        Justify::Center => (x0 + free / 2.0, 0.0),
        Justify::End => (x0 + free, 0.0),
        Justify::SpaceBetween if children.len() > 1 => {
            (x0, free / (children.len() - 1) as f32)
        }
        Justify::SpaceBetween => (x0, 0.0),
    };

    for (i, child) in children.iter().enumerate() {
        let cw = widths_raw[i].unwrap_or(fill_each);
        let ch = child_height(child, cw).unwrap_or(inner_h);
        let cy = y0 + cross_offset(style.align, inner_h, ch);
        place(child, cursor, cy, cw, ch, out);
        cursor += cw + style.gap + extra_gap;
    }
}

#[allow(clippy::too_many_arguments)]
fn place_text(
    content: &str,
    style: &TextStyle,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    out: &mut Vec<Primitive>,
) {
    let anchor_x = match style.align {
        Align::Start => x,
        Align::Center => x + w / 2.0,
        Align::End => x + w,
    };
    let rotate_about = style.rotated.then_some((x + w / 2.0, y + h / 2.0));
    for (i, line) in content.lines().enumerate() {
        let baseline = y + i as f32 * style.size * style.line_height + style.size * ASCENT_FACTOR;
        out.push(Primitive::TextLine {
            x: anchor_x,
            y: baseline,
            content: line.to_string(),
            size: style.size,
            weight: style.weight,
            color: style.color.clone(),
            letter_spacing: style.letter_spacing,
            anchor: style.align,
            rotate_about,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rects(layout: &Layout) -> Vec<(f32, f32, f32, f32)> {
        layout
            .primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Rect {
                    x, y, width, height, ..
                } => Some((*x, *y, *width, *height)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn column_stacks_children_with_gap() {
        let tree = Node::column(vec![
            Node::column(vec![]).height(40.0).bg("#fff"),
            Node::column(vec![]).height(60.0).bg("#fff"),
        ])
        .gap(8.0)
        .padding(10.0);
        let layout = compute(&tree, 200.0);
        assert_eq!(layout.height, 40.0 + 8.0 + 60.0 + 20.0);
        let r = rects(&layout);
        assert_eq!(r[0], (10.0, 10.0, 180.0, 40.0));
        assert_eq!(r[1], (10.0, 58.0, 180.0, 60.0));
    }

    #[test]
    fn row_splits_remaining_width_between_fill_children() {
        let tree = Node::row(vec![
            Node::column(vec![]).bg("#fff"),
            Node::column(vec![]).width(20.0).bg("#fff"),
            Node::column(vec![]).bg("#fff"),
        ])
        .gap(10.0)
        .height(50.0);
        let layout = compute(&tree, 240.0);
        let r = rects(&layout);
        // 240 - 20 fixed - 2 gaps of 10 = 200 shared by the two fill boxes.
        assert_eq!(r[0].2, 100.0);
        assert_eq!(r[1].2, 20.0);
        assert_eq!(r[2].2, 100.0);
        assert_eq!(r[2].0, 100.0 + 10.0 + 20.0 + 10.0);
    }

    #[test]
    fn fixed_height_column_centers_content() {
        let tree = Node::column(vec![Node::column(vec![]).height(30.0).width(30.0).bg("#fff")])
            .height(100.0)
            .justify(Justify::Center)
            .align(Align::Center);
        let layout = compute(&tree, 100.0);
        let r = rects(&layout);
        assert_eq!(r[0], (35.0, 35.0, 30.0, 30.0));
    }

    #[test]
    fn stack_overlays_children_centered() {
        let tree = Node::stack(vec![
            Node::image("data:x", 80.0, 80.0),
            Node::column(vec![]).width(40.0).height(20.0).bg("#fff"),
        ])
        .width(100.0)
        .height(100.0);
        let layout = compute(&tree, 100.0);
        match &layout.primitives[0] {
            Primitive::Image { x, y, .. } => {
                assert_eq!((*x, *y), (10.0, 10.0));
            }
            other => panic!("unexpected {other:?}"),
        }
        let r = rects(&layout);
        assert_eq!(r[0], (30.0, 40.0, 40.0, 20.0));
    }

    #[test]
    fn centered_text_anchors_at_midline() {
        let tree = Node::column(vec![
            Node::text("hello", 10.0, 400, "#000").text_align(Align::Center)
        ])
        .width(200.0);
        let layout = compute(&tree, 200.0);
        match &layout.primitives[0] {
            Primitive::TextLine { x, anchor, .. } => {
                assert_eq!(*x, 100.0);
                assert_eq!(*anchor, Align::Center);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn multi_line_text_advances_baselines() {
        let tree = Node::column(vec![Node::text("a\nb", 10.0, 400, "#000").line_height(1.5)]);
        let layout = compute(&tree, 100.0);
        let baselines: Vec<f32> = layout
            .primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::TextLine { y, .. } => Some(*y),
                _ => None,
            })
            .collect();
        assert_eq!(baselines.len(), 2);
        assert!((baselines[1] - baselines[0] - 15.0).abs() < 1e-4);
    }

    #[test]
    fn fill_height_child_absorbs_leftover_space() {
        let tree = Node::column(vec![
            Node::column(vec![]).height(20.0).bg("#fff"),
            Node::column(vec![]).height_fill().bg("#fff"),
        ])
        .height(120.0)
        .gap(10.0);
        let layout = compute(&tree, 60.0);
        let r = rects(&layout);
        assert_eq!(r[1].3, 90.0);
    }
}
