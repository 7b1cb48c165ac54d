//! Declarative layout tree: plain tagged variants (box / text / image)
//! consumed by the pure layout pass. No retained state, no inheritance;
//! section builders assemble these trees fresh per render.

/// Stacking direction of a box's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Column,
    Row,
    /// Children are overlaid, each centered within the box.
    Stack,
}

/// A resolvable size along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    /// Derived from content (or from the parent, for text).
    Auto,
    Px(f32),
    /// Share the remaining space of the parent axis.
    Fill,
}

/// Main-axis distribution of children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Start,
    Center,
    End,
    SpaceBetween,
}

/// Cross-axis placement of children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Start,
    Center,
    End,
}

/// Visual properties of a box node.
#[derive(Debug, Clone)]
pub struct BoxStyle {
    pub direction: Direction,
    pub width: Dimension,
    pub height: Dimension,
    pub padding: f32,
    pub gap: f32,
    pub justify: Justify,
    pub align: Align,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub radius: f32,
}

impl BoxStyle {
    fn new(direction: Direction) -> Self {
        Self {
            direction,
            width: Dimension::Fill,
            height: Dimension::Auto,
            padding: 0.0,
            gap: 0.0,
            justify: Justify::Start,
            align: Align::Start,
            fill: None,
            stroke: None,
            radius: 0.0,
        }
    }
}

/// Visual properties of a text node. Boxes align box/image children; text
/// nodes are always assigned the full inner width and anchor themselves via
/// `align`.
#[derive(Debug, Clone)]
pub struct TextStyle {
    pub size: f32,
    pub weight: u16,
    pub color: String,
    pub letter_spacing: f32,
    pub line_height: f32,
    pub align: Align,
    /// Rotate -90 degrees about the node center (vertical bar labels).
    pub rotated: bool,
}

/// A layout tree node.
#[derive(Debug, Clone)]
pub enum Node {
    Box {
        style: BoxStyle,
        children: Vec<Node>,
    },
    Text {
        /// Pre-wrapped content; `\n` separates lines.
        content: String,
        style: TextStyle,
    },
    Image {
        href: String,
        width: f32,
        height: f32,
        radius: f32,
        stroke: Option<String>,
    },
}

impl Node {
    pub fn column(children: Vec<Node>) -> Node {
        Node::Box {
            style: BoxStyle::new(Direction::Column),
            children,
        }
    }

    pub fn row(children: Vec<Node>) -> Node {
        Node::Box {
            style: BoxStyle::new(Direction::Row),
            children,
        }
    }

    pub fn stack(children: Vec<Node>) -> Node {
        Node::Box {
            style: BoxStyle::new(Direction::Stack),
            children,
        }
    }

    pub fn text(content: impl Into<String>, size: f32, weight: u16, color: &str) -> Node {
        Node::Text {
            content: content.into(),
            style: TextStyle {
                size,
                weight,
                color: color.to_string(),
                letter_spacing: 0.0,
                line_height: 1.3,
                align: Align::Start,
                rotated: false,
            },
        }
    }

    pub fn image(href: impl Into<String>, width: f32, height: f32) -> Node {
        Node::Image {
            href: href.into(),
            width,
            height,
            radius: 0.0,
            stroke: None,
        }
    }

    // Builder-style setters; no-ops on node kinds the property does not
    // apply to.

    pub fn width(mut self, px: f32) -> Node {
        if let Node::Box { style, .. } = &mut self {
            style.width = Dimension::Px(px);
        }
        self
    }

    pub fn width_auto(mut self) -> Node {
        if let Node::Box { style, .. } = &mut self {
            style.width = Dimension::Auto;
        }
        self
    }

    pub fn height(mut self, px: f32) -> Node {
        if let Node::Box { style, .. } = &mut self {
            style.height = Dimension::Px(px);
        }
        self
    }

    pub fn height_fill(mut self) -> Node {
        if let Node::Box { style, .. } = &mut self {
            style.height = Dimension::Fill;
        }
        self
    }

    pub fn padding(mut self, px: f32) -> Node {
        if let Node::Box { style, .. } = &mut self {
            style.padding = px;
        }
        self
    }

    pub fn gap(mut self, px: f32) -> Node {
        if let Node::Box { style, .. } = &mut self {
            style.gap = px;
        }
        self
    }

    pub fn justify(mut self, justify: Justify) -> Node {
        if let Node::Box { style, .. } = &mut self {
            style.justify = justify;
        }
        self
    }

    pub fn align(mut self, align: Align) -> Node {
        if let Node::Box { style, .. } = &mut self {
            style.align = align;
        }
        self
    }

    pub fn bg(mut self, color: &str) -> Node {
        if let Node::Box { style, .. } = &mut self {
            style.fill = Some(color.to_string());
        }
        self
    }

    pub fn border(mut self, color: &str) -> Node {
        match &mut self {
            Node::Box { style, .. } => style.stroke = Some(color.to_string()),
            Node::Image { stroke, .. } => *stroke = Some(color.to_string()),
            Node::Text { .. } => {}
        }
        self
    }

    pub fn radius(mut self, px: f32) -> Node {
        match &mut self {
            Node::Box { style, .. } => style.radius = px,
            Node::Image { radius, .. } => *radius = px,
            Node::Text { .. } => {}
        }
        self
    }

    pub fn letter_spacing(mut self, px: f32) -> Node {
        if let Node::Text { style, .. } = &mut self {
            style.letter_spacing = px;
        }
        self
    }

    pub fn line_height(mut self, factor: f32) -> Node {
        if let Node::Text { style, .. } = &mut self {
            style.line_height = factor;
        }
        self
    }

    pub fn text_align(mut self, align: Align) -> Node {
        if let Node::Text { style, .. } = &mut self {
            style.align = align;
        }
        self
    }

    pub fn rotated(mut self) -> Node {
        if let Node::Text { style, .. } = &mut self {
            style.rotated = true;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_box_properties() {
        let node = Node::column(vec![]).width(404.0).padding(32.0).gap(8.0).radius(32.0);
        match node {
            Node::Box { style, .. } => {
                assert_eq!(style.width, Dimension::Px(404.0));
                assert_eq!(style.padding, 32.0);
                assert_eq!(style.gap, 8.0);
                assert_eq!(style.radius, 32.0);
            }
            _ => panic!("unexpected"),
        }
    }

    #[test]
    fn setters_ignore_wrong_kind() {
        let node = Node::text("x", 12.0, 400, "#000").padding(10.0);
        match node {
            Node::Text { style, .. } => assert_eq!(style.size, 12.0),
            _ => panic!("unexpected"),
        }
    }
}
