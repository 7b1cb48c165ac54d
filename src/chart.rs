//! Chart model builder: weekly aggregation, the smoothed activity line/area
//! path and the stroke-dash doughnut. Both charts are emitted as standalone
//! SVG strings so the rasterizer applies consistent anti-aliasing and
//! scaling later; the section builders embed them as data URIs.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::NaiveDate;

use crate::github::ContributionDay;

/// Fixed 7-color palette, cycled by segment index.
pub const PALETTE: [&str; 7] = [
    "#DBD4DC", "#C9D3C0", "#EFD9CC", "#D4E4F1", "#EBD8DC", "#D5D5D7", "#F6EBC8",
];

/// Number of categories the doughnut keeps; the rest are ignored, not merged.
pub const DOUGHNUT_TOP_N: usize = 5;

const CHART_WIDTH: f64 = 760.0;
const CHART_HEIGHT: f64 = 110.0;
const PADDING_LEFT: f64 = 10.0;
const PADDING_RIGHT: f64 = 10.0;
const PADDING_TOP: f64 = 8.0;
const PADDING_BOTTOM: f64 = 8.0;

const DOUGHNUT_RADIUS: f64 = 42.0;

/// A weekly aggregate of the daily series. Derived, rebuilt per render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyBucket {
    pub date: NaiveDate,
    pub count: u64,
}

/// Partition the daily series into consecutive groups of 7 starting from
/// index 0; the final group may be shorter. Bucket date is the first
/// member's date.
pub fn weekly_buckets(series: &[ContributionDay]) -> Vec<WeeklyBucket> {
    series
        .chunks(7)
        .map(|week| WeeklyBucket {
            date: week[0].date,
            count: week.iter().map(|d| d.count).sum(),
        })
        .collect()
}

/// The rendered activity chart plus the axis labels drawn beside it.
#[derive(Debug, Clone)]
pub struct ActivityChart {
    pub svg: String,
    pub max_count: u64,
    pub x_labels: Vec<String>,
}

impl ActivityChart {
    pub fn data_uri(&self) -> String {
        svg_data_uri(&self.svg)
    }

    /// Y-axis labels, top to bottom.
    pub fn y_labels(&self) -> [u64; 3] {
        [self.max_count, (self.max_count + 1) / 2, 0]
    }
}

/// Map weekly buckets to drawing points: x linear across the bucket index,
/// y inverse-proportional to `count / max(count, 1)`.
fn chart_points(weekly: &[WeeklyBucket]) -> Vec<(f64, f64)> {
    let graph_width = CHART_WIDTH - PADDING_LEFT - PADDING_RIGHT;
    let graph_height = CHART_HEIGHT - PADDING_TOP - PADDING_BOTTOM;
    let max_count = weekly.iter().map(|w| w.count).max().unwrap_or(0).max(1) as f64;
    let divisor = (weekly.len().saturating_sub(1)).max(1) as f64;

    weekly
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let x = PADDING_LEFT + (i as f64 / divisor) * graph_width;
            let y = PADDING_TOP + graph_height - (w.count as f64 / max_count) * graph_height;
            (x, y)
        })
        .collect()
}

/// Cubic Bezier path through the points with horizontal-midpoint control
/// points at each endpoint's own y. Smoothed and monotone in x, not a true
/// spline; the exact shape is a visual-parity target. A single point yields
/// a degenerate `M x y` path.
pub fn smooth_line_path(points: &[(f64, f64)]) -> String {
    let Some((first, rest)) = points.split_first() else {
        return String::new();
    };
    let mut d = format!("M {:.2} {:.2}", first.0, first.1);
    let mut prev = *first;
    for p in rest {
        let xc = (prev.0 + p.0) / 2.0;
        d.push_str(&format!(
            " C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}",
            xc, prev.1, xc, p.1, p.0, p.1
        ));
        prev = *p;
    }
    d
}

/// Build the activity chart SVG for a daily contribution series.
pub fn build_activity_chart(series: &[ContributionDay]) -> ActivityChart {
    let weekly = weekly_buckets(series);
    let graph_width = CHART_WIDTH - PADDING_LEFT - PADDING_RIGHT;
    let graph_height = CHART_HEIGHT - PADDING_TOP - PADDING_BOTTOM;
    let max_count = weekly.iter().map(|w| w.count).max().unwrap_or(0).max(1);

    let points = chart_points(&weekly);
    let line_d = smooth_line_path(&points);
    let area_d = if line_d.is_empty() {
        String::new()
    } else {
        format!(
            "{} L {:.2} {:.2} L {:.2} {:.2} Z",
            line_d,
            PADDING_LEFT + graph_width,
            PADDING_TOP + graph_height,
            PADDING_LEFT,
            PADDING_TOP + graph_height
        )
    };

    let mut grid = String::new();
    for ratio in [0.0, 0.5, 1.0] {
        let y = PADDING_TOP + graph_height - ratio * graph_height;
        grid.push_str(&format!(
            r##"<line x1="{:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="#f3f4f6" stroke-width="1"/>"##,
            PADDING_LEFT,
            PADDING_LEFT + graph_width,
        ));
    }

    let num_labels = 6;
    let x_labels = (0..num_labels)
        .map(|i| {
            if weekly.is_empty() {
                return String::new();
            }
            let index = i * (weekly.len() - 1) / (num_labels - 1).max(1);
            weekly[index].date.format("%b").to_string()
        })
        .collect();

    let mut body = String::new();
    if !area_d.is_empty() {
        body.push_str(&format!(r##"<path d="{area_d}" fill="url(#gradientArea)"/>"##));
    }
    if !line_d.is_empty() {
        body.push_str(&format!(
            r##"<path d="{line_d}" fill="none" stroke="#9ca3af" stroke-width="1.5" stroke-linecap="round" stroke-linejoin="round"/>"##
        ));
    }

    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w:.0} {h:.0}" width="{w:.0}" height="{h:.0}"><defs><linearGradient id="gradientArea" x1="0" y1="0" x2="0" y2="1"><stop offset="0%" stop-color="#9ca3af" stop-opacity="0.15"/><stop offset="100%" stop-color="#9ca3af" stop-opacity="0"/></linearGradient></defs>{grid}{body}</svg>"##,
        w = CHART_WIDTH,
        h = CHART_HEIGHT,
    );

    ActivityChart {
        svg,
        max_count,
        x_labels,
    }
}

/// One doughnut arc segment; `fraction` is relative to the top-5 subtotal.
#[derive(Debug, Clone, PartialEq)]
pub struct DoughnutSegment {
    pub name: String,
    pub count: u64,
    pub fraction: f64,
    pub color: &'static str,
}

/// Sort categories descending by count and keep the top 5 with their
/// fractions of the top-5 subtotal. Ties keep name order for determinism.
pub fn top_segments(counts: &BTreeMap<String, u64>) -> Vec<DoughnutSegment> {
    let mut entries: Vec<(&String, u64)> = counts.iter().map(|(k, v)| (k, *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(DOUGHNUT_TOP_N);

    let total: u64 = entries.iter().map(|(_, v)| v).sum();
    if total == 0 {
        return Vec::new();
    }
    entries
        .into_iter()
        .enumerate()
        .map(|(i, (name, count))| DoughnutSegment {
            name: name.clone(),
            count,
            fraction: count as f64 / total as f64,
            color: PALETTE[i % PALETTE.len()],
        })
        .collect()
}

/// The rendered doughnut plus the legend data behind it.
#[derive(Debug, Clone)]
pub struct DoughnutChart {
    pub svg: String,
    pub total: u64,
    pub segments: Vec<DoughnutSegment>,
}

impl DoughnutChart {
    pub fn data_uri(&self) -> String {
        svg_data_uri(&self.svg)
    }
}

/// Build the doughnut SVG via the stroke-dasharray technique: dash length is
/// `fraction * circumference`, dash offset the negative cumulative fraction.
/// Returns `None` when the top-5 subtotal is 0 (caller renders an
/// empty-state placeholder).
pub fn build_doughnut_chart(counts: &BTreeMap<String, u64>) -> Option<DoughnutChart> {
    let segments = top_segments(counts);
    if segments.is_empty() {
        return None;
    }
    let total = segments.iter().map(|s| s.count).sum();
    let circumference = 2.0 * std::f64::consts::PI * DOUGHNUT_RADIUS;

    let mut circles = String::new();
    let mut cumulative = 0.0;
    for segment in &segments {
        let dash = segment.fraction * circumference;
        let offset = -(cumulative * circumference);
        cumulative += segment.fraction;
        circles.push_str(&format!(
            r#"<circle cx="50" cy="50" r="{r:.0}" fill="transparent" stroke="{color}" stroke-width="6" stroke-dasharray="{dash:.3} {circ:.3}" stroke-dashoffset="{offset:.3}" stroke-linecap="round"/>"#,
            r = DOUGHNUT_RADIUS,
            color = segment.color,
            circ = circumference,
        ));
    }

    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100" width="144" height="144"><g transform="rotate(-90 50 50)"><circle cx="50" cy="50" r="{r:.0}" fill="transparent" stroke="#f3f4f6" stroke-width="6"/>{circles}</g></svg>"##,
        r = DOUGHNUT_RADIUS,
    );

    Some(DoughnutChart {
        svg,
        total,
        segments,
    })
}

fn svg_data_uri(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", BASE64.encode(svg))
}
