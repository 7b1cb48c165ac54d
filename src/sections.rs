//! Section builders: pure functions from a `RenderContext` to a layout tree,
//! one per named panel, plus the composite multi-panel render. Free text is
//! sanitized, counts formatted, labels truncated deterministically, and
//! empty lists degrade to explicit empty-state nodes.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use resvg::usvg::fontdb::Database;

use crate::chart::{build_activity_chart, build_doughnut_chart};
use crate::error::{Error, Result};
use crate::github::{RenderContext, Repo};
use crate::rendering::layout;
use crate::rendering::node::{Align, Justify, Node};
use crate::rendering::raster::{rasterize, RETINA_SCALE};
use crate::rendering::svg;
use crate::text::{format_compact, format_grouped, sanitize, truncate_label, wrap_text};

const LOWER_PANEL_HEIGHT: f32 = 309.0;
const REPO_LABEL_BUDGET: usize = 14;
const PANEL_GAP: f32 = 32.0;
const FOOTER_HEIGHT: f32 = 42.0;

const INK: &str = "#1f2937";
const INK_DARK: &str = "#111827";
const MUTED: &str = "#6b7280";
const FAINT: &str = "#9ca3af";
const HAIRLINE: &str = "#f3f4f6";

/// One named visual block renderable independently as its own image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Stats,
    Activity,
    Languages,
    Repositories,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Header,
        Section::Stats,
        Section::Activity,
        Section::Languages,
        Section::Repositories,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Section::Header => "header",
            Section::Stats => "stats",
            Section::Activity => "activity",
            Section::Languages => "languages",
            Section::Repositories => "repositories",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::Header => "Header",
            Section::Stats => "Stats",
            Section::Activity => "Contribution Activity",
            Section::Languages => "Language Distribution",
            Section::Repositories => "Most Starred Repositories",
        }
    }

    /// Nominal drawing width; the PNG comes out at 2x this.
    pub fn width(self) -> f32 {
        match self {
            Section::Header | Section::Stats | Section::Activity => 832.0,
            Section::Languages | Section::Repositories => 404.0,
        }
    }

    pub fn parse(id: &str) -> Option<Section> {
        Section::ALL.iter().copied().find(|s| s.id() == id)
    }
}

/// A rendered panel PNG with its pixel dimensions.
#[derive(Debug, Clone)]
pub struct RenderedPanel {
    pub id: String,
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// The shared white rounded panel container.
fn panel_box(children: Vec<Node>) -> Node {
    Node::column(children)
        .bg("#ffffff")
        .border(HAIRLINE)
        .radius(32.0)
        .padding(32.0)
}

fn spacer(height: f32) -> Node {
    Node::column(vec![]).height(height)
}

fn stat_text(value: Option<u64>) -> String {
    value.map(format_grouped).unwrap_or_else(|| "N/A".to_string())
}

fn build_header(ctx: &RenderContext) -> Node {
    let profile = &ctx.profile;
    let display_name = {
        let name = sanitize(profile.name.as_deref().unwrap_or(&profile.login));
        if name.is_empty() {
            "Unknown".to_string()
        } else {
            name
        }
    };
    let login = sanitize(&profile.login);
    let bio = sanitize(profile.bio.as_deref().unwrap_or(""));
    let company = sanitize(profile.company.as_deref().unwrap_or(""));
    let location = sanitize(profile.location.as_deref().unwrap_or(""));
    let twitter = sanitize(profile.twitter_username.as_deref().unwrap_or(""));

    let avatar = match &ctx.avatar_uri {
        Some(uri) => Node::image(uri, 96.0, 96.0).radius(48.0).border(HAIRLINE),
        // Placeholder disc when the avatar fetch degraded.
        None => Node::column(vec![]).width(96.0).height(96.0).radius(48.0).bg(HAIRLINE),
    };

    let mut identity = vec![
        Node::text(&display_name, 30.0, 500, INK_DARK).letter_spacing(-0.75),
        spacer(4.0),
    ];
    if !login.is_empty() {
        identity.push(Node::text(format!("@{login}"), 14.0, 300, FAINT));
    }
    if !bio.is_empty() {
        identity.push(spacer(12.0));
        identity.push(
            Node::text(wrap_text(&bio, 48).join("\n"), 14.0, 300, MUTED).line_height(1.6),
        );
    }

    let mut meta = Vec::new();
    if !company.is_empty() {
        meta.push(Node::text(&company, 12.0, 300, MUTED));
    }
    if !location.is_empty() {
        meta.push(Node::text(&location, 12.0, 300, MUTED));
    }
    if !twitter.is_empty() {
        meta.push(Node::text(format!("@{twitter}"), 12.0, 300, MUTED));
    }

    panel_box(vec![Node::row(vec![
        Node::row(vec![avatar, Node::column(identity)])
            .gap(24.0)
            .align(Align::Center),
        Node::column(vec![]).width(1.0).height_fill().bg(HAIRLINE),
        Node::column(meta).width(180.0).gap(10.0).justify(Justify::Center),
    ])
    .gap(24.0)])
}

fn build_stats(ctx: &RenderContext) -> Node {
    let cells = [
        ("Contributions", stat_text(ctx.stats.commits_last_year)),
        ("Total Stars", stat_text(Some(ctx.stats.total_stars))),
        ("Repositories", format_grouped(ctx.repos.len() as u64)),
        ("Followers", stat_text(Some(ctx.profile.followers))),
    ];

    let mut children = Vec::new();
    for (i, (label, value)) in cells.iter().enumerate() {
        if i > 0 {
            children.push(Node::column(vec![]).width(1.0).height_fill().bg(HAIRLINE));
        }
        children.push(
            Node::column(vec![
                Node::text(label.to_uppercase(), 11.0, 500, FAINT).letter_spacing(0.88),
                spacer(10.0),
                Node::text(value, 34.0, 300, INK).letter_spacing(-0.85),
            ])
            .padding(8.0),
        );
    }

    panel_box(vec![Node::row(children).gap(16.0)])
}

fn build_activity(ctx: &RenderContext) -> Node {
    let chart = build_activity_chart(&ctx.activity_series);

    let month_labels = chart
        .x_labels
        .iter()
        .map(|label| Node::text(label, 10.0, 400, FAINT))
        .collect();
    let y_labels = chart
        .y_labels()
        .iter()
        .map(|value| Node::text(value.to_string(), 10.0, 400, FAINT))
        .collect();

    panel_box(vec![
        Node::row(vec![
            Node::text("Contribution Activity", 14.0, 500, INK).letter_spacing(0.28),
            Node::text("LAST 365 DAYS", 10.0, 400, FAINT).letter_spacing(1.0),
        ])
        .justify(Justify::SpaceBetween)
        .align(Align::Center),
        spacer(12.0),
        Node::row(vec![
            Node::column(vec![
                Node::image(chart.data_uri(), 760.0, 110.0),
                spacer(6.0),
                Node::row(month_labels).justify(Justify::SpaceBetween),
            ])
            .width(760.0),
            Node::column(y_labels)
                .width(28.0)
                .height(110.0)
                .justify(Justify::SpaceBetween)
                .padding(2.0),
        ])
        .gap(8.0),
    ])
}

fn build_languages(ctx: &RenderContext) -> Node {
    let title = Node::text("Language Distribution", 14.0, 500, INK).letter_spacing(0.28);

    let content = match build_doughnut_chart(&ctx.stats.lang_counts) {
        None => Node::column(vec![
            Node::text("No language data available", 14.0, 400, FAINT).text_align(Align::Center),
        ])
        .height_fill()
        .justify(Justify::Center),
        Some(chart) => {
            let legend = chart
                .segments
                .iter()
                .map(|segment| {
                    let name = {
                        let n = sanitize(&segment.name);
                        if n.is_empty() {
                            "Unknown".to_string()
                        } else {
                            truncate_label(&n, 12)
                        }
                    };
                    let percent = (segment.fraction * 100.0).round() as u64;
                    Node::row(vec![
                        Node::row(vec![
                            Node::column(vec![])
                                .width(8.0)
                                .height(8.0)
                                .radius(4.0)
                                .bg(segment.color),
                            Node::text(name, 13.0, 400, "#4b5563"),
                        ])
                        .width_auto()
                        .gap(8.0)
                        .align(Align::Center),
                        Node::text(format!("{percent}%"), 13.0, 300, FAINT).text_align(Align::End),
                    ])
                    .justify(Justify::SpaceBetween)
                    .align(Align::Center)
                })
                .collect();

            Node::row(vec![
                Node::stack(vec![
                    Node::image(chart.data_uri(), 144.0, 144.0),
                    Node::column(vec![
                        Node::text(chart.total.to_string(), 24.0, 300, INK)
                            .text_align(Align::Center),
                        Node::text("REPOS", 10.0, 500, FAINT)
                            .letter_spacing(0.8)
                            .text_align(Align::Center),
                    ])
                    .width_auto()
                    .gap(2.0),
                ])
                .width(144.0)
                .height(144.0),
                Node::column(legend).width(160.0).gap(10.0),
            ])
            .width_auto()
            .gap(26.0)
            .align(Align::Center)
        }
    };

    panel_box(vec![
        title,
        spacer(24.0),
        Node::column(vec![content])
            .height_fill()
            .justify(Justify::Center)
            .align(Align::Center),
    ])
    .height(LOWER_PANEL_HEIGHT)
}

fn build_repositories(ctx: &RenderContext) -> Node {
    let title = Node::text("Most Starred Repositories", 16.0, 500, INK).letter_spacing(0.32);

    let mut top: Vec<&Repo> = ctx
        .repos
        .iter()
        .filter(|r| r.stargazers_count > 0)
        .collect();
    top.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
    top.truncate(5);

    if top.is_empty() {
        return panel_box(vec![
            title,
            Node::column(vec![
                Node::text("No starred repositories", 15.0, 400, FAINT).text_align(Align::Center),
            ])
            .height_fill()
            .justify(Justify::Center),
        ])
        .height(LOWER_PANEL_HEIGHT);
    }

    let max_stars = top.iter().map(|r| r.stargazers_count).max().unwrap_or(1);
    let max_log = {
        let l = (max_stars as f64).log10();
        if l == 0.0 {
            1.0
        } else {
            l
        }
    };

    let bars = top
        .iter()
        .map(|repo| {
            let log = (repo.stargazers_count.max(1) as f64).log10();
            let bar_height = ((log / max_log).max(0.25) * 170.0) as f32;
            let name = {
                let n = sanitize(&repo.name);
                if n.is_empty() {
                    "repo".to_string()
                } else {
                    n
                }
            };
            let label = truncate_label(&name, REPO_LABEL_BUDGET);

            Node::column(vec![
                Node::text(format_compact(repo.stargazers_count), 12.0, 500, MUTED)
                    .text_align(Align::Center),
                spacer(6.0),
                Node::stack(vec![Node::text(label, 10.0, 600, MUTED)
                    .text_align(Align::Center)
                    .rotated()])
                .width(40.0)
                .height(bar_height)
                .bg(HAIRLINE)
                .radius(10.0),
            ])
            .justify(Justify::End)
            .align(Align::Center)
            .height_fill()
        })
        .collect();

    panel_box(vec![
        title,
        spacer(16.0),
        Node::row(bars).gap(8.0).align(Align::End).height_fill(),
    ])
    .height(LOWER_PANEL_HEIGHT)
}

/// Build the layout tree for one section.
pub fn build_section(section: Section, ctx: &RenderContext) -> Node {
    match section {
        Section::Header => build_header(ctx),
        Section::Stats => build_stats(ctx),
        Section::Activity => build_activity(ctx),
        Section::Languages => build_languages(ctx),
        Section::Repositories => build_repositories(ctx),
    }
}

/// Deterministic vector document for one section; no fonts involved.
pub fn section_svg(section: Section, ctx: &RenderContext) -> String {
    let node = build_section(section, ctx);
    svg::document(&layout::compute(&node, section.width()))
}

/// Render one section to a PNG at retina scale.
pub fn render_section(
    section: Section,
    ctx: &RenderContext,
    fonts: Arc<Database>,
) -> Result<RenderedPanel> {
    let document = section_svg(section, ctx);
    let image = rasterize(&document, fonts, RETINA_SCALE)?;
    Ok(RenderedPanel {
        id: section.id().to_string(),
        label: section.label().to_string(),
        width: image.width,
        height: image.height,
        png: image.png,
    })
}

fn png_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64.encode(png))
}

/// Render the composite panels image: the four non-header panels rendered
/// concurrently, re-embedded as raster images in an outer tree with fixed
/// gaps, then rasterized once more at 1x (the panels are already 2x).
pub async fn render_panels(
    ctx: Arc<RenderContext>,
    fonts: Arc<Database>,
) -> Result<RenderedPanel> {
    let mut handles = Vec::new();
    for section in [
        Section::Stats,
        Section::Activity,
        Section::Languages,
        Section::Repositories,
    ] {
        let ctx = ctx.clone();
        let fonts = fonts.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            render_section(section, &ctx, fonts)
        }));
    }
    let mut panels = Vec::with_capacity(handles.len());
    for handle in handles {
        let panel = handle
            .await
            .map_err(|e| Error::Render(format!("panel render task failed: {e}")))??;
        panels.push(panel);
    }
    let [stats, activity, languages, repositories]: [RenderedPanel; 4] = panels
        .try_into()
        .map_err(|_| Error::Render("panel render produced wrong arity".to_string()))?;

    let lower_width = (languages.width + repositories.width) as f32 + PANEL_GAP;
    let width = lower_width.max(stats.width as f32).max(activity.width as f32);

    let embed =
        |panel: &RenderedPanel| Node::image(png_data_uri(&panel.png), panel.width as f32, panel.height as f32);

    let tree = Node::column(vec![
        Node::column(vec![
            embed(&stats),
            embed(&activity),
            Node::row(vec![embed(&languages), embed(&repositories)])
                .width_auto()
                .gap(PANEL_GAP)
                .align(Align::Center),
        ])
        .gap(PANEL_GAP)
        .align(Align::Center),
        Node::column(vec![Node::text("GITCARD INFOGRAPHIC", 18.0, 500, FAINT)
            .letter_spacing(2.16)
            .text_align(Align::Center)])
        .height(FOOTER_HEIGHT)
        .justify(Justify::Center),
    ])
    .align(Align::Center);

    let document = svg::document(&layout::compute(&tree, width));
    let image = rasterize(&document, fonts, 1.0)?;
    Ok(RenderedPanel {
        id: "panels".to_string(),
        label: "Panels".to_string(),
        width: image.width,
        height: image.height,
        png: image.png,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{build_daily_series, compute_stats, ContributionDay, Profile};
    use std::collections::HashMap;

    fn daily_series() -> Vec<ContributionDay> {
        let from = "2025-01-01".parse().unwrap();
        let to = "2025-12-31".parse().unwrap();
        build_daily_series(from, to, &HashMap::new())
    }

    fn fixture(repos: Vec<Repo>) -> RenderContext {
        let stats = compute_stats(&repos, Some(321), Some(12), None);
        RenderContext {
            profile: Profile {
                login: "octocat".to_string(),
                name: Some("The Octocat".to_string()),
                bio: Some("Building things.".to_string()),
                company: Some("@github".to_string()),
                location: Some("San Francisco".to_string()),
                twitter_username: None,
                avatar_url: None,
                followers: 4321,
            },
            repos,
            stats,
            avatar_uri: None,
            activity_series: daily_series(),
        }
    }

    fn repo(name: &str, stars: u64, language: &str) -> Repo {
        Repo {
            name: name.to_string(),
            stargazers_count: stars,
            forks_count: 0,
            language: Some(language.to_string()),
            fork: false,
        }
    }

    #[test]
    fn section_ids_round_trip() {
        for section in Section::ALL {
            assert_eq!(Section::parse(section.id()), Some(section));
        }
        assert_eq!(Section::parse("panels"), None);
        assert_eq!(Section::parse("bogus"), None);
    }

    #[test]
    fn zero_starred_repos_render_empty_state() {
        let ctx = fixture(vec![repo("quiet", 0, "Rust")]);
        let svg = section_svg(Section::Repositories, &ctx);
        assert!(svg.contains("No starred repositories"));
        assert!(!svg.contains("rotate(-90"));
    }

    #[test]
    fn starred_repos_render_labelled_bars() {
        let ctx = fixture(vec![
            repo("alpha", 1500, "Rust"),
            repo("beta", 20, "Go"),
            repo("an-unreasonably-long-name", 5, "C"),
        ]);
        let svg = section_svg(Section::Repositories, &ctx);
        assert!(svg.contains("1.5K"));
        assert!(svg.contains("rotate(-90"));
        assert!(svg.contains("an-unreasonab…"));
        assert!(!svg.contains("No starred repositories"));
    }

    #[test]
    fn empty_language_breakdown_renders_empty_state() {
        let ctx = fixture(vec![Repo {
            name: "n".to_string(),
            stargazers_count: 1,
            forks_count: 0,
            language: None,
            fork: false,
        }]);
        let svg = section_svg(Section::Languages, &ctx);
        assert!(svg.contains("No language data available"));
    }

    #[test]
    fn language_panel_shows_legend_percentages() {
        let ctx = fixture(vec![
            repo("a", 1, "Rust"),
            repo("b", 1, "Rust"),
            repo("c", 1, "Rust"),
            repo("d", 1, "Go"),
        ]);
        let svg = section_svg(Section::Languages, &ctx);
        assert!(svg.contains("75%"));
        assert!(svg.contains("25%"));
        assert!(svg.contains("Rust"));
    }

    #[test]
    fn header_sanitizes_profile_text() {
        let mut ctx = fixture(vec![]);
        ctx.profile.name = Some("Octo\u{1F419}\u{FE0F} Cat\u{0007}".to_string());
        let svg = section_svg(Section::Header, &ctx);
        assert!(svg.contains("Octo Cat"));
        assert!(!svg.contains('\u{1F419}'));
    }

    #[test]
    fn stats_panel_formats_counts() {
        let ctx = fixture(vec![repo("a", 4321, "Rust")]);
        let svg = section_svg(Section::Stats, &ctx);
        assert!(svg.contains("CONTRIBUTIONS"));
        assert!(svg.contains("321"));
        assert!(svg.contains("4,321"));
    }

    #[test]
    fn rendering_the_same_context_is_idempotent() {
        let ctx = fixture(vec![repo("a", 10, "Rust"), repo("b", 2, "Go")]);
        for section in Section::ALL {
            assert_eq!(section_svg(section, &ctx), section_svg(section, &ctx));
        }
    }
}
