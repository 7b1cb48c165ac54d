use std::collections::HashMap;

use gitcard::github::{
    build_daily_series, compute_stats, ContributionDay, Profile, RenderContext, Repo,
};
use gitcard::sections::{section_svg, Section};
use sha2::{Digest, Sha256};

fn digest(svg: &str) -> String {
    hex::encode(Sha256::digest(svg.as_bytes()))
}

fn daily_series(counts: &HashMap<chrono::NaiveDate, u64>) -> Vec<ContributionDay> {
    build_daily_series(
        "2025-01-01".parse().expect("date"),
        "2025-12-31".parse().expect("date"),
        counts,
    )
}

fn repo(name: &str, stars: u64, language: Option<&str>) -> Repo {
    Repo {
        name: name.to_string(),
        stargazers_count: stars,
        forks_count: stars / 10,
        language: language.map(str::to_string),
        fork: false,
    }
}

fn context(repos: Vec<Repo>) -> RenderContext {
    let mut counts = HashMap::new();
    counts.insert("2025-04-01".parse().expect("date"), 6);
    counts.insert("2025-09-20".parse().expect("date"), 2);
    let stats = compute_stats(&repos, Some(874), Some(31), Some(9));
    RenderContext {
        profile: Profile {
            login: "octocat".to_string(),
            name: Some("The Octocat".to_string()),
            bio: Some("Likes building small sharp tools for other builders.".to_string()),
            company: Some("@github".to_string()),
            location: Some("San Francisco".to_string()),
            twitter_username: Some("octo".to_string()),
            avatar_url: None,
            followers: 12_345,
        },
        repos,
        stats,
        avatar_uri: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
        activity_series: daily_series(&counts),
    }
}

#[test]
fn identical_contexts_render_byte_identical_documents() {
    let repos = vec![
        repo("alpha", 900, Some("Rust")),
        repo("beta", 120, Some("Go")),
        repo("gamma", 7, Some("Rust")),
    ];
    let a = context(repos.clone());
    let b = context(repos);
    for section in Section::ALL {
        assert_eq!(
            digest(&section_svg(section, &a)),
            digest(&section_svg(section, &b)),
            "section {} must be deterministic",
            section.id()
        );
    }
}

#[test]
fn documents_declare_their_nominal_width() {
    let ctx = context(vec![repo("alpha", 10, Some("Rust"))]);
    for section in Section::ALL {
        let svg = section_svg(section, &ctx);
        let expected = format!("width=\"{}\"", section.width() as u32);
        assert!(
            svg.contains(&expected),
            "section {} missing {expected}",
            section.id()
        );
    }
}

#[test]
fn lower_panels_have_fixed_height() {
    let ctx = context(vec![repo("alpha", 10, Some("Rust"))]);
    for section in [Section::Languages, Section::Repositories] {
        let svg = section_svg(section, &ctx);
        assert!(svg.contains("height=\"309\""), "section {}", section.id());
    }
}

#[test]
fn degraded_context_renders_every_section() {
    // No avatar, no repos, zero activity: everything still renders.
    let mut ctx = context(vec![]);
    ctx.avatar_uri = None;
    ctx.activity_series = daily_series(&HashMap::new());
    ctx.stats = compute_stats(&[], None, None, None);

    for section in Section::ALL {
        let svg = section_svg(section, &ctx);
        assert!(svg.starts_with("<svg"), "section {}", section.id());
        assert!(svg.ends_with("</svg>"), "section {}", section.id());
    }
    assert!(section_svg(Section::Stats, &ctx).contains("N/A"));
    assert!(section_svg(Section::Languages, &ctx).contains("No language data available"));
    assert!(section_svg(Section::Repositories, &ctx).contains("No starred repositories"));
}

#[test]
fn header_embeds_the_avatar_uri() {
    let ctx = context(vec![]);
    let svg = section_svg(Section::Header, &ctx);
    assert!(svg.contains("data:image/png;base64,iVBORw0KGgo="));
    assert!(svg.contains("The Octocat"));
    assert!(svg.contains("@octocat"));
}

#[test]
fn activity_section_embeds_the_chart_as_a_data_uri() {
    let ctx = context(vec![]);
    let svg = section_svg(Section::Activity, &ctx);
    assert!(svg.contains("data:image/svg+xml;base64,"));
    assert!(svg.contains("LAST 365 DAYS"));
}
