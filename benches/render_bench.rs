use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gitcard::chart::{build_activity_chart, build_doughnut_chart};
use gitcard::github::{build_daily_series, compute_stats, Profile, RenderContext, Repo};
use gitcard::sections::{section_svg, Section};

fn fixture() -> RenderContext {
    let repos: Vec<Repo> = (0..30)
        .map(|i| Repo {
            name: format!("repo-{i}"),
            stargazers_count: (i * 37 + 1) as u64,
            forks_count: i as u64,
            language: Some(["Rust", "Go", "C", "Lua"][i % 4].to_string()),
            fork: i % 7 == 0,
        })
        .collect();

    let mut counts = HashMap::new();
    let from: chrono::NaiveDate = "2025-01-01".parse().unwrap();
    for i in 0..365 {
        counts.insert(from + chrono::Days::new(i), (i % 9) as u64);
    }

    let stats = compute_stats(&repos, Some(1234), Some(56), Some(7));
    RenderContext {
        profile: Profile {
            login: "octocat".to_string(),
            name: Some("The Octocat".to_string()),
            bio: Some("Bench fixture profile with a realistic bio length.".to_string()),
            company: Some("@github".to_string()),
            location: Some("San Francisco".to_string()),
            twitter_username: None,
            avatar_url: None,
            followers: 12_345,
        },
        repos,
        stats,
        avatar_uri: None,
        activity_series: build_daily_series(from, "2025-12-31".parse().unwrap(), &counts),
    }
}

fn bench_activity_chart(c: &mut Criterion) {
    let ctx = fixture();
    c.bench_function("build_activity_chart", |b| {
        b.iter(|| black_box(build_activity_chart(&ctx.activity_series)))
    });
}

fn bench_doughnut_chart(c: &mut Criterion) {
    let ctx = fixture();
    c.bench_function("build_doughnut_chart", |b| {
        b.iter(|| black_box(build_doughnut_chart(&ctx.stats.lang_counts)))
    });
}

fn bench_section_documents(c: &mut Criterion) {
    let ctx = fixture();
    for section in Section::ALL {
        c.bench_function(&format!("section_svg_{}", section.id()), |b| {
            b.iter(|| black_box(section_svg(section, &ctx)))
        });
    }
}

criterion_group!(
    benches,
    bench_activity_chart,
    bench_doughnut_chart,
    bench_section_documents
);
criterion_main!(benches);
