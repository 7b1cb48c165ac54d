//! GitHub data fetcher.
//!
//! One fatal fetch (the profile lookup) plus a set of best-effort sub-fetches
//! that degrade to fallback values instead of failing the request: the
//! repository list, the three yearly search counts, the contribution
//! calendar and the avatar. Each sub-fetch returns a [`Fetched`] so the
//! degraded reason stays observable for logging and tests.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

use crate::error::{Error, Result};

/// Fixed User-Agent sent on every outbound request.
pub const USER_AGENT: &str = "gitcard-image-generator";

const API_ROOT: &str = "https://api.github.com";

/// Length of the trailing contribution window in days.
pub const ACTIVITY_WINDOW_DAYS: u64 = 365;

/// Outcome of a best-effort sub-fetch: either the real value or a fallback
/// with the reason it degraded.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Ok(T),
    Degraded { fallback: T, reason: String },
}

impl<T> Fetched<T> {
    pub fn degraded(fallback: T, reason: impl Into<String>) -> Self {
        Fetched::Degraded {
            fallback,
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Fetched::Degraded { .. })
    }

    /// Unwrap to the usable value, logging the degraded reason if any.
    pub fn logged(self, what: &str) -> T {
        match self {
            Fetched::Ok(v) => v,
            Fetched::Degraded { fallback, reason } => {
                tracing::warn!("{what} degraded: {reason}");
                fallback
            }
        }
    }
}

/// Public profile fields used by the card.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub followers: u64,
}

/// Repository fields used by the card (GitHub REST names preserved).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Repo {
    pub name: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub fork: bool,
}

fn serialize_count<S: Serializer>(v: &Option<u64>, s: S) -> std::result::Result<S::Ok, S::Error> {
    match v {
        Some(n) => s.serialize_u64(*n),
        None => s.serialize_str("N/A"),
    }
}

/// Aggregate statistics; the three yearly counts carry the `"N/A"` sentinel
/// when their search query degraded.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_stars: u64,
    pub total_forks: u64,
    pub lang_counts: std::collections::BTreeMap<String, u64>,
    #[serde(serialize_with = "serialize_count")]
    pub commits_last_year: Option<u64>,
    #[serde(serialize_with = "serialize_count")]
    pub prs_last_year: Option<u64>,
    #[serde(serialize_with = "serialize_count")]
    pub issues_last_year: Option<u64>,
}

/// One day of the gap-free contribution series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub count: u64,
}

/// Everything fetched for one card request, before the avatar is inlined.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardData {
    pub profile: Profile,
    pub repos: Vec<Repo>,
    pub stats: Stats,
    pub activity_series: Vec<ContributionDay>,
}

/// Request-scoped bundle consumed by the section builders. Constructed fresh
/// per request, discarded after the response.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub profile: Profile,
    pub repos: Vec<Repo>,
    pub stats: Stats,
    pub avatar_uri: Option<String>,
    pub activity_series: Vec<ContributionDay>,
}

/// Build a complete daily series for `[from, to]` inclusive, zero-filling
/// days missing from `counts`. One entry per calendar day, ascending.
pub fn build_daily_series(
    from: NaiveDate,
    to: NaiveDate,
    counts: &HashMap<NaiveDate, u64>,
) -> Vec<ContributionDay> {
    let mut series = Vec::new();
    let mut cursor = from;
    while cursor <= to {
        series.push(ContributionDay {
            date: cursor,
            count: counts.get(&cursor).copied().unwrap_or(0),
        });
        match cursor.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }
    series
}

/// The trailing activity window ending today (UTC).
pub fn activity_window() -> (NaiveDate, NaiveDate) {
    let to = Utc::now().date_naive();
    let from = to - Days::new(ACTIVITY_WINDOW_DAYS - 1);
    (from, to)
}

/// Thin GitHub API client with a fixed User-Agent and optional bearer token.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(http: reqwest::Client, token: Option<String>) -> Self {
        let token = token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        Self { http, token }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Fatal fetch: 404 maps to `UserNotFound`, any other non-OK status to
    /// `Upstream`.
    pub async fn fetch_profile(&self, username: &str) -> Result<Profile> {
        let url = format!("{API_ROOT}/users/{username}");
        let res = self.get(&url).send().await?;
        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::UserNotFound(username.to_string()));
        }
        if !res.status().is_success() {
            return Err(Error::Upstream(format!(
                "profile lookup returned {}",
                res.status()
            )));
        }
        res.json::<Profile>()
            .await
            .map_err(|e| Error::Upstream(format!("malformed profile payload: {e}")))
    }

    /// Repository list; degrades to an empty list.
    pub async fn fetch_repos(&self, username: &str) -> Fetched<Vec<Repo>> {
        let url = format!("{API_ROOT}/users/{username}/repos?per_page=100&sort=pushed");
        match self.get(&url).send().await {
            Ok(res) if res.status().is_success() => match res.json::<Vec<Repo>>().await {
                Ok(repos) => Fetched::Ok(repos),
                Err(e) => Fetched::degraded(Vec::new(), format!("malformed repo payload: {e}")),
            },
            Ok(res) => Fetched::degraded(Vec::new(), format!("repo list returned {}", res.status())),
            Err(e) => Fetched::degraded(Vec::new(), format!("repo list request failed: {e}")),
        }
    }

    async fn search_count(&self, url: &str, query: &str) -> Fetched<Option<u64>> {
        match self.get(url).query(&[("q", query)]).send().await {
            Ok(res) if res.status().is_success() => match res.json::<Value>().await {
                Ok(v) => match v.get("total_count").and_then(Value::as_u64) {
                    Some(n) => Fetched::Ok(Some(n)),
                    None => Fetched::degraded(None, "search payload missing total_count"),
                },
                Err(e) => Fetched::degraded(None, format!("malformed search payload: {e}")),
            },
            Ok(res) => Fetched::degraded(None, format!("search returned {}", res.status())),
            Err(e) => Fetched::degraded(None, format!("search request failed: {e}")),
        }
    }

    /// The three yearly search counts, issued concurrently and awaited
    /// together. Each degrades independently to `None` ("N/A").
    pub async fn fetch_yearly_counts(
        &self,
        username: &str,
        since: NaiveDate,
    ) -> (Fetched<Option<u64>>, Fetched<Option<u64>>, Fetched<Option<u64>>) {
        let (commits_q, prs_q, issues_q) = search_queries(username, since);
        let commits_url = format!("{API_ROOT}/search/commits");
        let issues_url = format!("{API_ROOT}/search/issues");
        tokio::join!(
            self.search_count(&commits_url, &commits_q),
            self.search_count(&issues_url, &prs_q),
            self.search_count(&issues_url, &issues_q),
        )
    }

    /// Daily contribution series over `[from, to]` via the GraphQL
    /// contribution calendar. Degrades to a zero-filled series when there is
    /// no token or the query fails.
    pub async fn fetch_contribution_series(
        &self,
        username: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Fetched<Vec<ContributionDay>> {
        let fallback = build_daily_series(from, to, &HashMap::new());
        if self.token.is_none() {
            return Fetched::degraded(fallback, "no token; contribution calendar unavailable");
        }

        let query = "query($login: String!, $from: DateTime!, $to: DateTime!) {\
            user(login: $login) {\
              contributionsCollection(from: $from, to: $to) {\
                contributionCalendar { weeks { contributionDays { date contributionCount } } }\
              }\
            }\
          }";
        let body = json!({
            "query": query,
            "variables": {
                "login": username,
                "from": format!("{from}T00:00:00Z"),
                "to": format!("{to}T23:59:59Z"),
            },
        });

        let res = match self
            .get(&format!("{API_ROOT}/graphql"))
            .json(&body)
            .send()
            .await
        {
            Ok(res) if res.status().is_success() => res,
            Ok(res) => {
                return Fetched::degraded(fallback, format!("graphql returned {}", res.status()))
            }
            Err(e) => return Fetched::degraded(fallback, format!("graphql request failed: {e}")),
        };

        let payload: Value = match res.json().await {
            Ok(v) => v,
            Err(e) => {
                return Fetched::degraded(fallback, format!("malformed graphql payload: {e}"))
            }
        };
        if let Some(errors) = payload.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                let msg = errors[0]
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("contribution query failed");
                return Fetched::degraded(fallback, format!("graphql error: {msg}"));
            }
        }

        let mut counts = HashMap::new();
        let weeks = payload
            .pointer("/data/user/contributionsCollection/contributionCalendar/weeks")
            .and_then(Value::as_array);
        if let Some(weeks) = weeks {
            for week in weeks {
                let days = week
                    .get("contributionDays")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                for day in days {
                    let date = day
                        .get("date")
                        .and_then(Value::as_str)
                        .and_then(|d| d.parse::<NaiveDate>().ok());
                    if let Some(date) = date {
                        if date < from || date > to {
                            continue;
                        }
                        let count = day
                            .get("contributionCount")
                            .and_then(Value::as_u64)
                            .unwrap_or(0);
                        counts.insert(date, count);
                    }
                }
            }
        }

        Fetched::Ok(build_daily_series(from, to, &counts))
    }

    /// Avatar bytes inlined as a data URI; degrades to `None` and the header
    /// section draws a placeholder disc instead.
    pub async fn fetch_avatar(&self, url: Option<&str>) -> Fetched<Option<String>> {
        let Some(url) = url else {
            return Fetched::degraded(None, "profile has no avatar_url");
        };
        match self.http.get(url).header("User-Agent", USER_AGENT).send().await {
            Ok(res) if res.status().is_success() => {
                let content_type = res
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("image/png")
                    .to_string();
                match res.bytes().await {
                    Ok(bytes) => Fetched::Ok(Some(format!(
                        "data:{};base64,{}",
                        content_type,
                        BASE64.encode(&bytes)
                    ))),
                    Err(e) => Fetched::degraded(None, format!("avatar body read failed: {e}")),
                }
            }
            Ok(res) => Fetched::degraded(None, format!("avatar fetch returned {}", res.status())),
            Err(e) => Fetched::degraded(None, format!("avatar fetch failed: {e}")),
        }
    }
}

/// Compute the aggregate stats for a repo list plus the yearly counts.
pub fn compute_stats(
    repos: &[Repo],
    commits: Option<u64>,
    prs: Option<u64>,
    issues: Option<u64>,
) -> Stats {
    let mut lang_counts = std::collections::BTreeMap::new();
    for repo in repos {
        if repo.fork {
            continue;
        }
        if let Some(language) = &repo.language {
            *lang_counts.entry(language.clone()).or_insert(0) += 1;
        }
    }
    Stats {
        total_stars: repos.iter().map(|r| r.stargazers_count).sum(),
        total_forks: repos.iter().map(|r| r.forks_count).sum(),
        lang_counts,
        commits_last_year: commits,
        prs_last_year: prs,
        issues_last_year: issues,
    }
}

/// Fetch everything the JSON manifest needs. Only the profile lookup is
/// fatal; every other sub-fetch degrades to its fallback.
pub async fn fetch_card_data(client: &GitHubClient, username: &str) -> Result<CardData> {
    let profile = client.fetch_profile(username).await?;
    let repos = client.fetch_repos(username).await.logged("repo list");

    let (from, to) = activity_window();
    let (commits, prs, issues) = client.fetch_yearly_counts(username, from).await;
    let activity_series = client
        .fetch_contribution_series(username, from, to)
        .await
        .logged("contribution calendar");

    let stats = compute_stats(
        &repos,
        commits.logged("commit count"),
        prs.logged("pr count"),
        issues.logged("issue count"),
    );

    Ok(CardData {
        profile,
        repos,
        stats,
        activity_series,
    })
}

/// Fetch card data and inline the avatar for image rendering.
pub async fn create_render_context(
    client: &GitHubClient,
    username: &str,
) -> Result<RenderContext> {
    let data = fetch_card_data(client, username).await?;
    let avatar_uri = client
        .fetch_avatar(data.profile.avatar_url.as_deref())
        .await
        .logged("avatar");
    Ok(RenderContext {
        profile: data.profile,
        repos: data.repos,
        stats: data.stats,
        avatar_uri,
        activity_series: data.activity_series,
    })
}

/// The three yearly search queries; escaping is left to the request builder.
fn search_queries(username: &str, since: NaiveDate) -> (String, String, String) {
    (
        format!("author:{username} committer-date:>{since}"),
        format!("author:{username} type:pr created:>{since}"),
        format!("author:{username} type:issue created:>{since}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn daily_series_is_gap_free_and_inclusive() {
        let from = date("2025-01-01");
        let to = date("2025-12-31");
        let series = build_daily_series(from, to, &HashMap::new());
        assert_eq!(series.len(), 365);
        assert_eq!(series.first().unwrap().date, from);
        assert_eq!(series.last().unwrap().date, to);
        for pair in series.windows(2) {
            assert_eq!(pair[0].date.succ_opt().unwrap(), pair[1].date);
        }
    }

    #[test]
    fn daily_series_zero_fills_missing_days() {
        let from = date("2025-03-01");
        let to = date("2025-03-05");
        let mut counts = HashMap::new();
        counts.insert(date("2025-03-02"), 4);
        counts.insert(date("2025-03-05"), 7);
        let series = build_daily_series(from, to, &counts);
        let observed: Vec<u64> = series.iter().map(|d| d.count).collect();
        assert_eq!(observed, vec![0, 4, 0, 0, 7]);
    }

    #[test]
    fn stats_skip_forks_and_sum_totals() {
        let repos = vec![
            Repo {
                name: "a".into(),
                stargazers_count: 10,
                forks_count: 2,
                language: Some("Rust".into()),
                fork: false,
            },
            Repo {
                name: "b".into(),
                stargazers_count: 5,
                forks_count: 1,
                language: Some("Rust".into()),
                fork: true,
            },
            Repo {
                name: "c".into(),
                stargazers_count: 1,
                forks_count: 0,
                language: Some("Go".into()),
                fork: false,
            },
        ];
        let stats = compute_stats(&repos, Some(3), None, Some(1));
        assert_eq!(stats.total_stars, 16);
        assert_eq!(stats.total_forks, 3);
        assert_eq!(stats.lang_counts.get("Rust"), Some(&1));
        assert_eq!(stats.lang_counts.get("Go"), Some(&1));
    }

    #[test]
    fn na_sentinel_serializes_as_string() {
        let stats = compute_stats(&[], None, Some(12), None);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["commitsLastYear"], serde_json::json!("N/A"));
        assert_eq!(json["prsLastYear"], serde_json::json!(12));
    }

    #[test]
    fn degraded_fetch_keeps_reason() {
        let f: Fetched<Vec<Repo>> = Fetched::degraded(Vec::new(), "rate limited");
        assert!(f.is_degraded());
        assert!(f.logged("repos").is_empty());
    }

    #[test]
    fn search_queries_scope_to_author_and_window() {
        let (commits, prs, issues) = search_queries("octocat", date("2025-01-01"));
        assert_eq!(commits, "author:octocat committer-date:>2025-01-01");
        assert_eq!(prs, "author:octocat type:pr created:>2025-01-01");
        assert_eq!(issues, "author:octocat type:issue created:>2025-01-01");
    }

    #[test]
    fn activity_window_spans_365_days() {
        let (from, to) = activity_window();
        assert_eq!(to - from, chrono::TimeDelta::days(364));
    }
}
