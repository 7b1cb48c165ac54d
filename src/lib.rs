//! Gitcard
//!
//! A GitHub profile infographic service: it fetches a user's profile,
//! repositories, and contribution activity, renders them as vector panels,
//! rasterizes the panels to PNG at retina scale, and serves the images over
//! HTTP with edge-cache-friendly headers.
//!
//! # Features
//!
//! - **Sectioned cards**: header, stats, activity, languages, and
//!   repositories panels, individually addressable as PNGs
//! - **Graceful degradation**: only the profile lookup is fatal; every other
//!   upstream fetch falls back to an empty or placeholder rendering
//! - **Deterministic output**: identical inputs produce byte-identical SVG
//!   documents, so edge caches stay coherent
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gitcard::github::GitHubClient;
//! use gitcard::server::{router, AppState};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let http = reqwest::Client::new();
//! let github = GitHubClient::new(http.clone(), None);
//! let app = router(Arc::new(AppState::new(github, http)));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod chart;
pub mod error;
pub mod fonts;
pub mod github;
pub mod rendering;
pub mod sections;
pub mod server;
pub mod text;

pub use error::{Error, Result};
