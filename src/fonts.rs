//! Font provisioning: a process-wide, lazily-initialized font set fetched
//! once from remote sources and shared by every render for the process
//! lifetime. Concurrent first-call requests share one in-flight load via
//! `tokio::sync::OnceCell`. Individual font failures are logged and skipped;
//! a missing required base family is fatal to any render attempt.

use std::sync::Arc;

use resvg::usvg::fontdb::{Database, Language, Weight};
use tokio::sync::OnceCell;

use crate::error::{Error, Result};
use crate::github::USER_AGENT;

/// The family every render requires; provisioning fails without its regular
/// weight, so a partial download cannot slip through.
pub const REQUIRED_FAMILY: &str = "Inter";
const REQUIRED_WEIGHT: Weight = Weight::NORMAL;

/// When set, fonts are loaded from this directory instead of the network
/// (offline deployments and tests).
pub const FONT_DIR_ENV: &str = "GITCARD_FONT_DIR";

/// One remote font asset. fontdb parses TTF/OTF only, so the sources point
/// at the upstream TrueType/OpenType builds.
pub struct FontSource {
    pub family: &'static str,
    pub weight: u16,
    pub url: &'static str,
}

pub const FONT_SOURCES: &[FontSource] = &[
    FontSource {
        family: "Inter",
        weight: 300,
        url: "https://raw.githubusercontent.com/rsms/inter/master/docs/font-files/Inter-Light.otf",
    },
    FontSource {
        family: "Inter",
        weight: 400,
        url: "https://raw.githubusercontent.com/rsms/inter/master/docs/font-files/Inter-Regular.otf",
    },
    FontSource {
        family: "Inter",
        weight: 500,
        url: "https://raw.githubusercontent.com/rsms/inter/master/docs/font-files/Inter-Medium.otf",
    },
    FontSource {
        family: "Inter",
        weight: 600,
        url: "https://raw.githubusercontent.com/rsms/inter/master/docs/font-files/Inter-SemiBold.otf",
    },
    FontSource {
        family: "Noto Sans",
        weight: 400,
        url: "https://github.com/notofonts/noto-fonts/raw/main/hinted/ttf/NotoSans/NotoSans-Regular.ttf",
    },
    FontSource {
        family: "Noto Sans",
        weight: 500,
        url: "https://github.com/notofonts/noto-fonts/raw/main/hinted/ttf/NotoSans/NotoSans-Medium.ttf",
    },
    FontSource {
        family: "Noto Sans",
        weight: 600,
        url: "https://github.com/notofonts/noto-fonts/raw/main/hinted/ttf/NotoSans/NotoSans-SemiBold.ttf",
    },
];

static FONT_DB: OnceCell<Arc<Database>> = OnceCell::const_new();

/// Return the shared font set, loading it on first use. Callers arriving
/// while the first load is in flight await the same future; a failed load is
/// not cached and the next request retries.
pub async fn provision(client: &reqwest::Client) -> Result<Arc<Database>> {
    FONT_DB
        .get_or_try_init(|| load(client))
        .await
        .cloned()
}

fn is_required_face(families: &[(String, Language)], weight: Weight) -> bool {
    weight == REQUIRED_WEIGHT && families.iter().any(|(name, _)| name == REQUIRED_FAMILY)
}

/// Verify the required base family is present at its regular weight.
pub fn ensure_base_family(db: &Database) -> Result<()> {
    let present = db
        .faces()
        .any(|face| is_required_face(&face.families, face.weight));
    if present {
        Ok(())
    } else {
        Err(Error::FontProvisioning(format!(
            "required base font '{REQUIRED_FAMILY}' (weight 400) is unavailable"
        )))
    }
}

async fn load(client: &reqwest::Client) -> Result<Arc<Database>> {
    let mut db = Database::new();

    if let Ok(dir) = std::env::var(FONT_DIR_ENV) {
        db.load_fonts_dir(&dir);
        tracing::info!("loaded {} font faces from {dir}", db.len());
    } else {
        let fetches = FONT_SOURCES.iter().map(|source| fetch_font(client, source));
        let results = futures::future::join_all(fetches).await;
        for (source, result) in FONT_SOURCES.iter().zip(results) {
            match result {
                Ok(bytes) => db.load_font_data(bytes),
                Err(e) => tracing::warn!(
                    "font load failed for {} ({}) from {}: {e}",
                    source.family,
                    source.weight,
                    source.url
                ),
            }
        }
        tracing::info!("loaded {} font faces from remote sources", db.len());
    }

    ensure_base_family(&db)?;
    Ok(Arc::new(db))
}

async fn fetch_font(client: &reqwest::Client, source: &FontSource) -> Result<Vec<u8>> {
    let res = client
        .get(source.url)
        .header("User-Agent", USER_AGENT)
        .send()
        .await?;
    if !res.status().is_success() {
        return Err(Error::Network(format!("HTTP {}", res.status())));
    }
    Ok(res.bytes().await?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_database_is_rejected() {
        let db = Database::new();
        assert!(matches!(
            ensure_base_family(&db),
            Err(Error::FontProvisioning(_))
        ));
    }

    #[test]
    fn required_family_is_in_the_source_list() {
        assert!(FONT_SOURCES
            .iter()
            .any(|s| s.family == REQUIRED_FAMILY && s.weight == 400));
    }

    #[test]
    fn required_face_rejects_wrong_family_or_weight() {
        let inter = vec![("Inter".to_string(), Language::English_UnitedStates)];
        let noto = vec![("Noto Sans".to_string(), Language::English_UnitedStates)];
        assert!(is_required_face(&inter, Weight::NORMAL));
        assert!(!is_required_face(&inter, Weight::LIGHT));
        assert!(!is_required_face(&inter, Weight::MEDIUM));
        assert!(!is_required_face(&noto, Weight::NORMAL));
    }
}
