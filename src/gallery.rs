// 🖼️ Gallery Loading
// Fetch every sheet concurrently, keep whatever succeeded, merge into one collection

use crate::card::{parse_sheet, Card, Category};
use crate::config::{SheetLocation, SheetSource};
use crate::merge::merge_sources;
use anyhow::{Context, Result};
use futures::future::join_all;
use serde::Serialize;
use std::future::Future;
use tracing::{debug, info, warn};

// ============================================================================
// PIPELINE
// ============================================================================

/// Run the whole pipeline over already-fetched sheet texts
///
/// Each sheet is parsed on its own (header resolved once per sheet), then all
/// sheets are merged in the order given.
pub fn ingest<'a, I>(sheets: I) -> Vec<Card>
where
    I: IntoIterator<Item = (Category, &'a str)>,
{
    merge_sources(
        sheets
            .into_iter()
            .map(|(category, text)| (category, parse_sheet(text))),
    )
}

// ============================================================================
// GALLERY
// ============================================================================

/// Collection-level state shown to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryStatus {
    /// Every source loaded
    Ready,
    /// Some sources failed, the rest are shown
    Partial,
    /// Nothing loaded: render the fallback state
    Unavailable,
}

/// A source that could not be fetched this cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: String,
    pub error: String,
}

/// Merged cards plus the outcome of each source fetch
#[derive(Debug, Clone, Default, Serialize)]
pub struct Gallery {
    pub cards: Vec<Card>,
    /// Names of sources that loaded, in configuration order
    pub loaded: Vec<String>,
    pub failures: Vec<SourceFailure>,
}

impl Gallery {
    pub fn status(&self) -> GalleryStatus {
        if self.loaded.is_empty() {
            GalleryStatus::Unavailable
        } else if !self.failures.is_empty() {
            GalleryStatus::Partial
        } else {
            GalleryStatus::Ready
        }
    }
}

// ============================================================================
// FETCHING
// ============================================================================

/// SheetFetcher - Gets the raw text of one sheet
///
/// The seam between the pipeline and the transport. Retries, auth and
/// caching belong to implementations, never to the pipeline.
pub trait SheetFetcher: Send + Sync {
    fn fetch(&self, source: &SheetSource) -> impl Future<Output = Result<String>> + Send;
}

/// Reads local paths with tokio and URLs with reqwest
#[derive(Debug, Clone, Default)]
pub struct DefaultFetcher {
    client: reqwest::Client,
}

impl DefaultFetcher {
    pub fn new() -> Self {
        DefaultFetcher {
            client: reqwest::Client::new(),
        }
    }
}

impl SheetFetcher for DefaultFetcher {
    async fn fetch(&self, source: &SheetSource) -> Result<String> {
        match &source.location {
            SheetLocation::Path(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read sheet file: {}", path.display())),
            SheetLocation::Url(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("Failed to request sheet: {}", url))?
                    .error_for_status()
                    .with_context(|| format!("Sheet request rejected: {}", url))?;

                response
                    .text()
                    .await
                    .with_context(|| format!("Failed to read sheet body: {}", url))
            }
        }
    }
}

/// Fetch all sources concurrently and merge the ones that succeeded
///
/// A failing source never aborts the others; it is only recorded in
/// [`Gallery::failures`]. With no successful source the result is
/// [`GalleryStatus::Unavailable`].
pub async fn load_gallery<F: SheetFetcher>(fetcher: &F, sources: &[SheetSource]) -> Gallery {
    let fetches = sources
        .iter()
        .map(|source| async move { (source, fetcher.fetch(source).await) });

    let mut gallery = Gallery::default();
    let mut sheets = Vec::new();

    for (source, result) in join_all(fetches).await {
        match result {
            Ok(text) => {
                let cards = parse_sheet(&text);
                debug!("Source '{}' produced {} cards", source.name, cards.len());
                gallery.loaded.push(source.name.clone());
                sheets.push((source.category, cards));
            }
            Err(e) => {
                warn!("Source '{}' failed: {:#}", source.name, e);
                gallery.failures.push(SourceFailure {
                    source: source.name.clone(),
                    error: format!("{:#}", e),
                });
            }
        }
    }

    gallery.cards = merge_sources(sheets);

    info!(
        "Gallery loaded: {} cards from {}/{} sources",
        gallery.cards.len(),
        gallery.loaded.len(),
        sources.len()
    );

    gallery
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::HashMap;
    use std::fs;

    /// Serves canned sheet texts by source name; unknown names fail
    struct StaticFetcher {
        sheets: HashMap<String, String>,
    }

    impl StaticFetcher {
        fn new(sheets: &[(&str, &str)]) -> Self {
            StaticFetcher {
                sheets: sheets
                    .iter()
                    .map(|(name, text)| (name.to_string(), text.to_string()))
                    .collect(),
            }
        }
    }

    impl SheetFetcher for StaticFetcher {
        async fn fetch(&self, source: &SheetSource) -> Result<String> {
            self.sheets
                .get(&source.name)
                .cloned()
                .ok_or_else(|| anyhow!("HTTP 403 for {}", source.name))
        }
    }

    fn sources() -> Vec<SheetSource> {
        vec![
            SheetSource::url("Mew", Category::Mew, "https://sheets.test/mew"),
            SheetSource::url("Cameos", Category::Cameo, "https://sheets.test/cameo"),
            SheetSource::url("Intl", Category::Intl, "https://sheets.test/intl"),
        ]
    }

    const MEW_SHEET: &str = "name en,set,year,ismew\nMew,Base,1999,false\nAncient Mew,Promo,2000,\n";
    const CAMEO_SHEET: &str = "name,set,year\nMew,Base,1999\n";

    #[test]
    fn test_ingest_runs_whole_pipeline() {
        let cards = ingest(vec![(Category::Mew, MEW_SHEET), (Category::Cameo, CAMEO_SHEET)]);

        assert_eq!(cards.len(), 3);
        assert!(cards[0].in_category(Category::Mew));
        assert!(cards[2].in_category(Category::Cameo));
        assert_ne!(cards[0].id, cards[2].id);
    }

    #[tokio::test]
    async fn test_all_sources_loaded() {
        let fetcher = StaticFetcher::new(&[
            ("Mew", MEW_SHEET),
            ("Cameos", CAMEO_SHEET),
            ("Intl", "name\nMew (Korean)\n"),
        ]);

        let gallery = load_gallery(&fetcher, &sources()).await;

        assert_eq!(gallery.status(), GalleryStatus::Ready);
        assert_eq!(gallery.cards.len(), 4);
        assert_eq!(gallery.loaded, vec!["Mew", "Cameos", "Intl"]);
        // Configuration order is merge order
        assert_eq!(gallery.cards[3].name_en, "Mew (Korean)");
    }

    #[tokio::test]
    async fn test_partial_failure_isolated() {
        let fetcher = StaticFetcher::new(&[("Mew", MEW_SHEET), ("Intl", "name\nMew (Korean)\n")]);

        let gallery = load_gallery(&fetcher, &sources()).await;

        assert_eq!(gallery.status(), GalleryStatus::Partial);
        assert_eq!(gallery.cards.len(), 3);
        assert_eq!(gallery.failures.len(), 1);
        assert_eq!(gallery.failures[0].source, "Cameos");
        assert!(gallery.failures[0].error.contains("403"));
    }

    #[tokio::test]
    async fn test_all_failed_is_unavailable() {
        let fetcher = StaticFetcher::new(&[]);

        let gallery = load_gallery(&fetcher, &sources()).await;

        assert_eq!(gallery.status(), GalleryStatus::Unavailable);
        assert!(gallery.cards.is_empty());
        assert_eq!(gallery.failures.len(), 3);
    }

    #[tokio::test]
    async fn test_no_sources_is_unavailable() {
        let gallery = load_gallery(&StaticFetcher::new(&[]), &[]).await;

        assert_eq!(gallery.status(), GalleryStatus::Unavailable);
    }

    #[tokio::test]
    async fn test_garbage_sheet_still_loads() {
        let fetcher = StaticFetcher::new(&[("Mew", "\"unterminated,\n\r,,,")]);

        let gallery = load_gallery(&fetcher, &sources()[..1]).await;

        assert_eq!(gallery.status(), GalleryStatus::Ready);
        assert!(gallery.cards.is_empty());
    }

    #[tokio::test]
    async fn test_default_fetcher_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mew.csv");
        fs::write(&path, MEW_SHEET).unwrap();

        let sources = vec![
            SheetSource::path("Mew", Category::Mew, &path),
            SheetSource::path("Missing", Category::Intl, dir.path().join("missing.csv")),
        ];

        let gallery = load_gallery(&DefaultFetcher::new(), &sources).await;

        assert_eq!(gallery.status(), GalleryStatus::Partial);
        assert_eq!(gallery.cards.len(), 2);
        assert_eq!(gallery.failures[0].source, "Missing");
        assert!(gallery.failures[0].error.contains("missing.csv"));
    }

    #[tokio::test]
    async fn test_default_fetcher_unreachable_url() {
        let source = SheetSource::url("Down", Category::Mew, "http://127.0.0.1:9/sheet.csv");

        let result = DefaultFetcher::new().fetch(&source).await;

        assert!(result.is_err());
    }
}
