// ⚙️ Configuration
// gallery.toml → sheet sources + server settings

use crate::card::Category;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "GALLERY_CONFIG";

/// Config file used when [`CONFIG_ENV`] is unset
pub const DEFAULT_CONFIG_PATH: &str = "gallery.toml";

/// Where a sheet's text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetLocation {
    Url(String),
    Path(PathBuf),
}

/// One configured sheet (tab) and the category its rows belong to
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSheetSource")]
pub struct SheetSource {
    pub name: String,
    pub category: Category,
    pub location: SheetLocation,
}

impl SheetSource {
    pub fn url(name: impl Into<String>, category: Category, url: impl Into<String>) -> Self {
        SheetSource {
            name: name.into(),
            category,
            location: SheetLocation::Url(url.into()),
        }
    }

    pub fn path(name: impl Into<String>, category: Category, path: impl Into<PathBuf>) -> Self {
        SheetSource {
            name: name.into(),
            category,
            location: SheetLocation::Path(path.into()),
        }
    }
}

/// File shape of a source: exactly one of `url` / `path`
#[derive(Debug, Deserialize)]
struct RawSheetSource {
    name: String,
    category: Category,
    url: Option<String>,
    path: Option<PathBuf>,
}

impl TryFrom<RawSheetSource> for SheetSource {
    type Error = anyhow::Error;

    fn try_from(raw: RawSheetSource) -> Result<Self> {
        let location = match (raw.url, raw.path) {
            (Some(url), None) => SheetLocation::Url(url),
            (None, Some(path)) => SheetLocation::Path(path),
            (Some(_), Some(_)) => bail!("Source '{}' sets both url and path", raw.name),
            (None, None) => bail!("Source '{}' needs a url or a path", raw.name),
        };

        Ok(SheetSource {
            name: raw.name,
            category: raw.category,
            location,
        })
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { bind: default_bind() }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

/// Whole gallery configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GalleryConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub sources: Vec<SheetSource>,
}

impl GalleryConfig {
    /// Config path from the environment, else [`DEFAULT_CONFIG_PATH`]
    pub fn path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Invalid config: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: GalleryConfig = toml::from_str(contents)?;
        Ok(config)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_full_config() {
        let config = GalleryConfig::from_toml(
            r#"
            [server]
            bind = "127.0.0.1:8080"

            [[sources]]
            name = "Mew"
            category = "mew"
            url = "https://example.com/sheet.csv"

            [[sources]]
            name = "Cameos"
            category = "cameo"
            path = "data/cameos.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(
            config.sources,
            vec![
                SheetSource::url("Mew", Category::Mew, "https://example.com/sheet.csv"),
                SheetSource::path("Cameos", Category::Cameo, "data/cameos.csv"),
            ]
        );
    }

    #[test]
    fn test_defaults() {
        let config = GalleryConfig::from_toml("").unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_source_needs_exactly_one_location() {
        let neither = GalleryConfig::from_toml(
            "[[sources]]\nname = \"Intl\"\ncategory = \"intl\"\n",
        );
        assert!(neither.is_err());

        let both = GalleryConfig::from_toml(
            "[[sources]]\nname = \"Intl\"\ncategory = \"intl\"\nurl = \"u\"\npath = \"p\"\n",
        );
        assert!(both.is_err());
    }

    #[test]
    fn test_unknown_category_rejected() {
        let result = GalleryConfig::from_toml(
            "[[sources]]\nname = \"X\"\ncategory = \"trainer\"\npath = \"x.csv\"\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[sources]]\nname = \"Mew\"\ncategory = \"mew\"\npath = \"mew.csv\"").unwrap();

        let config = GalleryConfig::load(file.path()).unwrap();
        assert_eq!(config.sources.len(), 1);

        let missing = GalleryConfig::load(Path::new("/definitely/not/here.toml"));
        assert!(missing.is_err());
    }
}
