use std::collections::HashSet;
use std::path::Path;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Placeholder substituted with the percent-encoded keyword in `search_url`.
pub const KEYWORD_PLACEHOLDER: &str = "{keyword}";

/// RFC 3986 unreserved characters stay literal; everything else is encoded.
const KEYWORD_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// CSS selectors used to pull product fields out of one source's search page.
///
/// `item` is applied to the whole document; the field selectors are applied
/// inside each matched item. `next_page` is applied to the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorConfig {
    pub item: String,
    pub name: String,
    pub price: String,
    pub review_text: String,
    pub product_link: String,
    pub image: String,
    /// Absent for sources whose search results fit on a single page.
    #[serde(default)]
    pub next_page: Option<String>,
}

/// One marketplace to crawl, e.g. Amazon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    /// Site root, used to resolve relative links and as the stored source URL.
    pub base_url: String,
    /// Search URL template containing [`KEYWORD_PLACEHOLDER`].
    pub search_url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub selectors: SelectorConfig,
}

fn default_enabled() -> bool {
    true
}

impl SourceConfig {
    /// Builds the first-page URL for `keyword`.
    ///
    /// ```
    /// # use prodhunt_core::{SelectorConfig, SourceConfig};
    /// # let selectors = SelectorConfig {
    /// #     item: "li".into(), name: "h2".into(), price: ".p".into(),
    /// #     review_text: ".r".into(), product_link: "a".into(), image: "img".into(),
    /// #     next_page: None,
    /// # };
    /// let source = SourceConfig {
    ///     name: "Amazon".into(),
    ///     base_url: "https://www.amazon.com".into(),
    ///     search_url: "https://www.amazon.com/s?k={keyword}".into(),
    ///     enabled: true,
    ///     selectors,
    /// };
    /// assert_eq!(
    ///     source.search_url_for("usb c hub"),
    ///     "https://www.amazon.com/s?k=usb%20c%20hub"
    /// );
    /// ```
    #[must_use]
    pub fn search_url_for(&self, keyword: &str) -> String {
        let encoded = utf8_percent_encode(keyword.trim(), KEYWORD_ENCODE_SET).to_string();
        self.search_url.replace(KEYWORD_PLACEHOLDER, &encoded)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceConfig>,
}

impl SourcesFile {
    /// Enabled sources, optionally restricted to one name (case-insensitive).
    #[must_use]
    pub fn select(&self, name_filter: Option<&str>) -> Vec<SourceConfig> {
        self.sources
            .iter()
            .filter(|s| s.enabled)
            .filter(|s| name_filter.is_none_or(|name| s.name.eq_ignore_ascii_case(name)))
            .cloned()
            .collect()
    }
}

/// Load and validate the sources configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_sources(&content)
}

/// Parse and validate sources YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML does not parse or fails validation.
pub fn parse_sources(content: &str) -> Result<SourcesFile, ConfigError> {
    let sources_file: SourcesFile =
        serde_yaml::from_str(content).map_err(ConfigError::SourcesFileParse)?;

    validate_sources(&sources_file)?;

    Ok(sources_file)
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for source in &sources_file.sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(source.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{}'",
                source.name
            )));
        }

        if !is_http_url(&source.base_url) {
            return Err(ConfigError::Validation(format!(
                "source '{}' has invalid base_url '{}'; must start with http:// or https://",
                source.name, source.base_url
            )));
        }

        if !is_http_url(&source.search_url) || !source.search_url.contains(KEYWORD_PLACEHOLDER) {
            return Err(ConfigError::Validation(format!(
                "source '{}' search_url must be an http(s) URL containing {KEYWORD_PLACEHOLDER}",
                source.name
            )));
        }

        let s = &source.selectors;
        let required = [
            ("item", &s.item),
            ("name", &s.name),
            ("price", &s.price),
            ("review_text", &s.review_text),
            ("product_link", &s.product_link),
            ("image", &s.image),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "source '{}' has an empty '{field}' selector",
                    source.name
                )));
            }
        }
        if s.next_page.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "source '{}' has an empty 'next_page' selector; omit it instead",
                source.name
            )));
        }
    }

    Ok(())
}

fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    rest.is_some_and(|host| !host.is_empty())
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;
