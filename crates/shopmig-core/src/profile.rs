//! The YAML export profile: everything about the destination shape that an
//! operator may want to change between runs without touching code.
//!
//! ```yaml
//! vendor: yumejin
//! image_base_url: https://cdn.example.com/products/
//! tables:
//!   product: Product
//!   stock: ProductStock
//! tag_names:
//!   "12": Organic
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// File-name prefixes of the five source tables. The ERP appends the export
/// date, so `Product` matches `Product20251211.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablePrefixes {
    pub product: String,
    pub category: String,
    pub stock: String,
    pub tag: String,
    pub related: String,
}

impl Default for TablePrefixes {
    fn default() -> Self {
        Self {
            product: "Product".to_string(),
            category: "ProductCategory".to_string(),
            stock: "ProductStock".to_string(),
            tag: "ProductTag".to_string(),
            related: "ProductRelated".to_string(),
        }
    }
}

impl TablePrefixes {
    fn all(&self) -> [&str; 5] {
        [
            &self.product,
            &self.category,
            &self.stock,
            &self.tag,
            &self.related,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportProfile {
    pub vendor: String,
    pub image_base_url: String,
    pub image_extension: String,
    /// Parent reference marking a root category. Compared case-insensitively;
    /// an empty parent reference is always a root.
    pub root_sentinel: String,
    /// Joins the names of one category path.
    pub category_separator: String,
    /// Joins several category paths of one product.
    pub category_joiner: String,
    pub tables: TablePrefixes,
    /// Curated tag master: source tag id to tag name.
    pub tag_names: BTreeMap<String, String>,
}

impl Default for ExportProfile {
    fn default() -> Self {
        Self {
            vendor: "yumejin".to_string(),
            image_base_url: "https://www.example.com/images/products/".to_string(),
            image_extension: "jpg".to_string(),
            root_sentinel: "root".to_string(),
            category_separator: "/".to_string(),
            category_joiner: " | ".to_string(),
            tables: TablePrefixes::default(),
            tag_names: BTreeMap::new(),
        }
    }
}

impl ExportProfile {
    /// Returns `true` if `parent_ref` marks its category as a root.
    #[must_use]
    pub fn is_root_ref(&self, parent_ref: &str) -> bool {
        let trimmed = parent_ref.trim();
        trimmed.is_empty() || trimmed.eq_ignore_ascii_case(&self.root_sentinel)
    }

    /// Builds the image URL for an image key, or `None` when the key is empty.
    #[must_use]
    pub fn image_url(&self, image_key: &str) -> Option<String> {
        let key = image_key.trim();
        if key.is_empty() {
            return None;
        }
        Some(format!(
            "{}{}.{}",
            self.image_base_url, key, self.image_extension
        ))
    }
}

/// Load and validate an export profile from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_profile(path: &Path) -> Result<ExportProfile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProfileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let profile: ExportProfile = serde_yaml::from_str(&content)?;
    validate_profile(&profile)?;
    Ok(profile)
}

fn validate_profile(profile: &ExportProfile) -> Result<(), ConfigError> {
    if profile.vendor.trim().is_empty() {
        return Err(ConfigError::Validation(
            "vendor must be non-empty".to_string(),
        ));
    }

    if !(profile.image_base_url.starts_with("http://")
        || profile.image_base_url.starts_with("https://"))
    {
        return Err(ConfigError::Validation(format!(
            "image_base_url '{}' must start with http:// or https://",
            profile.image_base_url
        )));
    }

    if profile.category_separator.is_empty() || profile.category_joiner.is_empty() {
        return Err(ConfigError::Validation(
            "category_separator and category_joiner must be non-empty".to_string(),
        ));
    }

    let mut seen_prefixes = HashSet::new();
    for prefix in profile.tables.all() {
        if prefix.trim().is_empty() {
            return Err(ConfigError::Validation(
                "table prefixes must be non-empty".to_string(),
            ));
        }
        if !seen_prefixes.insert(prefix) {
            return Err(ConfigError::Validation(format!(
                "duplicate table prefix: '{prefix}'"
            )));
        }
    }

    for (tag_id, name) in &profile.tag_names {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "tag '{tag_id}' has an empty name"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
