//! Non-fatal issues collected during a run, and the human-readable report.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::source::LinkClass;

/// A missing or malformed cross-table reference. Recorded, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceWarning {
    UnresolvedCategory {
        product_id: String,
        category_id: String,
    },
    MissingStock {
        product_id: String,
    },
    ProvisionalTags {
        product_id: String,
        count: usize,
    },
    VariantDataMissing {
        product_id: String,
    },
    MissingPrice {
        product_id: String,
    },
    InvalidValue {
        table: String,
        row: usize,
        column: String,
        value: String,
        reason: String,
    },
    UnknownLinkClass {
        table: String,
        row: usize,
        value: String,
    },
    UnknownLinkedProduct {
        product_id: String,
        linked_product_id: String,
    },
    RelatedTruncated {
        product_id: String,
        class: LinkClass,
        dropped: usize,
    },
    DuplicateStock {
        product_id: String,
        variant_id: String,
    },
    DuplicateCategory {
        category_id: String,
    },
    DuplicateProduct {
        product_id: String,
    },
}

impl ReferenceWarning {
    /// Stable identifier used for grouping in the report.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ReferenceWarning::UnresolvedCategory { .. } => "unresolved_category",
            ReferenceWarning::MissingStock { .. } => "missing_stock",
            ReferenceWarning::ProvisionalTags { .. } => "provisional_tags",
            ReferenceWarning::VariantDataMissing { .. } => "variant_data_missing",
            ReferenceWarning::MissingPrice { .. } => "missing_price",
            ReferenceWarning::InvalidValue { .. } => "invalid_value",
            ReferenceWarning::UnknownLinkClass { .. } => "unknown_link_class",
            ReferenceWarning::UnknownLinkedProduct { .. } => "unknown_linked_product",
            ReferenceWarning::RelatedTruncated { .. } => "related_truncated",
            ReferenceWarning::DuplicateStock { .. } => "duplicate_stock",
            ReferenceWarning::DuplicateCategory { .. } => "duplicate_category",
            ReferenceWarning::DuplicateProduct { .. } => "duplicate_product",
        }
    }
}

impl std::fmt::Display for ReferenceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceWarning::UnresolvedCategory {
                product_id,
                category_id,
            } => write!(
                f,
                "product {product_id}: category {category_id} not found; emitted without it"
            ),
            ReferenceWarning::MissingStock { product_id } => {
                write!(f, "product {product_id}: no stock row; inventory left unknown")
            }
            ReferenceWarning::ProvisionalTags { product_id, count } => write!(
                f,
                "product {product_id}: {count} tag association(s) without a tag name; provisional tag emitted"
            ),
            ReferenceWarning::VariantDataMissing { product_id } => write!(
                f,
                "product {product_id}: variation flag set but no variation data; single default variant emitted"
            ),
            ReferenceWarning::MissingPrice { product_id } => {
                write!(f, "product {product_id}: no display price")
            }
            ReferenceWarning::InvalidValue {
                table,
                row,
                column,
                value,
                reason,
            } => write!(
                f,
                "{table} row {row}: column {column} value '{value}' ignored ({reason})"
            ),
            ReferenceWarning::UnknownLinkClass { table, row, value } => write!(
                f,
                "{table} row {row}: unknown related_type '{value}'; link ignored"
            ),
            ReferenceWarning::UnknownLinkedProduct {
                product_id,
                linked_product_id,
            } => write!(
                f,
                "product {product_id}: related product {linked_product_id} is not in the product table"
            ),
            ReferenceWarning::RelatedTruncated {
                product_id,
                class,
                dropped,
            } => write!(
                f,
                "product {product_id}: {dropped} {class} link(s) beyond the first 5 dropped"
            ),
            ReferenceWarning::DuplicateStock {
                product_id,
                variant_id,
            } => write!(
                f,
                "stock for {product_id}/{variant_id} appears more than once; quantities summed"
            ),
            ReferenceWarning::DuplicateCategory { category_id } => write!(
                f,
                "category {category_id} appears more than once; last row wins"
            ),
            ReferenceWarning::DuplicateProduct { product_id } => write!(
                f,
                "product {product_id} appears more than once; every row emitted"
            ),
        }
    }
}

/// Outcome of a run: counts plus every recorded warning in pipeline order
/// (table loads first, then products by input position).
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub products: usize,
    pub variants: usize,
    pub warnings: Vec<ReferenceWarning>,
}

impl RunReport {
    pub fn extend(&mut self, warnings: impl IntoIterator<Item = ReferenceWarning>) {
        self.warnings.extend(warnings);
    }

    /// Warning counts per kind, ordered by kind name.
    #[must_use]
    pub fn counts_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for warning in &self.warnings {
            *counts.entry(warning.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Renders the plain-text report written next to the output files.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "conversion report");
        let _ = writeln!(out, "products: {}", self.products);
        let _ = writeln!(out, "variants: {}", self.variants);
        let _ = writeln!(out, "warnings: {}", self.warnings.len());

        let counts = self.counts_by_kind();
        for (kind, count) in &counts {
            let _ = writeln!(out);
            let _ = writeln!(out, "## {kind} ({count})");
            for warning in self.warnings.iter().filter(|w| w.kind() == *kind) {
                let _ = writeln!(out, "- {warning}");
            }
        }
        out
    }

    /// Renders the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if serialization fails.
    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Emits one summary event per warning kind.
    pub fn log_summary(&self) {
        tracing::info!(
            products = self.products,
            variants = self.variants,
            warnings = self.warnings.len(),
            "conversion finished"
        );
        for (kind, count) in self.counts_by_kind() {
            tracing::warn!(kind, count, "reference warnings recorded");
        }
    }
}
