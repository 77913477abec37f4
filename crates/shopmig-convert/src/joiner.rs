//! ReferenceJoiner: read-only indices over the stock, tag and related-product
//! tables, keyed by product id.
//!
//! A missing key is an empty result, never an error; most products have no
//! rows in these sparse tables.

use std::collections::{HashMap, HashSet};

use crate::report::ReferenceWarning;
use crate::source::{LinkClass, RelatedLink, StockRecord, TagAssociation};

#[derive(Debug, Default)]
pub struct ReferenceIndex {
    stock: HashMap<String, HashMap<String, StockRecord>>,
    tags: HashMap<String, Vec<TagAssociation>>,
    related: HashMap<String, Vec<RelatedLink>>,
}

impl ReferenceIndex {
    /// Builds all three indices.
    ///
    /// `inline_links` are the links declared on product rows; they are merged
    /// after the related-product table's links. Each product's links end up
    /// grouped by class then ordinal, with repeated targets removed.
    #[must_use]
    pub fn build(
        stock: Vec<StockRecord>,
        tags: Vec<TagAssociation>,
        related: Vec<RelatedLink>,
        inline_links: impl IntoIterator<Item = RelatedLink>,
    ) -> (Self, Vec<ReferenceWarning>) {
        let mut warnings = Vec::new();

        let mut stock_index: HashMap<String, HashMap<String, StockRecord>> = HashMap::new();
        for record in stock {
            let by_variant = stock_index.entry(record.product_id.clone()).or_default();
            match by_variant.get_mut(&record.variant_id) {
                Some(existing) => {
                    warnings.push(ReferenceWarning::DuplicateStock {
                        product_id: record.product_id.clone(),
                        variant_id: record.variant_id.clone(),
                    });
                    existing.quantity = existing.quantity.saturating_add(record.quantity);
                    if existing.alert_threshold.is_none() {
                        existing.alert_threshold = record.alert_threshold;
                    }
                }
                None => {
                    by_variant.insert(record.variant_id.clone(), record);
                }
            }
        }

        let mut tag_index: HashMap<String, Vec<TagAssociation>> = HashMap::new();
        for association in tags {
            tag_index
                .entry(association.product_id.clone())
                .or_default()
                .push(association);
        }

        let mut related_index: HashMap<String, Vec<RelatedLink>> = HashMap::new();
        for link in related.into_iter().chain(inline_links) {
            related_index
                .entry(link.product_id.clone())
                .or_default()
                .push(link);
        }
        for links in related_index.values_mut() {
            // Stable: equal (class, ordinal) keep table-before-inline order.
            links.sort_by_key(|l| (l.class, l.ordinal));
            let mut seen: HashSet<(LinkClass, String)> = HashSet::new();
            links.retain(|l| seen.insert((l.class, l.linked_product_id.clone())));
        }

        tracing::debug!(
            stock_products = stock_index.len(),
            tagged_products = tag_index.len(),
            linked_products = related_index.len(),
            "reference indices built"
        );

        (
            Self {
                stock: stock_index,
                tags: tag_index,
                related: related_index,
            },
            warnings,
        )
    }

    #[must_use]
    pub fn stock(&self, product_id: &str, variant_id: &str) -> Option<&StockRecord> {
        self.stock.get(product_id)?.get(variant_id)
    }

    /// Tag associations in source row order.
    #[must_use]
    pub fn tags(&self, product_id: &str) -> &[TagAssociation] {
        self.tags
            .get(product_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All links, grouped by class then ordinal.
    #[must_use]
    pub fn related(&self, product_id: &str) -> &[RelatedLink] {
        self.related
            .get(product_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn related_of_class(
        &self,
        product_id: &str,
        class: LinkClass,
    ) -> impl Iterator<Item = &RelatedLink> {
        self.related(product_id)
            .iter()
            .filter(move |l| l.class == class)
    }
}
