//! ProductAssembler: merges one product row with every resolved reference
//! into an [`AssembledProduct`].
//!
//! Assembly only reads the shared context, so products can be assembled in
//! any order or concurrently; `position` carries the input order.

use std::collections::HashSet;

use shopmig_core::{AssembledProduct, DescriptionSegment, RelatedProducts};

use crate::category::CategoryTree;
use crate::joiner::ReferenceIndex;
use crate::report::ReferenceWarning;
use crate::source::{LinkClass, ProductRecord, MAX_RELATED_PER_CLASS};
use crate::tags::{synthesize_tags, TagNamer};

/// Read-only state shared by every product assembly in a run.
pub struct AssemblyContext {
    pub categories: CategoryTree,
    pub references: ReferenceIndex,
    pub namer: Box<dyn TagNamer>,
    /// Every product id in the product table, for related-link checks.
    pub known_products: HashSet<String>,
}

/// Assembles one product, returning it with the warnings it produced.
#[must_use]
pub fn assemble_product(
    position: usize,
    record: &ProductRecord,
    ctx: &AssemblyContext,
) -> (AssembledProduct, Vec<ReferenceWarning>) {
    let mut warnings = Vec::new();

    let mut category_paths = Vec::with_capacity(record.category_ids.len());
    for category_id in &record.category_ids {
        match ctx.categories.path(category_id) {
            Some(path) => category_paths.push(path.to_vec()),
            None => warnings.push(ReferenceWarning::UnresolvedCategory {
                product_id: record.product_id.clone(),
                category_id: category_id.clone(),
            }),
        }
    }

    let body = build_body(record);

    let associations = ctx.references.tags(&record.product_id);
    let provisional = associations
        .iter()
        .filter(|a| ctx.namer.name(a).is_provisional())
        .count();
    if provisional > 0 {
        warnings.push(ReferenceWarning::ProvisionalTags {
            product_id: record.product_id.clone(),
            count: provisional,
        });
    }
    let tags = synthesize_tags(associations, &category_paths, ctx.namer.as_ref());

    let related = RelatedProducts {
        cross_sell: related_handles(record, LinkClass::CrossSell, ctx, &mut warnings),
        up_sell: related_handles(record, LinkClass::UpSell, ctx, &mut warnings),
    };

    let product = AssembledProduct {
        position,
        handle: record.product_id.clone(),
        title: record.name.clone(),
        body,
        category_paths,
        tags,
        related,
        image_key: record.image_key.clone(),
        is_valid: record.valid,
        is_subscription: record.subscription,
        google_shopping: record.google_shopping,
        display_start: record.display_start,
        display_end: record.display_end,
        sale_start: record.sale_start,
        sale_end: record.sale_end,
    };

    (product, warnings)
}

/// Non-empty description cells in column order; `_mobile` columns are marked.
fn build_body(record: &ProductRecord) -> Vec<DescriptionSegment> {
    record
        .description
        .iter()
        .filter(|(_, text)| !text.is_empty())
        .map(|(field, text)| DescriptionSegment {
            field: (*field).to_string(),
            text: text.clone(),
            mobile: field.ends_with("_mobile"),
        })
        .collect()
}

/// Handles of one link class, skipping unknown targets and capping at five.
fn related_handles(
    record: &ProductRecord,
    class: LinkClass,
    ctx: &AssemblyContext,
    warnings: &mut Vec<ReferenceWarning>,
) -> Vec<String> {
    let mut handles = Vec::new();
    let mut dropped = 0usize;

    for link in ctx.references.related_of_class(&record.product_id, class) {
        if !ctx.known_products.contains(&link.linked_product_id) {
            warnings.push(ReferenceWarning::UnknownLinkedProduct {
                product_id: record.product_id.clone(),
                linked_product_id: link.linked_product_id.clone(),
            });
            continue;
        }
        if handles.len() == MAX_RELATED_PER_CLASS {
            dropped += 1;
            continue;
        }
        handles.push(link.linked_product_id.clone());
    }

    if dropped > 0 {
        warnings.push(ReferenceWarning::RelatedTruncated {
            product_id: record.product_id.clone(),
            class,
            dropped,
        });
    }
    handles
}

#[cfg(test)]
#[path = "assemble_test.rs"]
mod tests;
