//! VariantBuilder: derives variant records from a product row.
//!
//! The variation table is empty in this export, so every product gets one
//! default variant. A product flagged for variations is reported because
//! its real options cannot be reconstructed from this data.

use shopmig_core::{InventoryQuantity, VariantRecord};

use crate::joiner::ReferenceIndex;
use crate::report::ReferenceWarning;
use crate::source::ProductRecord;

/// Builds the variants for one product.
#[must_use]
pub fn build_variants(
    record: &ProductRecord,
    references: &ReferenceIndex,
) -> (Vec<VariantRecord>, Vec<ReferenceWarning>) {
    let mut warnings = Vec::new();

    if record.variant_enabled {
        warnings.push(ReferenceWarning::VariantDataMissing {
            product_id: record.product_id.clone(),
        });
    }

    (
        vec![default_variant(record, references, &mut warnings)],
        warnings,
    )
}

/// The single variant keyed by the product's own id.
fn default_variant(
    record: &ProductRecord,
    references: &ReferenceIndex,
    warnings: &mut Vec<ReferenceWarning>,
) -> VariantRecord {
    if record.display_price.is_none() {
        warnings.push(ReferenceWarning::MissingPrice {
            product_id: record.product_id.clone(),
        });
    }

    // A sale price at or above the display price is not a discount.
    let compare_at_price = match (record.display_price, record.sale_price) {
        (Some(price), Some(sale)) if sale < price => Some(sale),
        _ => None,
    };

    let inventory = match references.stock(&record.product_id, &record.product_id) {
        Some(stock) => InventoryQuantity::Known(stock.quantity),
        None => {
            warnings.push(ReferenceWarning::MissingStock {
                product_id: record.product_id.clone(),
            });
            InventoryQuantity::Unknown
        }
    };

    VariantRecord {
        handle: record.product_id.clone(),
        option: None,
        sku: record.product_id.clone(),
        price: record.display_price,
        compare_at_price,
        inventory,
    }
}
