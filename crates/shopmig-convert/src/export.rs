//! OutputSerializer: renders assembled products and variants as the two
//! Matrixify import sheets.
//!
//! Rows are written in input position order regardless of the order they
//! arrive in, so a run is byte-for-byte reproducible.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;
use shopmig_core::{AssembledProduct, ExportProfile, VariantRecord};

use crate::error::ConvertError;

pub const PRODUCT_COLUMNS: [&str; 17] = [
    "Handle",
    "Title",
    "Body (HTML)",
    "Vendor",
    "Status",
    "Published",
    "Published At",
    "Product Category",
    "Tags",
    "Image Src",
    "Metafield: shopify--discovery--product_recommendation.complementary_products [list.product_reference]",
    "Metafield: shopify--discovery--product_recommendation.related_products [list.product_reference]",
    "Metafield: custom.display_end_at [date_time]",
    "Metafield: custom.sale_start_at [date_time]",
    "Metafield: custom.sale_end_at [date_time]",
    "Metafield: custom.subscription [boolean]",
    "Metafield: custom.google_shopping [boolean]",
];

pub const VARIANT_COLUMNS: [&str; 9] = [
    "Handle",
    "Option1 Name",
    "Option1 Value",
    "Variant SKU",
    "Variant Price",
    "Variant Compare At Price",
    "Variant Inventory Qty",
    "Variant Requires Shipping",
    "Variant Taxable",
];

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out)
}

fn bool_cell(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

fn datetime_cell(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format(DATETIME_FORMAT).to_string())
        .unwrap_or_default()
}

fn product_row(product: &AssembledProduct, profile: &ExportProfile) -> [String; 17] {
    [
        product.handle.clone(),
        product.title.clone(),
        product.body_html(),
        profile.vendor.clone(),
        if product.is_valid { "active" } else { "draft" }.to_string(),
        bool_cell(product.is_valid).to_string(),
        datetime_cell(product.display_start),
        product.category_string(&profile.category_separator, &profile.category_joiner),
        product.tag_string(),
        product
            .image_key
            .as_deref()
            .and_then(|key| profile.image_url(key))
            .unwrap_or_default(),
        product.related.cross_sell.join(", "),
        product.related.up_sell.join(", "),
        datetime_cell(product.display_end),
        datetime_cell(product.sale_start),
        datetime_cell(product.sale_end),
        bool_cell(product.is_subscription).to_string(),
        bool_cell(product.google_shopping).to_string(),
    ]
}

fn variant_row(variant: &VariantRecord) -> [String; 9] {
    let (option_name, option_value) = variant
        .option
        .as_ref()
        .map(|o| (o.name.clone(), o.value.clone()))
        .unwrap_or_default();
    [
        variant.handle.clone(),
        option_name,
        option_value,
        variant.sku.clone(),
        variant.price.map(|p| p.to_string()).unwrap_or_default(),
        variant
            .compare_at_price
            .map(|p| p.to_string())
            .unwrap_or_default(),
        variant.inventory.to_string(),
        bool_cell(true).to_string(),
        bool_cell(true).to_string(),
    ]
}

/// Writes the products sheet, header first, rows sorted by position.
///
/// # Errors
///
/// Returns the underlying CSV or I/O error.
pub fn write_products<W: Write>(
    out: W,
    products: &[AssembledProduct],
    profile: &ExportProfile,
) -> Result<(), csv::Error> {
    let mut ordered: Vec<&AssembledProduct> = products.iter().collect();
    ordered.sort_by_key(|p| p.position);

    let mut wtr = writer(out);
    wtr.write_record(PRODUCT_COLUMNS)?;
    for product in ordered {
        wtr.write_record(product_row(product, profile))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the variants sheet. Variants are emitted in the slice order, which
/// the pipeline keeps aligned with product position.
///
/// # Errors
///
/// Returns the underlying CSV or I/O error.
pub fn write_variants<W: Write>(out: W, variants: &[VariantRecord]) -> Result<(), csv::Error> {
    let mut wtr = writer(out);
    wtr.write_record(VARIANT_COLUMNS)?;
    for variant in variants {
        wtr.write_record(variant_row(variant))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Renders both sheets in memory and only then writes them, so a failure
/// while rendering leaves no partial files behind.
///
/// # Errors
///
/// Returns [`ConvertError::Write`] if rendering or writing either file fails.
pub fn write_outputs(
    products_path: &Path,
    variants_path: &Path,
    products: &[AssembledProduct],
    variants: &[VariantRecord],
    profile: &ExportProfile,
) -> Result<(), ConvertError> {
    let mut products_buf = Vec::new();
    write_products(&mut products_buf, products, profile).map_err(|e| ConvertError::Write {
        path: products_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut variants_buf = Vec::new();
    write_variants(&mut variants_buf, variants).map_err(|e| ConvertError::Write {
        path: variants_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    write_file(products_path, &products_buf)?;
    write_file(variants_path, &variants_buf)?;

    tracing::info!(
        products = products.len(),
        variants = variants.len(),
        path = %products_path.display(),
        "output sheets written"
    );
    Ok(())
}

/// Writes `contents` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`ConvertError::Write`] on any filesystem failure.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<(), ConvertError> {
    let to_error = |e: std::io::Error| ConvertError::Write {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    fs::write(path, contents).map_err(to_error)
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
