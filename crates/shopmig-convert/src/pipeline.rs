//! Stage wiring: loaded tables in, sorted output rows and a run report out.
//!
//! The run is split so callers can parallelize the middle. [`prepare`] builds
//! every read-only index once; [`convert_range`] assembles any slice of the
//! product table against them; [`finish`] restores input order and tallies
//! the report. [`run`] chains the three sequentially.

use std::collections::HashSet;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use shopmig_core::{AssembledProduct, ExportProfile, VariantRecord};

use crate::assemble::{assemble_product, AssemblyContext};
use crate::category::CategoryTree;
use crate::error::ConvertError;
use crate::joiner::ReferenceIndex;
use crate::loader::{load_table, LoadedTable};
use crate::report::{ReferenceWarning, RunReport};
use crate::source::{CategoryNode, ProductRecord, RelatedLink, StockRecord, TagAssociation};
use crate::tags::namer_for_profile;
use crate::variants::build_variants;

/// The five source tables of one export.
#[derive(Debug)]
pub struct SourceTables {
    pub products: LoadedTable<ProductRecord>,
    pub categories: LoadedTable<CategoryNode>,
    pub stock: LoadedTable<StockRecord>,
    pub tags: LoadedTable<TagAssociation>,
    pub related: LoadedTable<RelatedLink>,
}

impl SourceTables {
    /// Loads every table from `dir` one after another.
    ///
    /// # Errors
    ///
    /// Returns the first table's [`ConvertError`].
    pub fn load(dir: &Path, profile: &ExportProfile) -> Result<Self, ConvertError> {
        let prefixes = &profile.tables;
        Ok(Self {
            products: load_table(dir, &prefixes.product)?,
            categories: load_table(dir, &prefixes.category)?,
            stock: load_table(dir, &prefixes.stock)?,
            tags: load_table(dir, &prefixes.tag)?,
            related: load_table(dir, &prefixes.related)?,
        })
    }
}

/// Indices and products ready for assembly.
pub struct PreparedRun {
    pub context: Arc<AssemblyContext>,
    pub products: Arc<Vec<ProductRecord>>,
    /// Warnings raised before assembly, in table order.
    pub warnings: Vec<ReferenceWarning>,
}

impl PreparedRun {
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.products.len()
    }
}

/// One product with its variants and the warnings its assembly raised.
#[derive(Debug, Clone)]
pub struct ConvertedProduct {
    pub product: AssembledProduct,
    pub variants: Vec<VariantRecord>,
    pub warnings: Vec<ReferenceWarning>,
}

/// Everything the serializer and the report need.
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub products: Vec<AssembledProduct>,
    pub variants: Vec<VariantRecord>,
    pub report: RunReport,
}

/// Builds the category tree and reference indices.
///
/// # Errors
///
/// Returns [`ConvertError::Cycle`] or [`ConvertError::DanglingReference`]
/// from category resolution; no product is assembled in that case.
pub fn prepare(
    sources: SourceTables,
    profile: &ExportProfile,
) -> Result<PreparedRun, ConvertError> {
    let SourceTables {
        products,
        categories,
        stock,
        tags,
        related,
    } = sources;

    let mut warnings = Vec::new();
    for table_warnings in [
        products.warnings,
        categories.warnings,
        stock.warnings,
        tags.warnings,
        related.warnings,
    ] {
        warnings.extend(table_warnings);
    }

    let (tree, tree_warnings) = CategoryTree::build(categories.rows, profile)?;
    warnings.extend(tree_warnings);

    let mut known_products = HashSet::with_capacity(products.rows.len());
    for record in &products.rows {
        if !known_products.insert(record.product_id.clone()) {
            warnings.push(ReferenceWarning::DuplicateProduct {
                product_id: record.product_id.clone(),
            });
        }
    }

    let inline_links: Vec<RelatedLink> = products
        .rows
        .iter()
        .flat_map(|p| p.related.iter().cloned())
        .collect();
    let (references, reference_warnings) =
        ReferenceIndex::build(stock.rows, tags.rows, related.rows, inline_links);
    warnings.extend(reference_warnings);

    tracing::debug!(
        products = products.rows.len(),
        categories = tree.len(),
        warnings = warnings.len(),
        "run prepared"
    );

    Ok(PreparedRun {
        context: Arc::new(AssemblyContext {
            categories: tree,
            references,
            namer: namer_for_profile(profile),
            known_products,
        }),
        products: Arc::new(products.rows),
        warnings,
    })
}

/// Splits `len` products into at most `chunks` contiguous, non-empty ranges.
#[must_use]
pub fn chunk_ranges(len: usize, chunks: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    let size = len.div_ceil(chunks.max(1));
    (0..len)
        .step_by(size)
        .map(|start| start..(start + size).min(len))
        .collect()
}

/// Assembles the products in `range`. Positions are absolute table indices.
#[must_use]
pub fn convert_range(
    context: &AssemblyContext,
    products: &[ProductRecord],
    range: Range<usize>,
) -> Vec<ConvertedProduct> {
    let start = range.start;
    products[range]
        .iter()
        .enumerate()
        .map(|(offset, record)| {
            let (product, mut warnings) = assemble_product(start + offset, record, context);
            let (variants, variant_warnings) = build_variants(record, &context.references);
            warnings.extend(variant_warnings);
            ConvertedProduct {
                product,
                variants,
                warnings,
            }
        })
        .collect()
}

/// Restores input order and builds the report. `converted` may arrive in
/// any order.
#[must_use]
pub fn finish(
    prepared_warnings: Vec<ReferenceWarning>,
    mut converted: Vec<ConvertedProduct>,
) -> RunOutput {
    converted.sort_by_key(|c| c.product.position);

    let mut report = RunReport {
        warnings: prepared_warnings,
        ..RunReport::default()
    };
    let mut products = Vec::with_capacity(converted.len());
    let mut variants = Vec::with_capacity(converted.len());
    for item in converted {
        report.extend(item.warnings);
        variants.extend(item.variants);
        products.push(item.product);
    }
    report.products = products.len();
    report.variants = variants.len();

    RunOutput {
        products,
        variants,
        report,
    }
}

/// Runs assembly sequentially over prepared sources.
///
/// # Errors
///
/// Returns any fatal [`ConvertError`] from [`prepare`].
pub fn run(sources: SourceTables, profile: &ExportProfile) -> Result<RunOutput, ConvertError> {
    let prepared = prepare(sources, profile)?;
    let converted = convert_range(
        &prepared.context,
        &prepared.products,
        0..prepared.products.len(),
    );
    Ok(finish(prepared.warnings, converted))
}
