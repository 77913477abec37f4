//! `shopmig convert`: load, assemble and write one export.
//!
//! Tables load on blocking threads in parallel. Assembly runs in product
//! chunks over shared read-only indices; chunk results are re-sorted by
//! input position before anything is written.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use futures::stream::{self, StreamExt};
use shopmig_convert::source::SourceRow;
use shopmig_convert::{
    chunk_ranges, convert_range, finish, load_table, prepare, write_file, write_outputs,
    CategoryNode, ConvertedProduct, LoadedTable, PreparedRun, ProductRecord, RelatedLink,
    SourceTables, StockRecord, TagAssociation,
};
use shopmig_core::{AppConfig, ExportProfile};

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ConvertOptions {
    pub dry_run: bool,
    pub report_json: bool,
}

/// Runs the whole pipeline for `config`.
///
/// # Errors
///
/// Returns an error on any fatal table, category or write failure. Reference
/// warnings never fail the run.
pub(crate) async fn run_convert(config: &AppConfig, options: ConvertOptions) -> anyhow::Result<()> {
    let profile = crate::load_profile(config)?;
    tracing::info!(
        input_dir = %config.input_dir.display(),
        output_dir = %config.output_dir.display(),
        dry_run = options.dry_run,
        "starting conversion"
    );

    let sources = load_sources(&config.input_dir, &profile).await?;
    let prepared = prepare(sources, &profile)?;
    let converted = assemble_concurrently(&prepared, config.assembly_concurrency).await?;
    let output = finish(prepared.warnings, converted);

    let report_text = output.report.render_text();
    if options.dry_run {
        print!("{report_text}");
        output.report.log_summary();
        return Ok(());
    }

    let products_path = config.products_output_path();
    let variants_path = config.variants_output_path();
    write_outputs(
        &products_path,
        &variants_path,
        &output.products,
        &output.variants,
        &profile,
    )?;

    write_file(&config.report_output_path("txt"), report_text.as_bytes())?;
    if options.report_json {
        let json = output
            .report
            .render_json()
            .context("failed to serialize run report")?;
        write_file(&config.report_output_path("json"), json.as_bytes())?;
    }

    output.report.log_summary();
    println!(
        "converted {} products ({} variants, {} warnings) into {}",
        output.report.products,
        output.report.variants,
        output.report.warnings.len(),
        config.output_dir.display()
    );
    Ok(())
}

async fn load_blocking<T>(dir: &Path, prefix: &str) -> anyhow::Result<LoadedTable<T>>
where
    T: SourceRow + Send + 'static,
{
    let dir = dir.to_path_buf();
    let owned_prefix = prefix.to_string();
    let table = tokio::task::spawn_blocking(move || load_table::<T>(&dir, &owned_prefix))
        .await
        .with_context(|| format!("table loader for {prefix} panicked"))??;
    Ok(table)
}

/// Loads the five tables concurrently. The first failure aborts the run.
async fn load_sources(dir: &Path, profile: &ExportProfile) -> anyhow::Result<SourceTables> {
    let tables = &profile.tables;
    let (products, categories, stock, tags, related) = tokio::try_join!(
        load_blocking::<ProductRecord>(dir, &tables.product),
        load_blocking::<CategoryNode>(dir, &tables.category),
        load_blocking::<StockRecord>(dir, &tables.stock),
        load_blocking::<TagAssociation>(dir, &tables.tag),
        load_blocking::<RelatedLink>(dir, &tables.related),
    )?;
    Ok(SourceTables {
        products,
        categories,
        stock,
        tags,
        related,
    })
}

async fn assemble_concurrently(
    prepared: &PreparedRun,
    concurrency: usize,
) -> anyhow::Result<Vec<ConvertedProduct>> {
    let max_concurrent = concurrency.max(1);
    let ranges = chunk_ranges(prepared.product_count(), max_concurrent);
    tracing::debug!(
        products = prepared.product_count(),
        chunks = ranges.len(),
        "assembling products"
    );

    let chunks: Vec<_> = stream::iter(ranges)
        .map(|range| {
            let context = Arc::clone(&prepared.context);
            let products = Arc::clone(&prepared.products);
            tokio::task::spawn_blocking(move || convert_range(&context, &products, range))
        })
        .buffer_unordered(max_concurrent)
        .collect()
        .await;

    let mut converted = Vec::with_capacity(prepared.product_count());
    for chunk in chunks {
        converted.extend(chunk.context("product assembly task panicked")?);
    }
    Ok(converted)
}

#[cfg(test)]
#[path = "convert_test.rs"]
mod tests;
