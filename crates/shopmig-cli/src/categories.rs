//! `shopmig categories`: print the resolved category tree.

use shopmig_convert::{load_table, CategoryNode, CategoryTree};
use shopmig_core::AppConfig;

/// Loads only the category table and prints its outline.
///
/// # Errors
///
/// Returns an error if the table cannot be read or the hierarchy is broken.
pub(crate) fn run_categories(config: &AppConfig) -> anyhow::Result<()> {
    let profile = crate::load_profile(config)?;
    let table = load_table::<CategoryNode>(&config.input_dir, &profile.tables.category)?;
    let (tree, warnings) = CategoryTree::build(table.rows, &profile)?;

    for warning in table.warnings.iter().chain(&warnings) {
        tracing::warn!(kind = warning.kind(), "{warning}");
    }
    tracing::info!(
        categories = tree.len(),
        roots = tree.roots().len(),
        "category tree resolved"
    );

    print!("{}", tree.render_outline());
    Ok(())
}
