use std::path::PathBuf;

/// Process-level settings for a conversion run.
///
/// Everything describing *what* the output looks like lives in
/// [`crate::ExportProfile`]; this struct only says where to read, where to
/// write, and how hard to work.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Optional YAML export profile. Built-in defaults apply when `None`.
    pub profile_path: Option<PathBuf>,
    pub log_level: String,
    /// Number of product chunks assembled concurrently. Always at least 1.
    pub assembly_concurrency: usize,
    /// File-name prefix for `<prefix>_products.csv` and `<prefix>_variants.csv`.
    pub output_prefix: String,
}

impl AppConfig {
    #[must_use]
    pub fn products_output_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_products.csv", self.output_prefix))
    }

    #[must_use]
    pub fn variants_output_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_variants.csv", self.output_prefix))
    }

    #[must_use]
    pub fn report_output_path(&self, extension: &str) -> PathBuf {
        self.output_dir
            .join(format!("conversion_report.{extension}"))
    }
}
