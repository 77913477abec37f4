pub mod assemble;
pub mod category;
pub mod encoding;
pub mod error;
pub mod export;
pub mod joiner;
pub mod loader;
pub(crate) mod parse;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod tags;
pub mod variants;

pub use assemble::{assemble_product, AssemblyContext};
pub use category::CategoryTree;
pub use error::ConvertError;
pub use export::{write_file, write_outputs, write_products, write_variants};
pub use joiner::ReferenceIndex;
pub use loader::{load_table, locate_table, parse_table, LoadedTable};
pub use pipeline::{
    chunk_ranges, convert_range, finish, prepare, run, ConvertedProduct, PreparedRun, RunOutput,
    SourceTables,
};
pub use report::{ReferenceWarning, RunReport};
pub use source::{CategoryNode, LinkClass, ProductRecord, RelatedLink, StockRecord, TagAssociation};
pub use variants::build_variants;
