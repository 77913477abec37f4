//! Typed rows of the legacy ERP export.
//!
//! ## Observed shape of the export
//!
//! ### Encoding
//! Every table is Shift_JIS with a header row. Files carry the export date in
//! their name (`Product20251211.csv`).
//!
//! ### Empty tables
//! The price, variation and review tables are header-only in the exports we
//! have, and the tag and related-product tables are sparse. An absent or
//! header-only table means "no data" and is loaded as an empty collection.
//!
//! ### Tags
//! `ProductTag` only links a product to an opaque tag id and timestamp. Tag
//! names are not exported; see [`crate::tags`] for how names are produced.
//!
//! ### Categories
//! `parent_category_id` holds the literal `root` (or is empty) for top-level
//! categories. A product references up to five categories in
//! `category_id1..5`; the order carries no priority.
//!
//! ### Stock
//! Keyed by product and variation. Products without variations repeat the
//! product id or leave `product_variation_id` empty.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::loader::RawRow;

/// Maximum categories per product (`category_id1..5`).
pub const MAX_CATEGORIES: usize = 5;

/// Maximum related products per link class.
pub const MAX_RELATED_PER_CLASS: usize = 5;

/// Description columns in body order. `_mobile` columns hold the
/// mobile-specific variant of the column before them.
pub const DESCRIPTION_COLUMNS: [&str; 11] = [
    "catchcopy",
    "outline",
    "outline_mobile",
    "desc_detail1",
    "desc_detail1_mobile",
    "desc_detail2",
    "desc_detail2_mobile",
    "desc_detail3",
    "desc_detail3_mobile",
    "desc_detail4",
    "desc_detail4_mobile",
];

/// A table type the loader can produce.
pub trait SourceRow: Sized {
    /// Columns the header must contain. Other columns are optional.
    const REQUIRED_COLUMNS: &'static [&'static str];

    /// Builds a typed row. Returns `None` for rows that carry no usable key;
    /// unparsable optional values are recorded on `row` as warnings.
    fn from_row(row: &mut RawRow<'_>) -> Option<Self>;
}

/// The two classes of related-product link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkClass {
    CrossSell,
    UpSell,
}

impl LinkClass {
    /// Parses the `related_type` column.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "cross" | "cross_sell" | "crosssell" => Some(LinkClass::CrossSell),
            "2" | "up" | "up_sell" | "upsell" => Some(LinkClass::UpSell),
            _ => None,
        }
    }
}

impl std::fmt::Display for LinkClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkClass::CrossSell => write!(f, "cross-sell"),
            LinkClass::UpSell => write!(f, "up-sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedLink {
    pub product_id: String,
    pub linked_product_id: String,
    pub class: LinkClass,
    /// 1-based display ordinal within the class.
    pub ordinal: u8,
}

#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub product_id: String,
    pub name: String,
    /// `(column, text)` for every [`DESCRIPTION_COLUMNS`] entry, in order.
    /// Empty cells are kept so the column order stays intact.
    pub description: Vec<(&'static str, String)>,
    pub display_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    /// Non-empty `category_id1..5` values, in column order.
    pub category_ids: Vec<String>,
    /// Links declared inline through `cross_sell_product_id1..5` and
    /// `up_sell_product_id1..5`.
    pub related: Vec<RelatedLink>,
    pub display_start: Option<NaiveDateTime>,
    pub display_end: Option<NaiveDateTime>,
    pub sale_start: Option<NaiveDateTime>,
    pub sale_end: Option<NaiveDateTime>,
    pub variant_enabled: bool,
    pub subscription: bool,
    pub google_shopping: bool,
    pub valid: bool,
    pub image_key: Option<String>,
}

impl SourceRow for ProductRecord {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["product_id", "name"];

    fn from_row(row: &mut RawRow<'_>) -> Option<Self> {
        let product_id = row.optional("product_id")?;

        let description = DESCRIPTION_COLUMNS
            .iter()
            .map(|&column| (column, row.text(column).to_string()))
            .collect();

        let category_ids = (1..=MAX_CATEGORIES)
            .filter_map(|i| row.optional(&format!("category_id{i}")))
            .collect();

        let mut related = Vec::new();
        for (class, prefix) in [
            (LinkClass::CrossSell, "cross_sell_product_id"),
            (LinkClass::UpSell, "up_sell_product_id"),
        ] {
            for ordinal in 1..=5u8 {
                if let Some(linked) = row.optional(&format!("{prefix}{ordinal}")) {
                    related.push(RelatedLink {
                        product_id: product_id.clone(),
                        linked_product_id: linked,
                        class,
                        ordinal,
                    });
                }
            }
        }

        Some(ProductRecord {
            name: row.text("name").to_string(),
            description,
            display_price: row.decimal("display_price"),
            sale_price: row.decimal("display_special_price"),
            category_ids,
            related,
            display_start: row.datetime("display_start_date"),
            display_end: row.datetime("display_end_date"),
            sale_start: row.datetime("sale_start_date"),
            sale_end: row.datetime("sale_end_date"),
            variant_enabled: row.flag("variation_flg"),
            subscription: row.flag("subscription_flg"),
            google_shopping: row.flag("google_shopping_flg"),
            valid: row.flag("valid_flg"),
            image_key: row.optional("image_head"),
            product_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub category_id: String,
    /// Raw parent reference; root detection is up to the resolver.
    pub parent_ref: String,
    pub name: String,
    pub sort_order: Option<i64>,
}

impl SourceRow for CategoryNode {
    const REQUIRED_COLUMNS: &'static [&'static str] =
        &["category_id", "parent_category_id", "name"];

    fn from_row(row: &mut RawRow<'_>) -> Option<Self> {
        Some(CategoryNode {
            category_id: row.optional("category_id")?,
            parent_ref: row.text("parent_category_id").to_string(),
            name: row.text("name").to_string(),
            sort_order: row.quantity("sort_order"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRecord {
    pub product_id: String,
    /// Equals `product_id` for products without real variations.
    pub variant_id: String,
    pub quantity: i64,
    pub alert_threshold: Option<i64>,
}

impl SourceRow for StockRecord {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["product_id", "stock"];

    fn from_row(row: &mut RawRow<'_>) -> Option<Self> {
        let product_id = row.optional("product_id")?;
        // An unparsable or empty stock cell means unknown, so the row is
        // dropped rather than read as zero.
        let quantity = row.quantity("stock")?;
        let variant_id = row
            .optional("product_variation_id")
            .unwrap_or_else(|| product_id.clone());
        Some(StockRecord {
            product_id,
            variant_id,
            quantity,
            alert_threshold: row.quantity("stock_alert"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAssociation {
    pub product_id: String,
    pub tag_id: Option<String>,
    /// Opaque association timestamp, kept verbatim.
    pub associated_at: Option<String>,
}

impl SourceRow for TagAssociation {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["product_id"];

    fn from_row(row: &mut RawRow<'_>) -> Option<Self> {
        Some(TagAssociation {
            product_id: row.optional("product_id")?,
            tag_id: row.optional("tag_id"),
            associated_at: row.optional("created_at"),
        })
    }
}

impl SourceRow for RelatedLink {
    const REQUIRED_COLUMNS: &'static [&'static str] =
        &["product_id", "related_product_id", "related_type"];

    fn from_row(row: &mut RawRow<'_>) -> Option<Self> {
        let product_id = row.optional("product_id")?;
        let linked_product_id = row.optional("related_product_id")?;
        let raw_class = row.text("related_type").to_string();
        let Some(class) = LinkClass::parse(&raw_class) else {
            row.warn_unknown_link_class(&raw_class);
            return None;
        };
        // Links without a usable ordinal sort after the numbered ones.
        let ordinal = match row.quantity("sort_order") {
            None => u8::MAX,
            Some(n) => match u8::try_from(n) {
                Ok(ordinal) if (1..=5).contains(&ordinal) => ordinal,
                _ => {
                    row.warn_invalid("sort_order", format!("ordinal {n} is outside 1..=5"));
                    u8::MAX
                }
            },
        };
        Some(RelatedLink {
            product_id,
            linked_product_id,
            class,
            ordinal,
        })
    }
}
