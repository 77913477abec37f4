use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One piece of the product body, in source column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionSegment {
    /// Source column the text came from, e.g. `"desc_detail2_mobile"`.
    pub field: String,
    pub text: String,
    /// `true` when the text came from a mobile-specific column.
    pub mobile: bool,
}

/// Where a tag name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagOrigin {
    /// Placeholder derived from the product key; the source carries no tag names.
    Provisional,
    /// Name taken from a curated tag master.
    Master,
    /// Leaf name of a resolved category path.
    Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub origin: TagOrigin,
}

impl Tag {
    #[must_use]
    pub fn new(name: impl Into<String>, origin: TagOrigin) -> Self {
        Self {
            name: name.into(),
            origin,
        }
    }

    #[must_use]
    pub fn is_provisional(&self) -> bool {
        self.origin == TagOrigin::Provisional
    }
}

/// Related-product handles, each list ordered by source ordinal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedProducts {
    pub cross_sell: Vec<String>,
    pub up_sell: Vec<String>,
}

/// A product with every cross-table reference resolved, ready to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledProduct {
    /// Zero-based row position in the product table. Output is sorted on this.
    pub position: usize,
    pub handle: String,
    pub title: String,
    pub body: Vec<DescriptionSegment>,
    /// Resolved category paths, root first, in `category_id1..5` order.
    pub category_paths: Vec<Vec<String>>,
    pub tags: Vec<Tag>,
    pub related: RelatedProducts,
    pub image_key: Option<String>,
    pub is_valid: bool,
    pub is_subscription: bool,
    pub google_shopping: bool,
    pub display_start: Option<NaiveDateTime>,
    pub display_end: Option<NaiveDateTime>,
    pub sale_start: Option<NaiveDateTime>,
    pub sale_end: Option<NaiveDateTime>,
}

impl AssembledProduct {
    /// Renders the body as HTML: one `<p>` per segment, mobile segments marked
    /// with `data-device="mobile"`. Segment text is passed through verbatim
    /// because the source columns already hold HTML fragments.
    #[must_use]
    pub fn body_html(&self) -> String {
        self.body
            .iter()
            .map(|segment| {
                if segment.mobile {
                    format!("<p data-device=\"mobile\">{}</p>", segment.text)
                } else {
                    format!("<p>{}</p>", segment.text)
                }
            })
            .collect()
    }

    /// Joins each path with `separator` and distinct paths with `joiner`,
    /// keeping first-seen order.
    #[must_use]
    pub fn category_string(&self, separator: &str, joiner: &str) -> String {
        let mut joined: Vec<String> = Vec::with_capacity(self.category_paths.len());
        for path in &self.category_paths {
            let rendered = path.join(separator);
            if !joined.contains(&rendered) {
                joined.push(rendered);
            }
        }
        joined.join(joiner)
    }

    #[must_use]
    pub fn tag_string(&self) -> String {
        self.tags
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Stock on hand for a variant. `Unknown` means the stock table had no row;
/// it is never collapsed to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "quantity", rename_all = "lowercase")]
pub enum InventoryQuantity {
    Known(i64),
    Unknown,
}

impl std::fmt::Display for InventoryQuantity {
    /// `Unknown` renders as an empty cell.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InventoryQuantity::Known(qty) => write!(f, "{qty}"),
            InventoryQuantity::Unknown => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantOption {
    pub name: String,
    pub value: String,
}

/// A purchasable variant derived from a product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub handle: String,
    /// `None` for the single default variant.
    pub option: Option<VariantOption>,
    pub sku: String,
    pub price: Option<Decimal>,
    /// Only set when the sale price is strictly below the display price.
    pub compare_at_price: Option<Decimal>,
    pub inventory: InventoryQuantity,
}
