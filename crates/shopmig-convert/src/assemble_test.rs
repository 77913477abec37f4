use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shopmig_core::{ExportProfile, TagOrigin};

use super::*;
use crate::source::{CategoryNode, RelatedLink, TagAssociation};
use crate::tags::{MasterTagNamer, ProvisionalTagNamer};

fn product(id: &str) -> ProductRecord {
    ProductRecord {
        product_id: id.to_string(),
        name: format!("商品 {id}"),
        description: vec![
            ("catchcopy", "<b>新発売</b>".to_string()),
            ("outline", String::new()),
            ("outline_mobile", "スマホ向け".to_string()),
            ("desc_detail1", "詳細".to_string()),
        ],
        display_price: Some(Decimal::new(3000, 0)),
        sale_price: None,
        category_ids: vec![],
        related: vec![],
        display_start: None,
        display_end: None,
        sale_start: None,
        sale_end: None,
        variant_enabled: false,
        subscription: false,
        google_shopping: true,
        valid: true,
        image_key: Some(format!("{id}_main")),
    }
}

fn categories() -> CategoryTree {
    let nodes = vec![
        CategoryNode {
            category_id: "1".to_string(),
            parent_ref: "root".to_string(),
            name: "Skincare".to_string(),
            sort_order: None,
        },
        CategoryNode {
            category_id: "5".to_string(),
            parent_ref: "1".to_string(),
            name: "Serums".to_string(),
            sort_order: None,
        },
    ];
    CategoryTree::build(nodes, &ExportProfile::default()).unwrap().0
}

fn link(from: &str, to: &str, class: LinkClass, ordinal: u8) -> RelatedLink {
    RelatedLink {
        product_id: from.to_string(),
        linked_product_id: to.to_string(),
        class,
        ordinal,
    }
}

fn tag(product: &str, tag_id: &str) -> TagAssociation {
    TagAssociation {
        product_id: product.to_string(),
        tag_id: Some(tag_id.to_string()),
        associated_at: None,
    }
}

fn context(
    tags: Vec<TagAssociation>,
    related: Vec<RelatedLink>,
    namer: Box<dyn TagNamer>,
    known: &[&str],
) -> AssemblyContext {
    AssemblyContext {
        categories: categories(),
        references: ReferenceIndex::build(vec![], tags, related, vec![]).0,
        namer,
        known_products: known.iter().map(ToString::to_string).collect(),
    }
}

#[test]
fn resolves_category_path_and_leaf_tag() {
    let ctx = context(vec![], vec![], Box::new(ProvisionalTagNamer), &["A001"]);
    let mut record = product("A001");
    record.category_ids = vec!["5".to_string()];

    let (assembled, warnings) = assemble_product(0, &record, &ctx);

    assert!(warnings.is_empty());
    assert_eq!(
        assembled.category_paths,
        vec![vec!["Skincare".to_string(), "Serums".to_string()]]
    );
    assert_eq!(assembled.category_string("/", " | "), "Skincare/Serums");
    assert_eq!(assembled.tags.len(), 1);
    assert_eq!(assembled.tags[0].name, "Serums");
    assert_eq!(assembled.tags[0].origin, TagOrigin::Category);
}

#[test]
fn unresolved_category_is_skipped_with_warning() {
    let ctx = context(vec![], vec![], Box::new(ProvisionalTagNamer), &["A001"]);
    let mut record = product("A001");
    record.category_ids = vec!["99".to_string(), "1".to_string()];

    let (assembled, warnings) = assemble_product(0, &record, &ctx);

    assert_eq!(assembled.category_paths, vec![vec!["Skincare".to_string()]]);
    assert_eq!(
        warnings,
        vec![ReferenceWarning::UnresolvedCategory {
            product_id: "A001".to_string(),
            category_id: "99".to_string(),
        }]
    );
}

#[test]
fn body_skips_empty_cells_and_marks_mobile_segments() {
    let ctx = context(vec![], vec![], Box::new(ProvisionalTagNamer), &["A001"]);
    let (assembled, _) = assemble_product(0, &product("A001"), &ctx);

    let fields: Vec<&str> = assembled.body.iter().map(|s| s.field.as_str()).collect();
    assert_eq!(fields, ["catchcopy", "outline_mobile", "desc_detail1"]);
    assert_eq!(
        assembled.body_html(),
        "<p><b>新発売</b></p><p data-device=\"mobile\">スマホ向け</p><p>詳細</p>"
    );
}

#[test]
fn provisional_tags_are_counted_in_one_warning() {
    let ctx = context(
        vec![tag("A001", "10"), tag("A001", "11")],
        vec![],
        Box::new(ProvisionalTagNamer),
        &["A001"],
    );
    let (assembled, warnings) = assemble_product(0, &product("A001"), &ctx);

    // Both associations map to the same placeholder, which collapses.
    assert_eq!(assembled.tag_string(), "provisional-tag:A001");
    assert_eq!(
        warnings,
        vec![ReferenceWarning::ProvisionalTags {
            product_id: "A001".to_string(),
            count: 2,
        }]
    );
}

#[test]
fn master_names_replace_placeholders() {
    let names = BTreeMap::from([("10".to_string(), "Organic".to_string())]);
    let ctx = context(
        vec![tag("A001", "10")],
        vec![],
        Box::new(MasterTagNamer::new(names)),
        &["A001"],
    );
    let (assembled, warnings) = assemble_product(0, &product("A001"), &ctx);

    assert_eq!(assembled.tag_string(), "Organic");
    assert!(warnings.is_empty());
}

#[test]
fn related_links_drop_unknown_targets() {
    let ctx = context(
        vec![],
        vec![
            link("A001", "A002", LinkClass::CrossSell, 1),
            link("A001", "Z999", LinkClass::CrossSell, 2),
            link("A001", "A003", LinkClass::UpSell, 1),
        ],
        Box::new(ProvisionalTagNamer),
        &["A001", "A002", "A003"],
    );
    let (assembled, warnings) = assemble_product(0, &product("A001"), &ctx);

    assert_eq!(assembled.related.cross_sell, ["A002"]);
    assert_eq!(assembled.related.up_sell, ["A003"]);
    assert_eq!(
        warnings,
        vec![ReferenceWarning::UnknownLinkedProduct {
            product_id: "A001".to_string(),
            linked_product_id: "Z999".to_string(),
        }]
    );
}

#[test]
fn related_links_are_capped_per_class() {
    let known: Vec<String> = (1..=8).map(|n| format!("B{n:03}")).collect();
    let mut known_refs: Vec<&str> = known.iter().map(String::as_str).collect();
    known_refs.push("A001");
    let links = (1u8..=7)
        .map(|n| link("A001", &format!("B{n:03}"), LinkClass::UpSell, n))
        .collect();
    let ctx = context(vec![], links, Box::new(ProvisionalTagNamer), &known_refs);

    let (assembled, warnings) = assemble_product(0, &product("A001"), &ctx);

    assert_eq!(
        assembled.related.up_sell,
        ["B001", "B002", "B003", "B004", "B005"]
    );
    assert_eq!(
        warnings,
        vec![ReferenceWarning::RelatedTruncated {
            product_id: "A001".to_string(),
            class: LinkClass::UpSell,
            dropped: 2,
        }]
    );
}

#[test]
fn copies_row_attributes_and_position() {
    let ctx = context(vec![], vec![], Box::new(ProvisionalTagNamer), &["A001"]);
    let mut record = product("A001");
    record.valid = false;

    let (assembled, _) = assemble_product(7, &record, &ctx);

    assert_eq!(assembled.position, 7);
    assert_eq!(assembled.handle, "A001");
    assert_eq!(assembled.title, "商品 A001");
    assert_eq!(assembled.image_key.as_deref(), Some("A001_main"));
    assert!(!assembled.is_valid);
    assert!(assembled.google_shopping);
}
