//! End-to-end runs over Shift_JIS fixture directories.

use std::path::Path;

use encoding_rs::SHIFT_JIS;
use shopmig_convert::{run, write_outputs, ConvertError, SourceTables};
use shopmig_core::ExportProfile;

const PRODUCT_HEADER: &str = "product_id,name,catchcopy,outline,\
display_price,display_special_price,category_id1,category_id2,\
cross_sell_product_id1,variation_flg,valid_flg,image_head";

fn write_sjis(dir: &Path, name: &str, text: &str) {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(text);
    assert!(!had_errors, "fixture must be representable in Shift_JIS");
    std::fs::write(dir.join(name), bytes).unwrap();
}

fn write_fixture(dir: &Path) {
    write_sjis(
        dir,
        "Product20251211.csv",
        &format!(
            "{PRODUCT_HEADER}\n\
             A001,ビタミンC美容液,透明感,毎日のケアに,3000,2500,5,,A002,0,1,a001\n\
             A002,化粧水,,,\"1,800\",1800,6,5,,0,1,\n\
             A003,旧商品,,,1200,,99,,Z999,1,0,a003\n"
        ),
    );
    write_sjis(
        dir,
        "ProductCategory20251211.csv",
        "category_id,parent_category_id,name,sort_order\n\
         1,root,スキンケア,1\n\
         5,1,美容液,2\n\
         6,1,化粧水,1\n",
    );
    write_sjis(
        dir,
        "ProductStock20251211.csv",
        "product_id,product_variation_id,stock\n\
         A001,,12\n\
         A002,A002,0\n",
    );
    write_sjis(
        dir,
        "ProductRelated20251211.csv",
        "product_id,related_product_id,related_type,sort_order\n\
         A001,A003,UP_SELL,1\n\
         A002,A001,cross,1\n\
         A002,X404,2,2\n\
         A003,A001,7,1\n",
    );
    // Header only: the tag table is empty in the real export.
    write_sjis(dir, "ProductTag20251211.csv", "product_id,tag_id,created_at\n");
}

fn convert(input: &Path, output: &Path) -> Result<(String, String), ConvertError> {
    let profile = ExportProfile::default();
    let sources = SourceTables::load(input, &profile)?;
    let result = run(sources, &profile)?;
    let products_path = output.join("matrixify_products.csv");
    let variants_path = output.join("matrixify_variants.csv");
    write_outputs(
        &products_path,
        &variants_path,
        &result.products,
        &result.variants,
        &profile,
    )?;
    Ok((
        std::fs::read_to_string(products_path).unwrap(),
        std::fs::read_to_string(variants_path).unwrap(),
    ))
}

#[test]
fn converts_fixture_export() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_fixture(input.path());

    let (products, variants) = convert(input.path(), output.path()).unwrap();

    let product_lines: Vec<&str> = products.lines().collect();
    assert_eq!(product_lines.len(), 4);
    assert!(product_lines[1]
        .starts_with("A001,ビタミンC美容液,<p>透明感</p><p>毎日のケアに</p>,yumejin,active,TRUE,"));
    assert!(product_lines[1].contains(
        ",スキンケア/美容液,美容液,https://www.example.com/images/products/a001.jpg,A002,A003,"
    ));
    assert!(product_lines[2].contains(",A001,,"));
    assert!(product_lines[2].contains("スキンケア/化粧水 | スキンケア/美容液"));
    assert!(product_lines[3].contains(",draft,FALSE,"));

    let variant_lines: Vec<&str> = variants.lines().collect();
    assert_eq!(variant_lines.len(), 4);
    assert_eq!(variant_lines[1], "A001,,,A001,3000,2500,12,TRUE,TRUE");
    assert_eq!(variant_lines[2], "A002,,,A002,1800,,0,TRUE,TRUE");
    assert_eq!(variant_lines[3], "A003,,,A003,1200,,,TRUE,TRUE");
}

#[test]
fn report_collects_reference_warnings() {
    let input = tempfile::tempdir().unwrap();
    write_fixture(input.path());
    let profile = ExportProfile::default();

    let result = run(SourceTables::load(input.path(), &profile).unwrap(), &profile).unwrap();
    let counts = result.report.counts_by_kind();

    assert_eq!(result.report.products, 3);
    assert_eq!(result.report.variants, 3);
    assert_eq!(counts.get("unresolved_category"), Some(&1));
    assert_eq!(counts.get("unknown_linked_product"), Some(&2));
    assert_eq!(counts.get("unknown_link_class"), Some(&1));
    assert_eq!(counts.get("missing_stock"), Some(&1));
    assert_eq!(counts.get("variant_data_missing"), Some(&1));
    assert!(counts.get("provisional_tags").is_none());

    let json: serde_json::Value =
        serde_json::from_str(&result.report.render_json().unwrap()).unwrap();
    assert_eq!(json["products"], 3);
    assert!(result.report.render_text().starts_with("conversion report\nproducts: 3\n"));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let input = tempfile::tempdir().unwrap();
    write_fixture(input.path());
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    let a = convert(input.path(), first.path()).unwrap();
    let b = convert(input.path(), second.path()).unwrap();

    assert_eq!(a, b);
}

#[test]
fn missing_tables_still_produce_headers() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    let (products, variants) = convert(input.path(), output.path()).unwrap();

    assert_eq!(products.lines().count(), 1);
    assert_eq!(variants.lines().count(), 1);
}

#[test]
fn category_cycle_aborts_before_any_output() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_fixture(input.path());
    write_sjis(
        input.path(),
        "ProductCategory20251211.csv",
        "category_id,parent_category_id,name\n3,4,A\n4,3,B\n",
    );

    let err = convert(input.path(), output.path()).unwrap_err();

    assert!(matches!(err, ConvertError::Cycle { .. }));
    assert!(!output.path().join("matrixify_products.csv").exists());
    assert!(!output.path().join("matrixify_variants.csv").exists());
}

#[test]
fn invalid_shift_jis_aborts_with_location() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_fixture(input.path());
    std::fs::write(
        input.path().join("ProductStock20251211.csv"),
        b"product_id,stock\nA001,\x82\x20\n",
    )
    .unwrap();

    let err = convert(input.path(), output.path()).unwrap_err();

    match err {
        ConvertError::Decode { table, line, .. } => {
            assert_eq!(table, "ProductStock");
            assert_eq!(line, 2);
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}
