mod common;

use common::fixtures::*;
use common::{TestResult, generate_pdf, generate_pdf_with};
use folio::{FolioError, PipelineBuilder, RenderConfig};
use serde_json::json;

#[test]
fn hello_world_is_one_text_show() -> TestResult {
    let tree = document(vec![page(vec![line(vec![
        word("Hello", "F3", 10_000, 5_000),
        space(1_000),
        word("World", "F3", 10_000, 5_200),
    ])])]);
    let pdf = generate_pdf(&tree)?;
    assert_eq!(pdf.page_count(), 1);

    let ops = pdf.operations(1)?;
    assert_eq!(ops.iter().filter(|o| o.operator == "Tm").count(), 1);
    let shows: Vec<_> = ops.iter().filter(|o| o.operator == "TJ").collect();
    assert_eq!(shows.len(), 1);
    let items = shows[0].operands[0].as_array()?;
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_str()?, b"Hello");
    assert_eq!(items[1].as_float()?, -100.0);
    assert_eq!(items[2].as_str()?, b"World");
    Ok(())
}

#[test]
fn pages_are_written_in_order() -> TestResult {
    let tree = document(vec![
        page(vec![line(vec![word("first", "F1", 12_000, 25_000)])]),
        page(vec![line(vec![word("second", "F2", 12_000, 35_000)])]),
    ]);
    let pdf = generate_pdf(&tree)?;
    assert_eq!(pdf.page_count(), 2);
    let second = pdf.operations(2)?;
    let font = second.iter().find(|o| o.operator == "Tf").ok_or("no font")?;
    assert_eq!(font.operands[0].as_name()?, b"F2");
    Ok(())
}

#[test]
fn escaped_text_survives_the_round_trip() -> TestResult {
    let tree = document(vec![page(vec![line(vec![word("(caf\u{e9})\\", "F1", 12_000, 40_000)])])]);
    let pdf = generate_pdf(&tree)?;
    let ops = pdf.operations(1)?;
    let show = ops.iter().find(|o| o.operator == "TJ").ok_or("no text")?;
    let items = show.operands[0].as_array()?;
    assert_eq!(items[0].as_str()?, b"(caf\xe9)\\");
    Ok(())
}

#[test]
fn curly_quotes_and_dashes_are_kept() -> TestResult {
    let tree = document(vec![page(vec![line(vec![
        word("don\u{2019}t", "F1", 12_000, 25_000),
        space(3_000),
        word("1\u{2013}2\u{20ac}", "F1", 12_000, 25_000),
    ])])]);
    let pdf = generate_pdf(&tree)?;
    let ops = pdf.operations(1)?;
    let show = ops.iter().find(|o| o.operator == "TJ").ok_or("no text")?;
    let items = show.operands[0].as_array()?;
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_str()?, b"don\x92t");
    assert_eq!(items[2].as_str()?, b"1\x962\x80");
    Ok(())
}

#[test]
fn default_circle_fills_once_without_stroking() -> TestResult {
    let markup = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100"><circle cx="50" cy="50" r="25"/></svg>"#;
    let tree = document(vec![page(vec![svg(markup, 100_000, 100_000)])]);
    let pdf = generate_pdf(&tree)?;
    let operators = pdf.operators(1)?;
    let fills = operators.iter().filter(|o| ["f", "f*", "B", "B*"].contains(&o.as_str())).count();
    assert_eq!(fills, 1);
    assert!(!operators.iter().any(|o| o == "S" || o == "s"));
    Ok(())
}

#[test]
fn single_stop_gradient_is_a_flat_color() -> TestResult {
    let markup = r##"<svg xmlns="http://www.w3.org/2000/svg" width="50" height="50">
        <defs><linearGradient id="g"><stop offset="0" stop-color="#00ff00"/></linearGradient></defs>
        <rect width="50" height="50" fill="url(#g)"/>
    </svg>"##;
    let tree = document(vec![page(vec![svg(markup, 50_000, 50_000)])]);
    let pdf = generate_pdf(&tree)?;
    let ops = pdf.operations(1)?;
    assert!(!ops.iter().any(|o| o.operator == "scn" || o.operator == "cs"));
    let fill = ops.iter().find(|o| o.operator == "rg").ok_or("no fill color")?;
    let components: Vec<f32> = fill.operands.iter().map(|o| o.as_float()).collect::<Result<_, _>>()?;
    assert_eq!(components, [0.0, 1.0, 0.0]);

    let catalog = pdf.doc.get_object(pdf.doc.trailer.get(b"Root")?.as_reference()?)?.as_dict()?;
    let pages = pdf.doc.get_object(catalog.get(b"Pages")?.as_reference()?)?.as_dict()?;
    let first = pdf.doc.get_object(pages.get(b"Kids")?.as_array()?[0].as_reference()?)?.as_dict()?;
    let resources = pdf.doc.get_object(first.get(b"Resources")?.as_reference()?)?.as_dict()?;
    assert!(resources.get(b"Pattern").is_err());
    Ok(())
}

#[test]
fn two_stop_gradient_registers_a_pattern() -> TestResult {
    let markup = r##"<svg xmlns="http://www.w3.org/2000/svg" width="50" height="50">
        <defs><linearGradient id="g"><stop offset="0" stop-color="red"/><stop offset="1" stop-color="blue"/></linearGradient></defs>
        <rect width="50" height="50" fill="url(#g)"/>
    </svg>"##;
    let tree = document(vec![page(vec![svg(markup, 50_000, 50_000)])]);
    let pdf = generate_pdf(&tree)?;
    let operators = pdf.operators(1)?;
    assert!(operators.iter().any(|o| o == "scn"));
    let patterns = pdf
        .doc
        .objects
        .values()
        .filter(|o| o.as_dict().is_ok_and(|d| d.get(b"PatternType").is_ok()))
        .count();
    assert_eq!(patterns, 1);
    Ok(())
}

#[test]
fn images_resolve_against_the_resource_directory() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut png = std::io::Cursor::new(Vec::new());
    image::RgbImage::from_pixel(4, 3, image::Rgb([200, 10, 10])).write_to(&mut png, image::ImageFormat::Png)?;
    std::fs::write(dir.path().join("dot.png"), png.into_inner())?;

    let tree = document(vec![page(vec![
        json!({"kind": "image", "width": 40000, "height": 30000, "source": "dot.png"}),
        json!({"kind": "image", "width": 40000, "height": 30000, "source": "dot.png"}),
    ])]);
    let pdf = generate_pdf_with(&tree, RenderConfig::default(), Some(dir.path()))?;
    let ops = pdf.operations(1)?;
    let draws: Vec<_> = ops.iter().filter(|o| o.operator == "Do").collect();
    assert_eq!(draws.len(), 2);
    assert_eq!(draws[0].operands[0].as_name()?, b"Im1");
    assert_eq!(draws[1].operands[0].as_name()?, b"Im1");
    Ok(())
}

#[test]
fn config_file_drives_the_pipeline() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("folio.json");
    std::fs::write(&config_path, r#"{"pdf_version": "1.4", "coalesce_text": false}"#)?;
    let config = RenderConfig::from_file(&config_path)?;

    let tree = document(vec![page(vec![line(vec![
        word("one", "F1", 10_000, 15_000),
        word("two", "F1", 10_000, 15_000),
    ])])]);
    let pdf = generate_pdf_with(&tree, config, None)?;
    assert!(pdf.bytes.starts_with(b"%PDF-1.4"));
    assert_eq!(pdf.operators(1)?.iter().filter(|o| *o == "Tm").count(), 2);
    Ok(())
}

#[test]
fn trees_round_trip_through_files() -> TestResult {
    common::init_logging();
    let dir = tempfile::tempdir()?;
    let tree_path = dir.path().join("tree.json");
    let out_path = dir.path().join("out.pdf");
    let tree = document(vec![page(vec![line(vec![word("file", "F4", 10_000, 24_000)])])]);
    std::fs::write(&tree_path, serde_json::to_string(&tree)?)?;

    PipelineBuilder::new()
        .with_resource_dir(folio::resource_base(&tree_path))
        .build()
        .generate_to_file(&tree_path, &out_path)?;
    let pdf = common::GeneratedPdf::from_bytes(std::fs::read(&out_path)?)?;
    assert_eq!(pdf.page_count(), 1);

    let missing = PipelineBuilder::new().build().generate_to_file(dir.path().join("absent.json"), &out_path);
    assert!(matches!(missing, Err(FolioError::Io(_))));
    Ok(())
}
