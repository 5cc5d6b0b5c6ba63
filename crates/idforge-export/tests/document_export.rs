use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use idforge_core::{Carrier, GeneratorContext, GeneratorRegistry, generate_batch, generate_sim};
use idforge_export::document::document_file_name;
use idforge_export::output::write_batch;
use idforge_export::{
    CellContent, Document, ExportError, Symbology, export_document, parse_text_list,
    write_document,
};

fn values(count: usize) -> Vec<String> {
    (0..count).map(|idx| format!("P{idx:08}")).collect()
}

#[test]
fn paginates_ten_items_per_page_in_two_columns() {
    let doc = export_document(&values(23), Symbology::Code128, "RSA Passport Numbers")
        .expect("document");
    assert_eq!(doc.pages.len(), 3);
    assert_eq!(doc.pages[0].cells.len(), 10);
    assert_eq!(doc.pages[2].cells.len(), 3);
    assert!(doc.pages.iter().all(|page| page.title == "RSA Passport Numbers"));
    assert_eq!(doc.item_count(), 23);
    assert_eq!(doc.error_count(), 0);

    let first = &doc.pages[0].cells[0];
    assert_eq!((first.column, first.row), (0, 0));
    assert_eq!((first.x_mm, first.y_mm), (15.0, 30.0));

    let second = &doc.pages[0].cells[1];
    assert_eq!((second.column, second.row), (1, 0));
    assert_eq!(second.x_mm, 15.0 + 105.0 - 11.25);

    let last_on_page = &doc.pages[0].cells[9];
    assert_eq!((last_on_page.column, last_on_page.row), (1, 4));
    assert_eq!(last_on_page.y_mm, 30.0 + 4.0 * 40.0);

    let next_page = &doc.pages[1].cells[0];
    assert_eq!(next_page.index, 10);
    assert_eq!((next_page.x_mm, next_page.y_mm), (15.0, 30.0));
}

#[test]
fn values_reach_the_rasterizer_unmodified() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let items: Vec<String> = (0..5).map(|_| generate_sim(Carrier::Mtn, &mut rng)).collect();
    let doc = export_document(&items, Symbology::Code128, "MTN SIM Numbers").expect("document");
    for (cell, item) in doc.cells().zip(&items) {
        match &cell.content {
            CellContent::Barcode {
                payload, caption, ..
            } => {
                assert_eq!(payload, item);
                assert_eq!(caption, item);
            }
            CellContent::Error { message } => panic!("unexpected error cell: {message}"),
        }
    }
}

#[test]
fn rejected_items_become_error_cells() {
    let items = vec![
        "123456789".to_string(),
        "abc-123".to_string(),
        "TEST-DATA".to_string(),
    ];
    let doc = export_document(&items, Symbology::Code39, "Generated Barcodes").expect("document");
    assert_eq!(doc.item_count(), 3);
    assert_eq!(doc.error_count(), 1);
    let cell = doc.cells().nth(1).expect("second cell");
    assert_eq!(
        cell.content,
        CellContent::Error {
            message: "Error generating barcode for: abc-123".to_string()
        }
    );
}

#[test]
fn symbology_character_sets() {
    assert!(Symbology::Code128.check("+27821234567").is_ok());
    assert!(Symbology::Code128.check("naïve").is_err());
    assert!(Symbology::Code128.check("").is_err());
    assert!(Symbology::Code39.check("P12345678").is_ok());
    assert!(Symbology::Code39.check("p12345678").is_err());
    assert!(Symbology::Ean13.check("400638133393").is_ok());
    assert!(Symbology::Ean13.check("4006381333931").is_ok());
    assert!(Symbology::Ean13.check("4006381333932").is_err());
    assert!(Symbology::Ean13.check("8001015009087").is_err());
    assert!(Symbology::Ean13.check("+27821234567").is_err());
    assert_eq!(
        Symbology::Ean13.encoded_payload("400638133393").as_deref(),
        Ok("4006381333931")
    );
    assert_eq!("ean-13".parse::<Symbology>(), Ok(Symbology::Ean13));
}

#[test]
fn empty_export_is_rejected() {
    let result = export_document(&[], Symbology::Code128, "Empty");
    assert!(matches!(result, Err(ExportError::Invalid(_))));
}

#[test]
fn file_name_follows_title() {
    assert_eq!(document_file_name("RSA ID Numbers"), "rsa_id_numbers.json");
    assert_eq!(document_file_name("Mixed  Carrier SIMs"), "mixed__carrier_sims.json");
}

#[test]
fn document_round_trips_through_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let items = parse_text_list("123456789\nABC-123\nTEST-DATA");
    let doc = export_document(&items, Symbology::Code128, "Generated Barcodes").expect("document");
    let path = write_document(dir.path(), &doc).expect("written");
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("generated_barcodes.json"));

    let content = std::fs::read_to_string(&path).expect("readable");
    let decoded: Document = serde_json::from_str(&content).expect("valid json");
    assert_eq!(decoded, doc);
}

#[test]
fn batch_output_writes_csv_and_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = GeneratorRegistry::new();
    let ctx = GeneratorContext { current_year: 2026 };
    let params = serde_json::json!({"carriers": ["Vodacom", "MTN"]});
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let items =
        generate_batch(&registry, "rsa.sim", &ctx, Some(&params), 5, &mut rng).expect("batch");

    let csv_path = dir.path().join("sims.csv");
    let bytes = write_batch(&csv_path, &items).expect("csv");
    let content = std::fs::read_to_string(&csv_path).expect("readable");
    assert_eq!(bytes, content.len() as u64);
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "scheme,label,value");
    assert_eq!(lines.len(), 6);
    assert!(lines[1].starts_with("sim,"));

    let json_path = dir.path().join("sims.json");
    write_batch(&json_path, &items).expect("json");
    let decoded: Vec<idforge_core::GeneratedId> =
        serde_json::from_str(&std::fs::read_to_string(&json_path).expect("readable"))
            .expect("valid json");
    assert_eq!(decoded, items);
}
