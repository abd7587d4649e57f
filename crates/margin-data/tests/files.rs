//! File round trips: catalog import from disk and CSV export to disk.

use std::fs;
use std::io::Write;
use std::time::Duration;

use margin_core::{
    analyze, CostResolution, Discount, MarginCalculator, PricingInput, SensitivityConfig, TaxSpec,
};
use margin_data::{
    write_pivot_file, write_raw_rows_file, CachedCatalog, CatalogColumns, CostSource, CsvFileSource,
    DataError,
};
use tempfile::{tempdir, NamedTempFile};

fn catalog_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn csv_source_loads_and_resolves() {
    let file = catalog_file("Produto,Custo\nSérum Vitamina C 30ml,\"32,50\"\n");
    let source = CsvFileSource::new(file.path(), CatalogColumns::new("Produto", "Custo"));

    let catalog = source.load().unwrap();
    assert_eq!(catalog.lookup("SERUM VITAMINA C 30ML").cost(), Some(32.5));
}

#[test]
fn empty_file_is_an_empty_source() {
    let file = catalog_file("product,unit_cost\n");
    let source = CsvFileSource::new(file.path(), CatalogColumns::default());

    assert!(matches!(source.load(), Err(DataError::EmptySource(_))));
}

#[test]
fn missing_file_degrades_to_unresolved() {
    let dir = tempdir().unwrap();
    let source = CsvFileSource::new(dir.path().join("absent.csv"), CatalogColumns::default());
    assert!(matches!(source.load(), Err(DataError::NotFound(_))));

    let mut cache = CachedCatalog::new(source, Duration::from_secs(60));
    let resolution = cache.lookup("anything");
    assert!(!resolution.is_known());

    // proceeds with cost 0 and a warning
    let analysis = analyze(
        &MarginCalculator::default(),
        &PricingInput::new(100.0),
        resolution,
        &SensitivityConfig::default(),
    )
    .unwrap();
    assert_eq!(analysis.result.unit_cost, 0.0);
    assert_eq!(analysis.warnings.len(), 1);
}

#[test]
fn cache_picks_up_file_created_after_a_failed_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("costs.csv");
    let mut cache = CachedCatalog::new(
        CsvFileSource::new(&path, CatalogColumns::default()),
        Duration::from_secs(60),
    );

    assert!(!cache.lookup("Widget").is_known());

    fs::write(&path, "product,unit_cost\nWidget,7\n").unwrap();
    assert_eq!(cache.lookup("widget"), CostResolution::known(7.0));
}

#[test]
fn exports_write_both_files() {
    let input = PricingInput::new(100.0)
        .with_discount(Discount::Percent(10.0))
        .with_tax(TaxSpec::Percent(5.0));
    let analysis = analyze(
        &MarginCalculator::default(),
        &input,
        CostResolution::known(30.0),
        &SensitivityConfig::default(),
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let raw_path = dir.path().join("sensitivity_raw.csv");
    let pivot_path = dir.path().join("sensitivity_pivot.csv");

    write_raw_rows_file(&raw_path, &analysis.grid.rows).unwrap();
    write_pivot_file(&pivot_path, &analysis.grid.pivot).unwrap();

    let raw = fs::read_to_string(&raw_path).unwrap();
    assert_eq!(raw.lines().count(), 26);
    assert!(raw.starts_with("discount_value,cost_multiplier,discount_label,cost_label,"));

    let pivot = fs::read_to_string(&pivot_path).unwrap();
    let mut lines = pivot.lines();
    assert_eq!(lines.next(), Some("discount,-10%,-5%,0%,+5%,+10%"));
    let row_labels: Vec<&str> = lines.map(|l| l.split(',').next().unwrap()).collect();
    assert_eq!(row_labels, ["5%", "8%", "10%", "12%", "15%"]);
}
