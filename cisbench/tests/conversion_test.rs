use cisbench::converter_config::ConverterConfig;
use cisbench::export::{csv_exporter, json_exporter, xlsx_exporter};
use cisbench::segmentation::{ProfileLevel, SectionKind};
use cisbench::{convert_file, Benchmark};
use std::io::Read;
use std::path::{Path, PathBuf};

const PAGES: [&str; 5] = [
    "CIS Test Linux\nBenchmark\nv1.0.0 - 01-01-2025\nTerms of Use",
    "Table of Contents\nRecommendations ..... 3\n1.1.1 Ensure cramfs is disabled ..... 3",
    concat!(
        "Recommendations\n",
        "1 Initial Setup\n",
        "1.1.1 (L1) Ensure cramfs is disabled\n",
        "Profile Applicability:\n",
        "\u{2022} Level 1 - Server\n",
        "Description:\n",
        "The cramfs filesystem type\n",
        "is a compressed filesystem.\n",
        "Rationale:\n",
        "Removing support reduces the attack surface.\n",
        "Audit:\n",
        "Run modprobe -n -v cramfs\n",
        "Page 3",
    ),
    concat!(
        "Remediation:\n",
        "Edit the module configuration.\n",
        "CIS Controls:\n",
        "Controls Version 8\n",
        "1.1.2 (L2) Ensure /tmp is a separate\n",
        "partition\n",
        "Profile Applicability:\n",
        "\u{2022} Level 2 - Server\n",
        "Description:\n",
        "The /tmp directory is world-writable.\n",
        "References:\n",
        "See 1.1.1 for details\n",
        "Page 4",
    ),
    concat!(
        "1.1.3 Ensure nodev option set on /tmp\n",
        "Profile Applicability:\n",
        "\u{2022} Level 1\n",
        "Description:\n",
        "Set nodev.\n",
        "Appendix: Summary Table\n",
        "1.1.1 Ensure cramfs is disabled Yes",
    ),
];

fn write_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("sample_benchmark.txt");
    std::fs::write(&path, PAGES.join("\u{0c}")).unwrap();
    path
}

fn config() -> ConverterConfig {
    ConverterConfig {
        start_page: 1,
        ..ConverterConfig::default()
    }
}

fn convert_fixture(dir: &Path) -> Benchmark {
    convert_file(&write_fixture(dir), &config()).unwrap()
}

#[test]
fn test_text_fixture_converts() {
    let dir = tempfile::tempdir().unwrap();
    let benchmark = convert_fixture(dir.path());

    assert_eq!(
        benchmark.metadata.title.as_deref(),
        Some("CIS Test Linux Benchmark")
    );
    assert_eq!(
        benchmark.metadata.version.as_deref(),
        Some("v1.0.0 - 01-01-2025")
    );
    assert!(benchmark.warnings.is_empty(), "{:?}", benchmark.warnings);

    let numbers: Vec<String> = benchmark
        .recommendations
        .iter()
        .map(|r| r.number.to_string())
        .collect();
    assert_eq!(numbers, vec!["1.1.1", "1.1.2", "1.1.3"]);
}

#[test]
fn test_sections_span_pages_and_skip_controls() {
    let dir = tempfile::tempdir().unwrap();
    let benchmark = convert_fixture(dir.path());

    let first = benchmark.find("1.1.1").unwrap();
    assert_eq!(first.level, ProfileLevel::Tier(1));
    assert_eq!(first.title, "Ensure cramfs is disabled");
    assert_eq!(
        first.sections.text(SectionKind::Description),
        "The cramfs filesystem type is a compressed filesystem."
    );
    assert_eq!(
        first.sections.text(SectionKind::Remediation),
        "Edit the module configuration."
    );
    assert!(!first.sections.text(SectionKind::Remediation).contains("Controls"));
    assert!(!first.sections.text(SectionKind::Audit).contains("Page"));

    let second = benchmark.find("1.1.2").unwrap();
    assert_eq!(second.level, ProfileLevel::Tier(2));
    assert_eq!(second.title, "Ensure /tmp is a separate partition");
    assert_eq!(
        second.sections.text(SectionKind::References),
        "See 1.1.1 for details"
    );

    let third = benchmark.find("1.1.3").unwrap();
    assert_eq!(third.level, ProfileLevel::Unspecified);
    assert_eq!(third.sections.text(SectionKind::Description), "Set nodev.");
    assert!(!third.sections.text(SectionKind::Description).contains("Appendix"));
}

#[test]
fn test_start_page_past_end_yields_no_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path());
    let config = ConverterConfig {
        start_page: 40,
        ..ConverterConfig::default()
    };

    let benchmark = convert_file(&path, &config).unwrap();
    assert!(benchmark.is_empty());
    assert_eq!(
        benchmark.metadata.title.as_deref(),
        Some("CIS Test Linux Benchmark")
    );
}

#[test]
fn test_csv_export() {
    let dir = tempfile::tempdir().unwrap();
    let benchmark = convert_fixture(dir.path());
    let output = dir.path().join("out").join("bench.csv");

    csv_exporter::to_csv(&benchmark, &output).unwrap();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .from_path(&output)
        .unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();

    assert_eq!(&rows[0][0], "CIS Test Linux Benchmark");
    assert_eq!(&rows[1][0], "v1.0.0 - 01-01-2025");
    let header_idx = rows
        .iter()
        .position(|r| r.get(0) == Some("Compliance Status"))
        .unwrap();
    let data = &rows[header_idx + 1..];
    assert_eq!(data.len(), 3);
    assert_eq!(&data[1][1], "1.1.2");
    assert_eq!(&data[1][2], "L2");
    assert_eq!(&data[2][2], "");
    assert_eq!(&data[0][0], "To Review");
}

#[test]
fn test_json_export_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let benchmark = convert_fixture(dir.path());
    let output = dir.path().join("bench.json");

    json_exporter::to_json(&benchmark, &output).unwrap();

    let file = std::fs::File::open(&output).unwrap();
    let parsed = json_exporter::read_json(file).unwrap();
    assert_eq!(parsed.metadata, benchmark.metadata);
    assert_eq!(parsed.recommendations, benchmark.recommendations);
}

#[test]
fn test_xlsx_export() {
    let dir = tempfile::tempdir().unwrap();
    let benchmark = convert_fixture(dir.path());
    let output = dir.path().join("bench.xlsx");

    xlsx_exporter::to_xlsx(&benchmark, &output).unwrap();

    let file = std::fs::File::open(&output).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();

    let mut strings = String::new();
    archive
        .by_name("xl/sharedStrings.xml")
        .unwrap()
        .read_to_string(&mut strings)
        .unwrap();
    assert!(strings.contains("CIS Test Linux Benchmark"));
    assert!(strings.contains("Ensure /tmp is a separate partition"));

    let mut workbook = String::new();
    archive
        .by_name("xl/workbook.xml")
        .unwrap()
        .read_to_string(&mut workbook)
        .unwrap();
    assert!(workbook.contains(r#"name="Recommendations""#));

    let mut table = String::new();
    archive
        .by_name("xl/tables/table1.xml")
        .unwrap()
        .read_to_string(&mut table)
        .unwrap();
    assert!(table.contains(r#"ref="A4:M7""#));
}
