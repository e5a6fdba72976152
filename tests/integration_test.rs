//! Integration tests for the Icarus extraction pipeline.
//!
//! These tests cover the complete data flow from BZ2-compressed XML input
//! through to cleaned plain text:
//!
//! - **Reader Tests** -- BZ2 decompression, record iteration, filters, limits
//! - **Pipeline Tests** -- end-to-end cleaning of streamed articles
//!
//! # Test Strategy
//!
//! All tests use a shared `sample_xml()` fixture representing a minimal
//! Wikipedia dump with articles, a redirect, and special pages. Fixtures are
//! compressed with `create_bz2_xml()` into a NamedTempFile, matching the real
//! dump format.

use bzip2::write::BzEncoder;
use bzip2::Compression;
use icarus::clean::{clean, CleanOptions};
use icarus::reader::{DumpReader, RecordFilter};
use std::io::Write;
use tempfile::NamedTempFile;

/// Helper: create a BZ2-compressed XML file from a string and return the temp
/// file handle. The returned NamedTempFile keeps the file alive until it goes
/// out of scope.
fn create_bz2_xml(xml: &str) -> NamedTempFile {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(xml.as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(&compressed).unwrap();
    tmp.flush().unwrap();
    tmp
}

fn open_dump(tmp: &NamedTempFile) -> DumpReader {
    DumpReader::open(tmp.path().to_str().unwrap(), true).unwrap()
}

/// Sample Wikipedia XML with two articles, a redirect, a category page, and a
/// record with no text payload.
fn sample_xml() -> &'static str {
    r#"<mediawiki>
        <page>
            <title>Rust (programming language)</title>
            <ns>0</ns>
            <id>1</id>
            <revision>
                <id>100</id>
                <timestamp>2024-01-15T10:30:00Z</timestamp>
                <text>{{Infobox programming language
| name = Rust
| designer = Graydon Hoare
}}
'''Rust''' is a [[systems programming|systems]] language.&lt;ref&gt;cite&lt;/ref&gt;

[[File:Rust logo.svg|thumb|The Rust logo]]

== History ==
Rust was announced in 2010.

== See also ==
* [[Python (programming language)]]

[[Category:Programming languages]]</text>
            </revision>
        </page>
        <page>
            <title>Python (programming language)</title>
            <ns>0</ns>
            <id>2</id>
            <revision>
                <id>200</id>
                <text>Python is a high-level language. Related: [[Rust (programming language)]].

[[Category:Programming languages]]</text>
            </revision>
        </page>
        <page>
            <title>Rust</title>
            <ns>0</ns>
            <id>3</id>
            <redirect title="Rust (programming language)" />
            <revision>
                <id>300</id>
                <text>#REDIRECT [[Rust (programming language)]]</text>
            </revision>
        </page>
        <page>
            <title>Category:Programming languages</title>
            <ns>14</ns>
            <id>4</id>
            <revision>
                <id>400</id>
                <text>Pages about programming languages.</text>
            </revision>
        </page>
        <page>
            <title>No text here</title>
            <ns>0</ns>
            <id>5</id>
            <revision>
                <id>500</id>
            </revision>
        </page>
    </mediawiki>"#
}

// ============================================================================
// Reader Tests
// ============================================================================

#[test]
fn reads_all_records_with_text_from_bz2() {
    let tmp = create_bz2_xml(sample_xml());
    let titles: Vec<String> = open_dump(&tmp).map(|r| r.title).collect();

    // "No text here" has no text payload and is dropped
    assert_eq!(
        titles,
        vec![
            "Rust (programming language)",
            "Python (programming language)",
            "Rust",
            "Category:Programming languages",
        ]
    );
}

#[test]
fn filters_reduce_yielded_records() {
    let tmp = create_bz2_xml(sample_xml());
    let filter = RecordFilter {
        skip_categories: true,
        skip_redirects: true,
        ..RecordFilter::default()
    };
    let titles: Vec<String> = open_dump(&tmp).with_filter(filter).map(|r| r.title).collect();

    assert_eq!(
        titles,
        vec!["Rust (programming language)", "Python (programming language)"]
    );
}

#[test]
fn limit_caps_the_stream() {
    let tmp = create_bz2_xml(sample_xml());
    let records: Vec<_> = open_dump(&tmp).with_limit(Some(1)).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Rust (programming language)");
}

#[test]
fn min_chars_filters_short_articles() {
    let tmp = create_bz2_xml(sample_xml());
    let filter = RecordFilter {
        min_chars: 150,
        ..RecordFilter::default()
    };
    let titles: Vec<String> = open_dump(&tmp).with_filter(filter).map(|r| r.title).collect();

    // Only the Rust article carries that much wikitext
    assert_eq!(titles, vec!["Rust (programming language)"]);
}

#[test]
fn reader_is_lazy() {
    let tmp = create_bz2_xml(sample_xml());
    // Pulling one record must not consume the rest of the archive
    let mut reader = open_dump(&tmp);
    let first = reader.next().unwrap();
    assert_eq!(first.title, "Rust (programming language)");
    let remaining = reader.count();
    assert_eq!(remaining, 3);
}

#[test]
fn open_fails_on_missing_file() {
    let err = DumpReader::open("/nonexistent/dump.xml.bz2", true).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/dump.xml.bz2"));
}

// ============================================================================
// Pipeline Tests
// ============================================================================

#[test]
fn end_to_end_extraction_and_cleaning() {
    let tmp = create_bz2_xml(sample_xml());
    let filter = RecordFilter {
        skip_categories: true,
        skip_redirects: true,
        ..RecordFilter::default()
    };
    let opts = CleanOptions::default();

    let cleaned: Vec<(String, String)> = open_dump(&tmp)
        .with_filter(filter)
        .map(|r| {
            let text = clean(r.text.as_deref().unwrap(), &r.title, &opts).unwrap();
            (r.title, text)
        })
        .collect();

    assert_eq!(cleaned.len(), 2);

    // Infobox, ref, file embed, emphasis, headings and the trailing sections
    // are all gone; the piped link keeps its label.
    assert_eq!(cleaned[0].0, "Rust (programming language)");
    assert_eq!(
        cleaned[0].1,
        "\nRust is a systems language.\nHistory\nRust was announced in 2010.\n"
    );

    assert_eq!(cleaned[1].0, "Python (programming language)");
    assert_eq!(
        cleaned[1].1,
        "Python is a high-level language. Related: Rust (programming language).\n"
    );
}

#[test]
fn strict_mode_reports_article_title() {
    let xml = r#"<mediawiki>
        <page>
            <title>Broken markup</title>
            <revision>
                <text>before {{never closed template</text>
            </revision>
        </page>
    </mediawiki>"#;
    let tmp = create_bz2_xml(xml);
    let record = open_dump(&tmp).next().unwrap();

    let opts = CleanOptions {
        strict: true,
        ..CleanOptions::default()
    };
    let err = clean(record.text.as_deref().unwrap(), &record.title, &opts).unwrap_err();
    assert!(err.to_string().contains("Broken markup"));

    // The same article survives in lenient mode
    let lenient = clean(
        record.text.as_deref().unwrap(),
        &record.title,
        &CleanOptions::default(),
    )
    .unwrap();
    assert!(lenient.contains("before"));
}
