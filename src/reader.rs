use crate::config::PAGE_TAG;
use crate::models::ArticleRecord;
use anyhow::{Context, Result};
use bzip2::read::BzDecoder;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::{BufReader, Read};
use tracing::{debug, warn};

/// Per-record predicates, evaluated before a record is yielded.
///
/// Title predicates run at `</title>`, before the text payload is captured,
/// so filtered records never allocate their body.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFilter {
    pub skip_categories: bool,
    pub skip_disambiguations: bool,
    pub skip_templates: bool,
    pub skip_wikipedia: bool,
    pub skip_redirects: bool,
    /// Minimum text length in characters; shorter records are skipped.
    pub min_chars: usize,
}

impl RecordFilter {
    pub fn accepts_title(&self, title: &str) -> bool {
        if self.skip_categories && title.starts_with("Category:") {
            return false;
        }
        // Does not catch every disambiguation page, only the suffixed ones
        if self.skip_disambiguations && title.ends_with("(disambiguation)") {
            return false;
        }
        if self.skip_templates && title.starts_with("Template:") {
            return false;
        }
        if self.skip_wikipedia && title.starts_with("Wikipedia:") {
            return false;
        }
        true
    }

    pub fn accepts_text(&self, text: &str) -> bool {
        if self.skip_redirects && is_redirect(text) {
            return false;
        }
        if self.min_chars > 0 && text.chars().count() < self.min_chars {
            return false;
        }
        true
    }
}

fn is_redirect(text: &str) -> bool {
    text.get(..9)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("#redirect"))
}

enum Capture {
    Idle,
    Title,
    Text,
}

/// Lazy, forward-only traversal of a MediaWiki export archive.
///
/// Pull-based: the consumer drives iteration and can stop at any point. Peak
/// memory stays bounded regardless of archive size; the shared event buffer
/// is cleared per event and at most one record's strings are alive at a time.
///
/// Records with a missing or undecodable text field are skipped with a debug
/// log, never surfaced as errors.
pub struct DumpReader {
    xml: Reader<BufReader<Box<dyn Read>>>,
    buf: Vec<u8>,
    filter: RecordFilter,
    record_tag: String,
    limit: Option<u64>,
    yielded: u64,
    done: bool,
}

impl std::fmt::Debug for DumpReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpReader")
            .field("filter", &self.filter)
            .field("record_tag", &self.record_tag)
            .field("limit", &self.limit)
            .field("yielded", &self.yielded)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl DumpReader {
    /// Opens a dump file, decompressing when `compressed` is set.
    pub fn open(path: &str, compressed: bool) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open dump at: {}", path))?;
        let stream: Box<dyn Read> = if compressed {
            Box::new(BzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Self::from_reader(stream))
    }

    /// Builds a reader over an arbitrary (uncompressed) XML byte stream.
    pub fn from_reader(stream: Box<dyn Read>) -> Self {
        Self {
            xml: Reader::from_reader(BufReader::new(stream)),
            buf: Vec::new(),
            filter: RecordFilter::default(),
            record_tag: PAGE_TAG.to_string(),
            limit: None,
            yielded: 0,
            done: false,
        }
    }

    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Element name holding one record. Matched on the XML local name, so a
    /// namespace prefix on the archive is configuration, not behavior.
    pub fn with_record_tag(mut self, tag: &str) -> Self {
        self.record_tag = tag.to_string();
        self
    }

    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

}

fn assemble(
    filter: &RecordFilter,
    title: &mut String,
    text: &mut Option<String>,
) -> Option<ArticleRecord> {
    if title.is_empty() {
        debug!("record missing title, skipping");
        return None;
    }
    let Some(body) = text.take() else {
        // This actually happens in real archives
        debug!(title = %title, "record missing text, skipping");
        return None;
    };
    if body.is_empty() {
        debug!(title = %title, "record has empty text, skipping");
        return None;
    }
    if !filter.accepts_text(&body) {
        debug!(title = %title, "record filtered on text");
        return None;
    }
    Some(ArticleRecord {
        title: std::mem::take(title),
        text: Some(body),
    })
}

impl Iterator for DumpReader {
    type Item = ArticleRecord;

    fn next(&mut self) -> Option<ArticleRecord> {
        if self.done {
            return None;
        }
        if let Some(limit) = self.limit {
            if self.yielded >= limit {
                self.done = true;
                return None;
            }
        }

        let mut title = String::new();
        let mut text: Option<String> = None;
        let mut in_record = false;
        let mut in_revision = false;
        let mut capture = Capture::Idle;
        let mut skip = false;

        loop {
            // Release the previous event's backing storage before parsing on
            self.buf.clear();
            match self.xml.read_event_into(&mut self.buf) {
                Ok(Event::Start(e)) => {
                    let name = e.local_name();
                    let name = name.as_ref();
                    if !in_record {
                        if name == self.record_tag.as_bytes() {
                            in_record = true;
                        }
                    } else if name == b"revision" {
                        in_revision = true;
                    } else if name == b"title" && !in_revision {
                        capture = Capture::Title;
                    } else if name == b"text" && in_revision && !skip {
                        text.get_or_insert_with(String::new);
                        capture = Capture::Text;
                    }
                }
                Ok(Event::Text(t)) => match t.unescape() {
                    Ok(chunk) => match capture {
                        Capture::Title => title.push_str(&chunk),
                        Capture::Text => {
                            if let Some(body) = text.as_mut() {
                                body.push_str(&chunk);
                            }
                        }
                        Capture::Idle => {}
                    },
                    Err(e) => {
                        if !matches!(capture, Capture::Idle) {
                            debug!(error = %e, title = %title, "undecodable field, skipping record");
                            skip = true;
                            capture = Capture::Idle;
                        }
                    }
                },
                Ok(Event::CData(t)) => {
                    if let Ok(chunk) = std::str::from_utf8(t.as_ref()) {
                        match capture {
                            Capture::Title => title.push_str(chunk),
                            Capture::Text => {
                                if let Some(body) = text.as_mut() {
                                    body.push_str(chunk);
                                }
                            }
                            Capture::Idle => {}
                        }
                    }
                }
                Ok(Event::End(e)) => {
                    let name = e.local_name();
                    let name = name.as_ref();
                    if name == self.record_tag.as_bytes() {
                        if in_record {
                            in_record = false;
                            if !skip {
                                if let Some(record) = assemble(&self.filter, &mut title, &mut text)
                                {
                                    self.yielded += 1;
                                    return Some(record);
                                }
                            }
                            title.clear();
                            text = None;
                            skip = false;
                        }
                    } else if name == b"revision" {
                        in_revision = false;
                    } else if name == b"title" {
                        capture = Capture::Idle;
                        if in_record && !in_revision && !self.filter.accepts_title(&title) {
                            debug!(title = %title, "record filtered on title");
                            skip = true;
                        }
                    } else if name == b"text" {
                        capture = Capture::Idle;
                    }
                }
                Ok(Event::Eof) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "XML parse error, terminating stream");
                    self.done = true;
                    return None;
                }
            }
        }
    }
}
