use memchr::memchr;
use once_cell::sync::Lazy;
use regex::Regex;

/// Boilerplate trailing sections. Matched while heading markers are still
/// intact, so truncation must run before heading stripping.
static TRAILING_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^==[ \t]*(?:see also|references|external links)[ \t]*==[ \t]*$")
        .expect("valid regex")
});

/// Iterator over lines that keeps the trailing `\n` on each item.
///
/// Every line-structure filter is a map/filter over this shape, including the
/// final line whether or not it carries a newline.
pub(crate) struct LinesInclusive<'a> {
    rest: &'a str,
}

pub(crate) fn lines_inclusive(text: &str) -> LinesInclusive<'_> {
    LinesInclusive { rest: text }
}

impl<'a> Iterator for LinesInclusive<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        match memchr(b'\n', self.rest.as_bytes()) {
            Some(i) => {
                let (line, rest) = self.rest.split_at(i + 1);
                self.rest = rest;
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = "";
                Some(line)
            }
        }
    }
}

fn split_newline(line: &str) -> (&str, &str) {
    match line.strip_suffix('\n') {
        Some(body) => (body, "\n"),
        None => (line, ""),
    }
}

/// Truncates everything from the first boilerplate heading ("See also",
/// "References", "External links") onward; text before it is untouched.
pub fn cut_trailing_sections(text: &str) -> &str {
    match TRAILING_SECTION.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}

/// Replaces `=`-delimited heading lines by their textual content, or deletes
/// them outright when `delete` is set. The leading `=`-run length gives the
/// level; the same count is stripped from both ends.
pub fn strip_headings(text: &str, delete: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for line in lines_inclusive(text) {
        let (body, newline) = split_newline(line);
        if !(body.starts_with('=') && body.ends_with('=')) {
            out.push_str(line);
            continue;
        }
        if delete {
            continue;
        }
        let level = body.bytes().take_while(|&b| b == b'=').count();
        out.push_str(strip_marks(body, level));
        out.push_str(newline);
    }
    out
}

fn strip_marks(body: &str, level: usize) -> &str {
    let inner = &body[level..];
    let count = inner.chars().count();
    if count <= level {
        return "";
    }
    let cut = inner
        .char_indices()
        .nth(count - level)
        .map_or(inner.len(), |(i, _)| i);
    inner[..cut].trim()
}

/// Strips list-item and indentation prefixes (`*`, `#`, `:`, repeated for
/// nesting depth — the depth is discarded), or deletes the lines entirely.
pub fn strip_list_markers(text: &str, delete: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for line in lines_inclusive(text) {
        let (body, newline) = split_newline(line);
        if !starts_with_marker(body) {
            out.push_str(line);
            continue;
        }
        if delete {
            continue;
        }
        let mut item = body;
        while starts_with_marker(item) {
            item = item[1..].trim_start();
        }
        out.push_str(item);
        out.push_str(newline);
    }
    out
}

fn starts_with_marker(s: &str) -> bool {
    matches!(s.as_bytes().first(), Some(b'*' | b'#' | b':'))
}

/// Deletes table-row lines: first non-space character is `|`.
pub fn drop_table_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in lines_inclusive(text) {
        let first = line.bytes().find(|&b| b != b' ');
        if first == Some(b'|') {
            continue;
        }
        out.push_str(line);
    }
    out
}

/// Deletes definition-list lines: first character is `;`.
pub fn drop_definition_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in lines_inclusive(text) {
        if line.starts_with(';') {
            continue;
        }
        out.push_str(line);
    }
    out
}

/// Collapses runs of blank lines by capping consecutive newlines at
/// `max_run`: 1 removes every blank line, 2 keeps single blank lines.
pub fn collapse_blank_lines(text: &str, max_run: usize) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut prev = 0usize;
    let mut next = memchr(b'\n', bytes);
    let mut run = 0usize;

    while let Some(pos) = next {
        if pos - prev != 1 {
            out.push_str(&text[prev..pos]);
            run = 1;
        } else {
            run += 1;
            if run <= max_run {
                out.push_str(&text[prev..pos]);
            }
        }
        prev = pos;
        next = memchr(b'\n', &bytes[pos + 1..]).map(|i| pos + 1 + i);
    }
    out.push_str(&text[prev..]);
    out
}
