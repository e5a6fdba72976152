use crate::config::MAX_LINK_LEN;
use crate::models::CleanContext;
use crate::span::excerpt;
use tracing::warn;

const OPEN: &str = "[[";
const CLOSE: &str = "]]";

/// How a single `[[...]]` span was resolved.
enum Resolution {
    /// Replace the span with `text[from..to]`; the close token is `close_len`
    /// bytes wide.
    Label {
        from: usize,
        to: usize,
        close_len: usize,
    },
    /// More than one `|`: leave the bracketed text untouched and rescan the
    /// interior for nested links.
    Ambiguous,
    /// Unclosed, unbalanced, or overlong: leave everything in place and
    /// continue past the opening token.
    Skip,
}

/// Rewrites `[[target|label]]`-style links into their display text.
///
/// Link malformation is common in real dumps, so this pass never fails; spans
/// it cannot resolve are logged and left untouched.
pub fn resolve_links(text: &str, ctx: &CleanContext) -> String {
    let Some(first) = text.find(OPEN) else {
        return text.to_string();
    };

    let mut out = String::with_capacity(text.len());
    let mut emit = 0;
    let mut start = first;

    loop {
        let body_from = start + OPEN.len();

        let scan_from = match resolve_one(text, start, ctx) {
            Resolution::Label {
                from,
                to,
                close_len,
            } => {
                out.push_str(&text[emit..start]);
                out.push_str(&text[from..to]);
                emit = to + close_len;
                emit
            }
            Resolution::Ambiguous => {
                out.push_str(&text[emit..body_from]);
                emit = body_from;
                emit
            }
            // `emit` stays behind; the untouched span flows to the output
            // with the next push.
            Resolution::Skip => body_from,
        };

        match text[scan_from..].find(OPEN) {
            Some(rel) => start = scan_from + rel,
            None => break,
        }
    }

    out.push_str(&text[emit..]);
    out
}

fn resolve_one(text: &str, start: usize, ctx: &CleanContext) -> Resolution {
    let body_from = start + OPEN.len();
    let mut end = text[body_from..].find(CLOSE).map(|i| body_from + i);
    let mut close_len = CLOSE.len();

    // Real dumps contain links closed by a single stray `]`. When one occurs
    // before the first `]]` with no `[` in between, prefer it as the close.
    let probe_to = end.unwrap_or(text.len());
    if let Some(stray) = text[body_from..probe_to].find(']').map(|i| body_from + i) {
        if !text[body_from..stray].contains('[') {
            end = Some(stray);
            close_len = 1;
        }
    }

    let Some(mut end) = end else {
        warn!(
            title = ctx.title,
            excerpt = excerpt(text, start),
            "no closing tag found for link, skipping"
        );
        return Resolution::Skip;
    };

    // Same balance discipline as the span remover: each inner `[[` pushes the
    // real close further out.
    let mut pending = text[body_from..end].matches(OPEN).count();
    while pending > 0 {
        let resume = end + close_len;
        match text[resume..].find(CLOSE) {
            Some(rel) => {
                let next = resume + rel;
                pending -= 1;
                pending += text[resume..next].matches(OPEN).count();
                end = next;
                close_len = CLOSE.len();
            }
            None => {
                warn!(
                    title = ctx.title,
                    excerpt = excerpt(text, start),
                    "link appears improperly closed, skipping"
                );
                return Resolution::Skip;
            }
        }
    }

    if end - start > MAX_LINK_LEN {
        warn!(
            title = ctx.title,
            length = end - start,
            excerpt = excerpt(text, start),
            "link too long, skipping"
        );
        return Resolution::Skip;
    }

    let span = &text[start..end];
    match span.find('|') {
        None => Resolution::Label {
            from: body_from,
            to: end,
            close_len,
        },
        Some(pipe) if span[pipe + 1..].contains('|') => Resolution::Ambiguous,
        Some(pipe) => Resolution::Label {
            from: start + pipe + 1,
            to: end,
            close_len,
        },
    }
}
