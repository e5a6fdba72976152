use crate::config::EXCERPT_LEN;
use crate::error::CleanError;
use crate::models::CleanContext;
use tracing::warn;

/// An open/close delimiter pair with optional alternate spellings.
///
/// Immutable value type; every structural pass is `remove_spans` instantiated
/// with one of these.
#[derive(Debug, Clone, Copy)]
pub struct DelimiterSpec {
    pub open: &'static str,
    pub close: &'static str,
    /// Token counted toward nesting inside a span. Defaults to `open`; set it
    /// when inner spans open with a shorter spelling, e.g. bare `[[` links
    /// inside a `[[File:` embed caption.
    pub alt_open: Option<&'static str>,
    /// Fallback close, preferred when it occurs strictly before `close` or
    /// when `close` is missing, e.g. `/>` for `<ref name=...` tags.
    pub alt_close: Option<&'static str>,
}

impl DelimiterSpec {
    pub const fn pair(open: &'static str, close: &'static str) -> Self {
        Self {
            open,
            close,
            alt_open: None,
            alt_close: None,
        }
    }

    pub const fn with_alt_open(mut self, alt_open: &'static str) -> Self {
        self.alt_open = Some(alt_open);
        self
    }

    pub const fn with_alt_close(mut self, alt_close: &'static str) -> Self {
        self.alt_close = Some(alt_close);
        self
    }

    fn nest_token(&self) -> &'static str {
        self.alt_open.unwrap_or(self.open)
    }
}

/// Deletes every correctly-nested `spec` span from `text`.
///
/// Output is accumulated incrementally and scanning resumes after each deleted
/// range in the original text, so the pass is linear-amortized regardless of
/// how many spans are removed.
///
/// An unclosed span either fails the article (`fail_on_unclosed`) or is
/// recovered by deleting the opening delimiter alone and scanning on, which
/// guarantees forward progress on arbitrarily unbalanced input.
pub fn remove_spans(
    text: &str,
    spec: &DelimiterSpec,
    fail_on_unclosed: bool,
    ctx: &CleanContext,
) -> Result<String, CleanError> {
    let Some(first) = text.find(spec.open) else {
        return Ok(text.to_string());
    };

    let mut out = String::with_capacity(text.len());
    let mut emit = 0;
    let mut start = first;

    loop {
        out.push_str(&text[emit..start]);
        let body_from = start + spec.open.len();

        match find_close(text, spec, body_from) {
            Some((end, close_len)) => {
                emit = end + close_len;
            }
            None => {
                if fail_on_unclosed {
                    return Err(CleanError::MalformedMarkup {
                        open: spec.open.to_string(),
                        close: spec.close.to_string(),
                        title: ctx.title.to_string(),
                        excerpt: excerpt(text, start).to_string(),
                    });
                }
                warn!(
                    title = ctx.title,
                    open = spec.open,
                    excerpt = excerpt(text, start),
                    "span never closed, dropping the opening delimiter only"
                );
                emit = body_from;
            }
        }

        match text[emit..].find(spec.open) {
            Some(rel) => start = emit + rel,
            None => break,
        }
    }

    out.push_str(&text[emit..]);
    Ok(out)
}

/// Resolves the closing delimiter for a span whose body starts at `body_from`.
/// Returns the close position and the width of the token that closed it.
fn find_close(text: &str, spec: &DelimiterSpec, body_from: usize) -> Option<(usize, usize)> {
    let mut end = text[body_from..].find(spec.close).map(|i| body_from + i);
    let mut close_len = spec.close.len();

    if let Some(alt) = spec.alt_close {
        if let Some(alt_end) = text[body_from..].find(alt).map(|i| body_from + i) {
            if end.is_none_or(|e| alt_end < e) {
                end = Some(alt_end);
                close_len = alt.len();
            }
        }
    }

    let mut end = end?;

    // Each nest token strictly inside means the candidate close belongs to an
    // inner span. Only balance matters, not content, so a single counter
    // handles arbitrary depth.
    let nest = spec.nest_token();
    let mut pending = text[body_from..end].matches(nest).count();
    while pending > 0 {
        let resume = end + close_len;
        let next = text[resume..].find(spec.close).map(|i| resume + i)?;
        pending -= 1;
        pending += text[resume..next].matches(nest).count();
        end = next;
        close_len = spec.close.len();
    }

    Some((end, close_len))
}

/// First `EXCERPT_LEN` characters from `from`, for diagnostics.
pub(crate) fn excerpt(text: &str, from: usize) -> &str {
    let tail = &text[from..];
    match tail.char_indices().nth(EXCERPT_LEN) {
        Some((i, _)) => &tail[..i],
        None => tail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMENT: DelimiterSpec = DelimiterSpec::pair("<!--", "-->");
    const TEMPLATE: DelimiterSpec = DelimiterSpec::pair("{{", "}}").with_alt_close("}");
    const FILE_EMBED: DelimiterSpec = DelimiterSpec::pair("[[File:", "]]").with_alt_open("[[");
    const REF_ATTR: DelimiterSpec = DelimiterSpec::pair("<ref ", "</ref>").with_alt_close("/>");

    fn remove(text: &str, spec: &DelimiterSpec) -> String {
        remove_spans(text, spec, false, &CleanContext::default()).unwrap()
    }

    #[test]
    fn comments_removed() {
        let text = "This is a string <!-- a comment! --> containing an HTML style comment.\n\
                    Actually, it even <!-- another comment! --> has two comments!";
        let target = "This is a string  containing an HTML style comment.\n\
                      Actually, it even  has two comments!";
        assert_eq!(remove(text, &COMMENT), target);
    }

    #[test]
    fn comments_untouched_when_absent() {
        assert_eq!(
            remove("This string has no comments", &COMMENT),
            "This string has no comments"
        );
    }

    #[test]
    fn nested_comment_removed_as_one_unit() {
        assert_eq!(
            remove("A comment <!-- within <!-- a comment --> -->!", &COMMENT),
            "A comment !"
        );
    }

    #[test]
    fn nested_templates_removed_as_one_unit() {
        let text =
            "'''Irwin Allen Ginsberg''' ({{ here be something {{IPAc-en|ɡ|ɪ|n|z}} followed by}}; June 3";
        let target = "'''Irwin Allen Ginsberg''' (; June 3";
        assert_eq!(remove(text, &TEMPLATE), target);
    }

    #[test]
    fn balanced_nesting_spec_case() {
        assert_eq!(remove("{{ outer {{ inner }} tail}}", &TEMPLATE), "");
    }

    #[test]
    fn multi_template_infobox_block() {
        let text = "{{short description|American poet}}\n\
                    {{Use mdy dates|date=October 2019}}\n\
                    {{Infobox writer\n\
                    | birth_date  = {{Birth date|1926|06|03|mf=y}}\n\
                    | death_date  = {{death date and age|1997|04|05|1926|06|03|mf=y}}\n\
                    | occupation  = Writer, poet\n\
                    }}";
        assert_eq!(remove(text, &TEMPLATE), "\n\n");
    }

    #[test]
    fn file_embed_with_inner_link() {
        let text = "[[File:Prabhupada's arrival 1967.jpg|thumb|left|Greeting [[A. C. \
                    Bhaktivedanta Swami Prabhupada]] at [[San Francisco International Airport]]. \
                    January 17, 1967]]";
        assert_eq!(remove(text, &FILE_EMBED), "");
    }

    #[test]
    fn file_embed_spec_case() {
        assert_eq!(remove("[[File:x.jpg|thumb|[[A]] caption]]", &FILE_EMBED), "");
    }

    #[test]
    fn alt_close_preferred_when_nearer() {
        let text = "before <ref name=\"a\"/> middle <ref group=x>body</ref> after";
        assert_eq!(remove(text, &REF_ATTR), "before  middle  after");
    }

    #[test]
    fn lenient_unclosed_drops_open_token_only() {
        let out = remove("keep <!-- never closed", &COMMENT);
        assert_eq!(out, "keep  never closed");
    }

    #[test]
    fn strict_unclosed_fails_with_title_and_excerpt() {
        let err = remove_spans(
            "text <!-- dangling",
            &COMMENT,
            true,
            &CleanContext::new("Some article"),
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Some article"));
        assert!(msg.contains("<!-- dangling"));
    }

    #[test]
    fn lenient_terminates_on_unbalanced_opens() {
        let out = remove("{{ {{ {{ no closes anywhere", &TEMPLATE);
        assert!(!out.contains("{{"));
    }

    #[test]
    fn span_at_end_of_text() {
        assert_eq!(remove("tail<!-- x -->", &COMMENT), "tail");
    }

    #[test]
    fn adjacent_spans() {
        assert_eq!(remove("a<!--1--><!--2-->b", &COMMENT), "ab");
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        let text = "é".repeat(300);
        assert_eq!(excerpt(&text, 0).chars().count(), 250);
    }
}
