use crate::entities::normalize;
use crate::error::CleanError;
use crate::lines::{
    collapse_blank_lines, cut_trailing_sections, drop_definition_lines, drop_table_lines,
    strip_headings, strip_list_markers,
};
use crate::links::resolve_links;
use crate::models::CleanContext;
use crate::span::{remove_spans, DelimiterSpec};

const COMMENT: DelimiterSpec = DelimiterSpec::pair("<!--", "-->");
const NOWIKI: DelimiterSpec = DelimiterSpec::pair("<nowiki>", "</nowiki>");
// Frequently a lone "<nowiki/>"; this spelling catches it.
const NOWIKI_BARE: DelimiterSpec = DelimiterSpec::pair("<nowiki", "/>");
const PRE: DelimiterSpec = DelimiterSpec::pair("<pre", "</pre>");
const REF: DelimiterSpec = DelimiterSpec::pair("<ref>", "</ref>");
const REF_ATTR: DelimiterSpec = DelimiterSpec::pair("<ref ", "</ref>").with_alt_close("/>");
const MATH: DelimiterSpec = DelimiterSpec::pair("<math", "</math>");
const SOURCE: DelimiterSpec = DelimiterSpec::pair("<source", "</source>");
const FONT: DelimiterSpec = DelimiterSpec::pair("<font", "</font>");
const SUB: DelimiterSpec = DelimiterSpec::pair("<sub>", "</sub>");
const SUP: DelimiterSpec = DelimiterSpec::pair("<sup>", "</sup>");
// Template bodies may contain unpaired single braces
const TEMPLATE: DelimiterSpec = DelimiterSpec::pair("{{", "}}").with_alt_close("}");
const TEMPLATE_PLAIN: DelimiterSpec = DelimiterSpec::pair("{{", "}}");
const BRACE: DelimiterSpec = DelimiterSpec::pair("{", "}");
const CATEGORY: DelimiterSpec = DelimiterSpec::pair("[[Category:", "]]");
const CATEGORY_LOWER: DelimiterSpec = DelimiterSpec::pair("[[category:", "]]");
// Embed captions may contain bare [[...]] links, which count toward nesting
const FILE_EMBED: DelimiterSpec = DelimiterSpec::pair("[[File:", "]]").with_alt_open("[[");
const IMAGE_EMBED: DelimiterSpec = DelimiterSpec::pair("[[Image:", "]]").with_alt_open("[[");

/// Which pass list to run. The two presets share every pass implementation;
/// they differ only in which passes are included and the default blank-line
/// budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelinePreset {
    /// The complete pass list, in the fixed documented order.
    #[default]
    Full,
    /// Reduced list for lightly marked-up corpora: no trailing-section
    /// truncation, verbatim-tag removal, table stripping, or entity/emphasis
    /// normalization.
    Basic,
}

#[derive(Debug, Clone)]
pub struct CleanOptions {
    pub preset: PipelinePreset,
    /// Fail the article on an unclosed span instead of recovering.
    pub strict: bool,
    /// Longest run of consecutive newlines kept in the output: 1 removes
    /// every blank line, 2 keeps single blank lines.
    pub max_blank_line_run: usize,
    /// Delete heading lines instead of keeping their text.
    pub drop_headings: bool,
    /// Delete list/indent lines instead of keeping their text.
    pub drop_lists: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            preset: PipelinePreset::Full,
            strict: false,
            max_blank_line_run: 1,
            drop_headings: false,
            drop_lists: false,
        }
    }
}

impl CleanOptions {
    pub fn basic() -> Self {
        Self {
            preset: PipelinePreset::Basic,
            max_blank_line_run: 2,
            ..Self::default()
        }
    }
}

/// Runs the whole cleaning pipeline over one article.
///
/// Pass order is a correctness invariant, not a style choice: truncation needs
/// intact heading markers, templates must go before single braces and table
/// rows (template bodies hold `|`-led lines that are not rows), and file/image
/// embeds must go before link resolution because they share the `[[` open
/// token.
///
/// In lenient mode (the default) every malformation degrades to skip-and-log;
/// `strict` turns unresolved spans into a `MalformedMarkup` error for this one
/// article.
pub fn clean(raw: &str, title: &str, opts: &CleanOptions) -> Result<String, CleanError> {
    let ctx = CleanContext::new(title);
    match opts.preset {
        PipelinePreset::Full => clean_full(raw, &ctx, opts),
        PipelinePreset::Basic => clean_basic(raw, &ctx, opts),
    }
}

fn clean_full(raw: &str, ctx: &CleanContext, opts: &CleanOptions) -> Result<String, CleanError> {
    let strict = opts.strict;
    let text = cut_trailing_sections(raw);
    let text = remove_spans(text, &COMMENT, strict, ctx)?;
    let text = remove_spans(&text, &NOWIKI, strict, ctx)?;
    let text = remove_spans(&text, &NOWIKI_BARE, strict, ctx)?;
    let text = remove_spans(&text, &PRE, strict, ctx)?;
    let text = remove_spans(&text, &REF, strict, ctx)?;
    let text = remove_spans(&text, &REF_ATTR, strict, ctx)?;
    let text = remove_spans(&text, &MATH, strict, ctx)?;
    let text = remove_spans(&text, &SOURCE, strict, ctx)?;
    let text = remove_spans(&text, &FONT, strict, ctx)?;
    let text = remove_spans(&text, &SUB, strict, ctx)?;
    let text = remove_spans(&text, &SUP, strict, ctx)?;
    let text = remove_spans(&text, &TEMPLATE, strict, ctx)?;
    let text = remove_spans(&text, &BRACE, strict, ctx)?;
    let text = drop_table_lines(&text);
    let text = remove_spans(&text, &CATEGORY, strict, ctx)?;
    let text = remove_spans(&text, &CATEGORY_LOWER, strict, ctx)?;
    let text = remove_spans(&text, &FILE_EMBED, strict, ctx)?;
    let text = remove_spans(&text, &IMAGE_EMBED, strict, ctx)?;
    let text = resolve_links(&text, ctx);
    let text = normalize(&text);
    let text = strip_headings(&text, opts.drop_headings);
    let text = strip_list_markers(&text, opts.drop_lists);
    let text = drop_definition_lines(&text);
    Ok(collapse_blank_lines(&text, opts.max_blank_line_run))
}

fn clean_basic(raw: &str, ctx: &CleanContext, opts: &CleanOptions) -> Result<String, CleanError> {
    let strict = opts.strict;
    let text = remove_spans(raw, &COMMENT, strict, ctx)?;
    let text = remove_spans(&text, &REF, strict, ctx)?;
    let text = remove_spans(&text, &REF_ATTR, strict, ctx)?;
    let text = remove_spans(&text, &MATH, strict, ctx)?;
    let text = remove_spans(&text, &SOURCE, strict, ctx)?;
    let text = remove_spans(&text, &CATEGORY, strict, ctx)?;
    let text = remove_spans(&text, &CATEGORY_LOWER, strict, ctx)?;
    let text = remove_spans(&text, &TEMPLATE_PLAIN, strict, ctx)?;
    let text = remove_spans(&text, &FILE_EMBED, strict, ctx)?;
    let text = remove_spans(&text, &IMAGE_EMBED, strict, ctx)?;
    let text = resolve_links(&text, ctx);
    let text = strip_headings(&text, opts.drop_headings);
    let text = strip_list_markers(&text, opts.drop_lists);
    let text = drop_definition_lines(&text);
    Ok(collapse_blank_lines(&text, opts.max_blank_line_run))
}
