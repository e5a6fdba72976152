use serde::Serialize;

/// One record pulled from a dump: article title plus raw wikitext body.
///
/// `text` is legitimately absent in real dumps; consumers treat that as
/// "skip this record", never as an error.
#[derive(Debug, Clone)]
pub struct ArticleRecord {
    pub title: String,
    pub text: Option<String>,
}

/// Output record written by the `extract` subcommand (JSON-lines format).
#[derive(Serialize)]
pub struct CleanedArticle<'a> {
    pub title: &'a str,
    pub text: &'a str,
}

/// Immutable per-article metadata threaded through the cleaning passes.
/// Carries no mutable state; used only for diagnostic messages.
#[derive(Debug, Clone, Copy)]
pub struct CleanContext<'a> {
    pub title: &'a str,
}

impl<'a> CleanContext<'a> {
    pub fn new(title: &'a str) -> Self {
        Self { title }
    }
}

impl Default for CleanContext<'_> {
    fn default() -> Self {
        Self { title: "N/A" }
    }
}
