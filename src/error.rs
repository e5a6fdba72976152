use thiserror::Error;

/// Errors surfaced by the cleaning pipeline.
///
/// Only `MalformedMarkup` ever reaches a caller, and only under strict mode;
/// every other irregularity (missing record text, ambiguous links, stray
/// brackets) is recovered in place with a diagnostic.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("unclosed `{open}` (expected `{close}`) in article [{title}]: {excerpt}")]
    MalformedMarkup {
        open: String,
        close: String,
        title: String,
        excerpt: String,
    },
}
