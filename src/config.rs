/// Longest spelling in the HTML entity table ("&pound;"), in characters.
/// A longer accumulated buffer can never decode, so scanning stops there.
pub const MAX_ENTITY_LEN: usize = 7;

/// Links whose bracketed extent exceeds this many bytes are treated as
/// malformed and left in place.
pub const MAX_LINK_LEN: usize = 500;

/// Number of characters of offending text quoted in diagnostics
pub const EXCERPT_LEN: usize = 250;

/// Progress update interval (tick every N records)
pub const PROGRESS_INTERVAL: u64 = 1000;

/// Buffer size for the extraction output writer
pub const WRITER_BUFFER_BYTES: usize = 128 * 1024;

/// Record element extracted from MediaWiki export XML
pub const PAGE_TAG: &str = "page";
