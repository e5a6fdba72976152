//! # Icarus: Wikipedia Dump Text Extractor
//!
//! Streams articles out of a bzip2-compressed MediaWiki XML export and strips
//! their wikitext markup down to plain text, one article at a time, in
//! constant memory.
//!
//! ## Key Modules
//!
//! - `reader`: streaming bz2 + XML record iterator
//! - `clean`: the fixed-order cleaning pipeline over one article
//! - `span`: balanced-delimiter span removal (templates, refs, comments, ...)
//! - `links`: `[[target|label]]` resolution
//! - `entities`: HTML entity decoding and emphasis-run removal
//! - `lines`: line-structure filters (headings, lists, tables, blank runs)

pub mod clean;
pub mod config;
pub mod entities;
pub mod error;
pub mod lines;
pub mod links;
pub mod models;
pub mod reader;
pub mod span;
pub mod stats;
