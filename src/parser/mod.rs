//! Profile decoding and symbol resolution.
//!
//! This module handles:
//! - Reading MALT JSON from disk
//! - Resolving interned names
//! - Building the call-site symbol table
//! - Decoding stacks, timeline and leaks into typed records

pub mod document;
pub mod names;
pub mod schema;
pub mod symbols;

// Re-export main types
pub use document::{decode_document, load_document, parse_byte_count, parse_json_u64, DecodedProfile};
pub use names::NamePool;
pub use schema::{LeakRecord, MemoryTimeline, StackRecord, TimelineColumns};
pub use symbols::{SiteInfo, SymbolTable};
