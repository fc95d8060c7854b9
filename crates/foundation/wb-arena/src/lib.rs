//! Indexed arena allocator for syntax nodes and symbols
//!
//! This is a re-export of `la-arena` which is used by rust-analyzer
//! and provides a robust, well-tested arena implementation. Tree nodes
//! and symbols are addressed by `Idx`, which doubles as node identity.

pub use la_arena::{Arena, Idx};
