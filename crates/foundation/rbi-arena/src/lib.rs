//! Indexed arena storage for declaration nodes
//!
//! Re-exports `la-arena`, the arena used by rust-analyzer. Nodes are
//! addressed by `Idx` handles so owner back-references never form
//! ownership cycles.

pub use la_arena::{Arena, ArenaMap, Idx};
