//! Loose, dictionary-based option representation for tooling that does not
//! link against the fixed-layout structs.

pub mod mapping;
