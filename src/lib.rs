#![allow(clippy::manual_range_contains, clippy::len_without_is_empty)]

/// Use mimalloc as the global allocator. Each worker grows a local
/// buffer while scanning its partition; mimalloc's thread-local
/// caching beats glibc malloc for that pattern.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod common;
pub mod sort;
pub mod sync;
