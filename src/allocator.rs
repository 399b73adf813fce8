//! Global allocator.
//!
//! The streaming pipeline allocates and frees a pair of chunk buffers per
//! operation; mimalloc keeps that churn cheap.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
