//! Generic structures with no direct tie to a solve.

pub mod index_heap;
pub mod luby;
pub mod minimal_pcg;
