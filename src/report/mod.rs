//! Run reporting: formatted terminal summaries of a generation run.

pub mod format;

pub use format::*;
