//! Config file sources layered by the loader.

pub mod global_file;
pub mod project_file;
