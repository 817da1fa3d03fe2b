//! Merge rules for run settings.

pub mod merge_policy;
