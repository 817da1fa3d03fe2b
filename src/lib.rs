//! Shotforge: Batch Store Screenshot Generation
//!
//! Drives a browser-hosted design tool through a fixed configuration sequence
//! to produce framed, localized screenshots for every configured artifact,
//! locale and output size, with per-task retries, session recycling and a
//! mixed parallel/sequential schedule across sizes.

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod model;
pub mod remote;
pub mod task;
pub mod ui;
