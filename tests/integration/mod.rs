//! Integration tests for the batch screenshot generator

mod config_integration;
mod end_to_end;
mod scheduler_waves;
pub mod test_utils;
