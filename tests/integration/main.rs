//! Integration tests

mod common;
mod config_test;
mod data_test;
mod engine_test;
