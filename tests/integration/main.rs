//! Integration tests for the pipeline
//!
//! These tests use wiremock to create mock HTTP servers and drive whole
//! batches through validation, fetching, extraction and scoring.

mod common;
mod fetcher_tests;
mod pipeline_tests;
