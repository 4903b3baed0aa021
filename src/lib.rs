pub mod batch;
pub mod cache;
pub mod config;
pub mod enrichment;
pub mod hunter;
pub mod input;
pub mod output;
pub mod scoring;
