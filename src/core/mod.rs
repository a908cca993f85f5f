pub mod catalog;
pub mod classifier;
pub mod converter;
pub mod engine;
pub mod matcher;
pub mod stats;
pub mod syllabifier;
pub mod types;
