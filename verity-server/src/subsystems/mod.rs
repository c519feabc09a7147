pub mod classifier;
pub mod embedder;
pub mod retrieve;
