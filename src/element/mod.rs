pub mod classifier;
pub mod element_model;
pub mod ingest;
pub mod summary;
