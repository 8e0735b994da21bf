pub mod analysis_store;
pub mod persist;
pub mod store_model;
