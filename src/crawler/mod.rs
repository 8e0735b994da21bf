pub mod crawler_model;
pub mod definition;
