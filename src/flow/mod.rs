pub mod builder;
pub mod flow_list;
pub mod flow_model;
