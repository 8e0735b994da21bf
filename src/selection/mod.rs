pub mod selection_set;
