pub mod entities;
pub mod growth;
pub mod value_objects;
