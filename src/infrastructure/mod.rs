pub mod database;
pub mod offline;
