pub mod engine;
pub mod temp_db;
