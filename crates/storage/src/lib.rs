pub mod record;
pub mod repository;
pub mod sqlite;
