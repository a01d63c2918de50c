pub mod import;
pub mod memory;
pub mod sqlite;
