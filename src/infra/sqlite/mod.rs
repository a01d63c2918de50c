pub mod schema;
pub mod sink;
