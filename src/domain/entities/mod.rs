pub mod column;
pub mod envelope;
pub mod request;
pub mod row;
pub mod value;
