pub mod entities;
pub mod sanitize;
