pub mod shaping;
pub mod table_service;
