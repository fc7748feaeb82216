pub mod field;
pub mod fill;
