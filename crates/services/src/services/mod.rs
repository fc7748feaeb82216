pub mod database_validator;
pub mod date;
pub mod field;
pub mod fill;
pub mod value;
