pub mod excel_read;
pub mod json_write;
pub mod walk;
