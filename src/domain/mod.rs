pub mod course;
pub mod result;
pub mod types;
