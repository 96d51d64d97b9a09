pub mod config;
pub mod course;
