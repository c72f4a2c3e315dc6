pub mod browse;
pub mod config;
pub mod list;
pub mod prompt;
pub mod render;
pub mod submit;
pub mod ticket;
