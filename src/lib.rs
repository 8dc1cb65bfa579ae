pub mod config;
pub mod twothree;
