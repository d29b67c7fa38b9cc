pub mod config;
pub mod events;
pub mod host;
pub mod sys;
