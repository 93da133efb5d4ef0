pub mod about;
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod forms;
pub mod job_watch;
pub mod poller;
pub mod ui_state;
pub mod validate;
