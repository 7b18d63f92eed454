//! Personal time tracker for projects and sprints. Time is tracked per project with a start/stop
//! timer, completed sessions become entries, and while a timer runs a small indicator keeps the
//! elapsed time visible and a one-shot reminder suggests a break.
//!

pub mod cli;
pub mod config;
pub mod error;
pub mod indicator;
pub mod notify;
pub mod store;
pub mod tracking;
pub mod utils;
