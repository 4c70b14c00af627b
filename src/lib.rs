pub mod cli;
pub mod client;
pub mod config;
pub mod document;
pub mod errors;
pub mod report;
pub mod session;
pub mod utils;
