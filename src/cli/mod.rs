pub mod commands;
pub mod compare;
pub mod history;
pub mod profiles;
pub mod report;
pub mod scan;
pub mod stop;

pub use commands::{Cli, Commands};
