pub mod types;

pub use types::WebscanError;
