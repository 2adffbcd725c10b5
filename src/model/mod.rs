pub mod config;
pub mod document;
pub mod record;
pub mod tree;

pub use config::*;
pub use document::*;
pub use record::*;
pub use tree::*;
