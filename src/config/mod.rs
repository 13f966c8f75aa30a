//! Configuration module

mod board;

pub use board::BoardConfig;
pub use board::HighlightConfig;
pub use board::ServerConfig;
