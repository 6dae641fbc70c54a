pub mod config;
pub mod error;
pub mod features;
pub mod history;
pub mod model;
pub mod normalize;
pub mod output;
pub mod session;
pub mod stderr_buffer;
pub mod tui;
