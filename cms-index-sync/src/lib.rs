pub mod algolia;
pub mod cli;
pub mod load_config;
pub mod server;
pub mod webflow;

pub use cli::{run, Cli, Commands};
