//! CLI layer - argument parsing, output formatting, and the app runner

pub mod app;
pub mod args;
pub mod presenter;

pub use app::{run, RunOptions};
pub use args::Cli;
pub use presenter::Presenter;
