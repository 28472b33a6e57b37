pub mod commands;
pub mod output;

pub use output::{ConsoleObserver, Output};
