//! Console Output
//!
//! Styled terminal output plus the console-backed pipeline observer
//! used when running interactively.

use console::style;

use crate::observe::{PipelineObserver, StageEvent, StageOutcome};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer rendering stage events as console lines
pub struct ConsoleObserver;

impl PipelineObserver for ConsoleObserver {
    fn on_stage(&self, event: StageEvent) {
        let marker = match event.outcome {
            StageOutcome::Completed => style("✓").green(),
            StageOutcome::Fallback => style("⚠").yellow(),
            StageOutcome::Skipped => style("-").dim(),
        };
        println!(
            "{} {} ({}, {} items)",
            marker, event.stage, event.outcome, event.items
        );
    }
}
