// ABOUTME: Configuration and constants for the Scheme interpreter
// This module contains version info and REPL welcome messages

#[allow(dead_code)]
pub const VERSION: &str = "1.0.0";
pub const WELCOME_MESSAGE: &str = "Scheme Interpreter v1.0";
pub const WELCOME_SUBTITLE: &str = "An R7RS-subset Scheme interpreter in Rust";
