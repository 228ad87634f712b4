// Library surface for headless/integration tests and reuse.
// The TUI front end (ui, event loop) lives with the binary in main.rs.
pub mod anticheat;
pub mod catalog;
pub mod certificate;
pub mod config;
pub mod review;
pub mod runtime;
pub mod score;
pub mod session;
