// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod config;
pub mod export;
pub mod grid;
pub mod history;
pub mod legend;
pub mod reassign;
pub mod runtime;
pub mod schedule;
pub mod slots;
pub mod store;
pub mod theme;
