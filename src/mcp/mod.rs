//! MCP server module
//!
//! Exposes the Habitual tools over the Model Context Protocol.

mod server;

pub use server::HabitualService;
