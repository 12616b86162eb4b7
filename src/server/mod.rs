//! Stdio JSON-RPC transport exposing the pipeline's `render` tool
//! (SPEC_FULL.md §1.1, §6.1).

pub mod mcp;

pub use mcp::run_stdio_server;
