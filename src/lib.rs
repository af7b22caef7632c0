//! Nutrilog library
//!
//! Food diary storage, per-100g nutrition math, goal progress and food lookup,
//! exposed as MCP tools.

pub mod build_info;
pub mod config;
pub mod db;
pub mod lookup;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
