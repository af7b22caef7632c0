//! MCP protocol layer

mod server;

pub use server::NutrilogService;
