//! Tool implementations
//!
//! Plain functions over `Database` returning serializable responses. The MCP
//! layer wraps them.

pub mod diary;
pub mod foods;
pub mod goals;
pub mod meals;
pub mod profile;
pub mod status;
