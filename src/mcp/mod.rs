// MCP module
// Protocol types, the stdio server, and the tool handlers

pub mod protocol;
pub mod server;
pub mod tools;


pub use server::{ConnectionState, McpServer, MessageHandler, ToolHandler};
