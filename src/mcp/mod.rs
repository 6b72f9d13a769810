//! Model Context Protocol (MCP) server implementation
//!
//! Implements the MCP specification over newline-delimited JSON-RPC on
//! stdio: protocol types, message validation, the server loop, and the
//! tool/prompt/resource handlers each server flavor registers.

pub mod errors;
pub mod prompts;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;
pub mod validation;


pub use errors::{McpError, McpResult};
pub use protocol::{
    CallToolParams, CallToolResult, GetPromptParams, GetPromptResult, Prompt, PromptArgument,
    PromptMessage, Resource, Tool, ToolContent, MCP_VERSION,
};
pub use server::{
    ConnectionState, McpServer, MessageHandler, PromptHandler, ResourceHandler, ToolHandler,
};
pub use validation::McpValidator;
