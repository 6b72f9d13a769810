//! MCP Error Handling
//!
//! Error classification for the MCP server, with conversion into JSON-RPC
//! error responses.

use crate::mcp::protocol::{
    JsonRpcError, JsonRpcErrorResponse, JsonRpcMessage, RequestId, error_codes, mcp_error_codes,
};
use thiserror::Error;
use tracing::error;

/// MCP-specific errors that can occur during server operation
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Protocol version not supported: {version}. Supported versions: {supported:?}")]
    UnsupportedProtocolVersion {
        version: String,
        supported: Vec<String>,
    },

    #[error("Tool not found: {name}")]
    ToolNotFound { name: String },

    #[error("Resource not found: {uri}")]
    ResourceNotFound { uri: String },

    #[error("Prompt not found: {name}")]
    PromptNotFound { name: String },

    #[error("Tool execution failed for {tool}: {message}")]
    ToolExecutionFailed { tool: String, message: String },

    #[error("Resource access failed for {uri}: {message}")]
    ResourceAccessFailed { uri: String, message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Internal server error: {message}")]
    InternalError { message: String },

    #[error("JSON-RPC parse error: {message}")]
    ParseError { message: String },

    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    #[error("Invalid parameters: {message}")]
    InvalidParameters { message: String },
}

impl McpError {
    /// Convert MCP error to JSON-RPC error
    #[inline]
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        match self {
            Self::UnsupportedProtocolVersion { version, supported } => JsonRpcError::new(
                mcp_error_codes::INVALID_PROTOCOL_VERSION,
                format!(
                    "Unsupported protocol version: {}. Supported: {}",
                    version,
                    supported.join(", ")
                ),
                None,
            ),
            Self::ToolNotFound { name } => JsonRpcError::new(
                mcp_error_codes::TOOL_NOT_FOUND,
                format!("Tool not found: {}", name),
                None,
            ),
            Self::ResourceNotFound { uri } => JsonRpcError::new(
                mcp_error_codes::RESOURCE_NOT_FOUND,
                format!("Resource not found: {}", uri),
                None,
            ),
            Self::PromptNotFound { name } => JsonRpcError::new(
                mcp_error_codes::PROMPT_NOT_FOUND,
                format!("Prompt not found: {}", name),
                None,
            ),
            Self::ToolExecutionFailed { tool, message } => JsonRpcError::new(
                error_codes::INTERNAL_ERROR,
                format!("Tool '{}' execution failed: {}", tool, message),
                None,
            ),
            Self::ResourceAccessFailed { uri, message } => JsonRpcError::new(
                error_codes::INTERNAL_ERROR,
                format!("Resource '{}' access failed: {}", uri, message),
                None,
            ),
            Self::InvalidRequest { message } => {
                JsonRpcError::new(error_codes::INVALID_REQUEST, message.clone(), None)
            }
            Self::InternalError { message } => {
                JsonRpcError::new(error_codes::INTERNAL_ERROR, message.clone(), None)
            }
            Self::ParseError { message } => {
                JsonRpcError::new(error_codes::PARSE_ERROR, message.clone(), None)
            }
            Self::MethodNotFound { method } => JsonRpcError::new(
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", method),
                None,
            ),
            Self::InvalidParameters { message } => {
                JsonRpcError::new(error_codes::INVALID_PARAMS, message.clone(), None)
            }
        }
    }

    /// Create error response message
    #[inline]
    pub fn to_error_response(&self, id: Option<RequestId>) -> JsonRpcMessage {
        let error = self.to_jsonrpc_error();
        let error_response = JsonRpcErrorResponse::new(error, id);
        JsonRpcMessage::ErrorResponse(error_response)
    }

    /// Log the error with appropriate level
    #[inline]
    pub fn log(&self) {
        match self {
            Self::ParseError { .. }
            | Self::InvalidRequest { .. }
            | Self::InvalidParameters { .. } => {
                error!("Client error: {}", self);
            }
            Self::ToolNotFound { .. }
            | Self::ResourceNotFound { .. }
            | Self::PromptNotFound { .. }
            | Self::MethodNotFound { .. } => {
                error!("Not found error: {}", self);
            }
            Self::ToolExecutionFailed { .. }
            | Self::ResourceAccessFailed { .. }
            | Self::InternalError { .. } => {
                error!("Server error: {}", self);
            }
            Self::UnsupportedProtocolVersion { .. } => {
                error!("MCP error: {}", self);
            }
        }
    }
}

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

impl From<anyhow::Error> for McpError {
    #[inline]
    fn from(error: anyhow::Error) -> Self {
        // Preserve a more specific classification when the source is
        // already an McpError.
        match error.downcast::<Self>() {
            Ok(mcp_error) => mcp_error,
            Err(other) => Self::InternalError {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for McpError {
    #[inline]
    fn from(error: serde_json::Error) -> Self {
        Self::ParseError {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_not_found_error() {
        let error = McpError::ToolNotFound {
            name: "test_tool".to_string(),
        };

        let jsonrpc_error = error.to_jsonrpc_error();
        assert_eq!(jsonrpc_error.code, mcp_error_codes::TOOL_NOT_FOUND);
        assert!(jsonrpc_error.message.contains("test_tool"));
    }

    #[test]
    fn prompt_not_found_error() {
        let error = McpError::PromptNotFound {
            name: "explain_topic".to_string(),
        };

        let jsonrpc_error = error.to_jsonrpc_error();
        assert_eq!(jsonrpc_error.code, mcp_error_codes::PROMPT_NOT_FOUND);
        assert!(jsonrpc_error.message.contains("explain_topic"));
    }

    #[test]
    fn invalid_protocol_version_error() {
        let error = McpError::UnsupportedProtocolVersion {
            version: "invalid".to_string(),
            supported: vec!["2025-06-18".to_string()],
        };

        let jsonrpc_error = error.to_jsonrpc_error();
        assert_eq!(
            jsonrpc_error.code,
            mcp_error_codes::INVALID_PROTOCOL_VERSION
        );
        assert!(jsonrpc_error.message.contains("invalid"));
        assert!(jsonrpc_error.message.contains("2025-06-18"));
    }

    #[test]
    fn error_response_creation() {
        let error = McpError::InternalError {
            message: "test error".to_string(),
        };

        let response = error.to_error_response(Some(RequestId::String("test".to_string())));

        if let JsonRpcMessage::ErrorResponse(err_resp) = response {
            assert_eq!(err_resp.error.code, error_codes::INTERNAL_ERROR);
            assert!(err_resp.error.message.contains("test error"));
        } else {
            panic!("Expected error response");
        }
    }

    #[test]
    fn anyhow_conversion_preserves_mcp_errors() {
        let original = McpError::MethodNotFound {
            method: "bogus/method".to_string(),
        };
        let through_anyhow: McpError = anyhow::Error::new(original).into();

        assert!(matches!(through_anyhow, McpError::MethodNotFound { .. }));
    }
}
