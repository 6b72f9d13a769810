//! MCP Server Implementation
//!
//! Core MCP server with connection handling, message routing, and protocol
//! compliance. Tools, resources, and prompts are registered with handler
//! objects and served over newline-delimited JSON-RPC on stdio.

use crate::mcp::errors::McpError;
use crate::mcp::protocol::*;
use crate::mcp::validation::McpValidator;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// MCP Server state and configuration
pub struct McpServer {
    /// Server implementation information
    pub server_info: Implementation,
    /// Server capabilities
    pub capabilities: ServerCapabilities,
    /// Instructions string advertised during initialization
    pub instructions: Option<String>,
    /// Registered tools
    pub tools: Arc<RwLock<HashMap<String, Tool>>>,
    /// Registered resources (uri or uri template keyed)
    pub resources: Arc<RwLock<HashMap<String, Resource>>>,
    /// Registered prompts
    pub prompts: Arc<RwLock<HashMap<String, Prompt>>>,
    /// Tool handlers
    pub tool_handlers: Arc<RwLock<HashMap<String, Box<dyn ToolHandler>>>>,
    /// Resource handlers
    pub resource_handlers: Arc<RwLock<HashMap<String, Box<dyn ResourceHandler>>>>,
    /// Prompt handlers
    pub prompt_handlers: Arc<RwLock<HashMap<String, Box<dyn PromptHandler>>>>,
    /// Connection state
    pub connection_state: Arc<RwLock<ConnectionState>>,
    /// Message validator
    pub validator: Arc<McpValidator>,
}

/// Connection state tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ConnectionState {
    Uninitialized,
    Initializing,
    Ready,
    Closed,
}

/// Tool handler trait for implementing tool execution
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult>;
}

/// Resource handler trait for implementing resource access
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    async fn handle(&self, uri: &str) -> Result<Value>;
}

/// Prompt handler trait for rendering prompt templates
#[async_trait]
pub trait PromptHandler: Send + Sync {
    async fn handle(&self, arguments: HashMap<String, String>) -> Result<GetPromptResult>;
}

/// Message handler for processing incoming messages
pub struct MessageHandler {
    server: Arc<McpServer>,
}

impl McpServer {
    /// Create a new MCP server
    #[inline]
    pub fn new(name: String, version: String) -> Result<Self> {
        let server_info = Implementation { name, version };

        let capabilities = ServerCapabilities {
            experimental: None,
            logging: Some(LoggingCapability {}),
            prompts: Some(PromptsCapability {
                list_changed: Some(false),
            }),
            resources: Some(ResourcesCapability {
                subscribe: Some(false),
                list_changed: Some(false),
            }),
            tools: Some(ToolsCapability {
                list_changed: Some(false),
            }),
        };

        let validator = McpValidator::new()?;

        Ok(Self {
            server_info,
            capabilities,
            instructions: None,
            tools: Arc::new(RwLock::new(HashMap::new())),
            resources: Arc::new(RwLock::new(HashMap::new())),
            prompts: Arc::new(RwLock::new(HashMap::new())),
            tool_handlers: Arc::new(RwLock::new(HashMap::new())),
            resource_handlers: Arc::new(RwLock::new(HashMap::new())),
            prompt_handlers: Arc::new(RwLock::new(HashMap::new())),
            connection_state: Arc::new(RwLock::new(ConnectionState::Uninitialized)),
            validator: Arc::new(validator),
        })
    }

    /// Set the instructions string advertised to clients.
    #[inline]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Register a tool with the server
    #[inline]
    pub async fn register_tool<H>(&self, tool: Tool, handler: H) -> Result<()>
    where
        H: ToolHandler + 'static,
    {
        let tool_name = tool.name.clone();

        {
            let mut tools = self.tools.write().await;
            tools.insert(tool_name.clone(), tool);
        }

        {
            let mut handlers = self.tool_handlers.write().await;
            handlers.insert(tool_name.clone(), Box::new(handler));
        }

        debug!("Registered tool: {}", tool_name);
        Ok(())
    }

    /// Register a resource with the server
    #[inline]
    pub async fn register_resource<H>(&self, resource: Resource, handler: H) -> Result<()>
    where
        H: ResourceHandler + 'static,
    {
        let resource_uri = resource.uri.clone();

        {
            let mut resources = self.resources.write().await;
            resources.insert(resource_uri.clone(), resource);
        }

        {
            let mut handlers = self.resource_handlers.write().await;
            handlers.insert(resource_uri.clone(), Box::new(handler));
        }

        debug!("Registered resource: {}", resource_uri);
        Ok(())
    }

    /// Register a prompt with the server
    #[inline]
    pub async fn register_prompt<H>(&self, prompt: Prompt, handler: H) -> Result<()>
    where
        H: PromptHandler + 'static,
    {
        let prompt_name = prompt.name.clone();

        {
            let mut prompts = self.prompts.write().await;
            prompts.insert(prompt_name.clone(), prompt);
        }

        {
            let mut handlers = self.prompt_handlers.write().await;
            handlers.insert(prompt_name.clone(), Box::new(handler));
        }

        debug!("Registered prompt: {}", prompt_name);
        Ok(())
    }

    /// Start the server using stdio transport
    #[inline]
    pub async fn serve_stdio(self: Arc<Self>) -> Result<()> {
        info!("Starting MCP server with stdio transport");

        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut reader = BufReader::new(stdin);

        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("EOF reached, closing connection");
                    break;
                }
                Ok(_) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let raw_value: Value = match serde_json::from_str(line) {
                        Ok(value) => value,
                        Err(e) => {
                            error!("Failed to parse JSON: {}", e);
                            let error_response =
                                JsonRpcErrorResponse::new(JsonRpcError::parse_error(), None);
                            self.send_message(
                                &mut stdout,
                                &JsonRpcMessage::ErrorResponse(error_response),
                            )
                            .await?;
                            continue;
                        }
                    };

                    match self.validator.validate_raw_message(&raw_value) {
                        Ok(message) => {
                            let handler = MessageHandler::new(Arc::clone(&self));
                            if let Err(e) = handler.process_message(message, &mut stdout).await {
                                error!("Error processing message: {}", e);
                            }
                        }
                        Err(e) => {
                            error!("Message validation failed: {}", e);
                            let error_response =
                                JsonRpcErrorResponse::new(JsonRpcError::invalid_request(), None);
                            self.send_message(
                                &mut stdout,
                                &JsonRpcMessage::ErrorResponse(error_response),
                            )
                            .await?;
                        }
                    }
                }
                Err(e) => {
                    error!("Error reading from stdin: {}", e);
                    break;
                }
            }
        }

        {
            let mut state = self.connection_state.write().await;
            *state = ConnectionState::Closed;
        }

        info!("MCP server stopped");
        Ok(())
    }

    /// Send a message to the client
    async fn send_message<W>(&self, writer: &mut W, message: &JsonRpcMessage) -> Result<()>
    where
        W: AsyncWriteExt + Unpin,
    {
        let json = serde_json::to_string(message)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }

    /// Get current connection state
    #[inline]
    pub async fn connection_state(&self) -> ConnectionState {
        *self.connection_state.read().await
    }

    /// Snapshot of the server's registration counts and state
    #[inline]
    pub async fn health_status(&self) -> ServerHealthStatus {
        ServerHealthStatus {
            connection_state: self.connection_state().await,
            tools_registered: self.tools.read().await.len(),
            resources_registered: self.resources.read().await.len(),
            prompts_registered: self.prompts.read().await.len(),
        }
    }

    /// Detailed statistics including registered names
    #[inline]
    pub async fn server_statistics(&self) -> ServerStatistics {
        ServerStatistics {
            server_info: self.server_info.clone(),
            capabilities: self.capabilities.clone(),
            connection_state: self.connection_state().await,
            registered_tools: self.tools.read().await.keys().cloned().collect(),
            registered_resources: self.resources.read().await.keys().cloned().collect(),
            registered_prompts: self.prompts.read().await.keys().cloned().collect(),
        }
    }
}

impl MessageHandler {
    /// Create a new message handler
    #[inline]
    pub fn new(server: Arc<McpServer>) -> Self {
        Self { server }
    }

    /// Process an incoming message
    #[inline]
    pub async fn process_message<W>(&self, message: JsonRpcMessage, writer: &mut W) -> Result<()>
    where
        W: AsyncWriteExt + Unpin,
    {
        match message {
            JsonRpcMessage::Request(request) => self.handle_request(request, writer).await,
            JsonRpcMessage::Notification(notification) => {
                self.handle_notification(notification).await
            }
            JsonRpcMessage::Response(_) | JsonRpcMessage::ErrorResponse(_) => {
                warn!("Received unexpected response message from client");
                Ok(())
            }
        }
    }

    /// Handle a JSON-RPC request
    async fn handle_request<W>(&self, request: JsonRpcRequest, writer: &mut W) -> Result<()>
    where
        W: AsyncWriteExt + Unpin,
    {
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params).await,
            "tools/list" => self.handle_list_tools().await,
            "tools/call" => self.handle_call_tool(request.params).await,
            "prompts/list" => self.handle_list_prompts().await,
            "prompts/get" => self.handle_get_prompt(request.params).await,
            "resources/list" => self.handle_list_resources().await,
            "resources/read" => self.handle_read_resource(request.params).await,
            "ping" => self.handle_ping(),
            method => Err(McpError::MethodNotFound {
                method: method.to_string(),
            }),
        };

        match response {
            Ok(result) => {
                let response = JsonRpcResponse::new(result, request.id);
                self.send_response(writer, JsonRpcMessage::Response(response))
                    .await
            }
            Err(e) => {
                e.log();
                let message = e.to_error_response(Some(request.id));
                self.send_response(writer, message).await
            }
        }
    }

    /// Handle a JSON-RPC notification
    async fn handle_notification(&self, notification: JsonRpcNotification) -> Result<()> {
        match notification.method.as_str() {
            "initialized" | "notifications/initialized" => self.handle_initialized().await,
            "notifications/cancelled" => {
                debug!("Received cancellation notification");
                Ok(())
            }
            _ => {
                warn!("Unknown notification method: {}", notification.method);
                Ok(())
            }
        }
    }

    /// Handle initialize request
    #[inline]
    pub async fn handle_initialize(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: InitializeParams = match params {
            Some(p) => serde_json::from_value(p)?,
            None => {
                return Err(McpError::InvalidParameters {
                    message: "Initialize request missing parameters".to_string(),
                });
            }
        };

        if !self
            .server
            .validator
            .is_protocol_version_supported(&params.protocol_version)
        {
            let supported = self.server.validator.supported_protocol_versions();
            return Err(McpError::UnsupportedProtocolVersion {
                version: params.protocol_version,
                supported: supported.iter().map(|v| (*v).to_string()).collect(),
            });
        }

        {
            let mut state = self.server.connection_state.write().await;
            *state = ConnectionState::Initializing;
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: self.server.capabilities.clone(),
            server_info: self.server.server_info.clone(),
            instructions: self.server.instructions.clone(),
        };

        info!("Client initialized: {}", params.client_info.name);
        Ok(serde_json::to_value(result)?)
    }

    /// Handle initialized notification
    async fn handle_initialized(&self) -> Result<()> {
        {
            let mut state = self.server.connection_state.write().await;
            *state = ConnectionState::Ready;
        }

        info!("Server ready to handle requests");
        Ok(())
    }

    /// Handle list tools request
    #[inline]
    pub async fn handle_list_tools(&self) -> Result<Value, McpError> {
        let tools = self.server.tools.read().await;
        let tools_vec: Vec<Tool> = tools.values().cloned().collect();

        let result = ListToolsResult { tools: tools_vec };
        Ok(serde_json::to_value(result)?)
    }

    /// Handle call tool request
    #[inline]
    pub async fn handle_call_tool(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: CallToolParams = match params {
            Some(p) => serde_json::from_value(p)?,
            None => {
                return Err(McpError::InvalidParameters {
                    message: "Tool call request missing parameters".to_string(),
                });
            }
        };

        let handlers = self.server.tool_handlers.read().await;
        let handler = handlers.get(&params.name).ok_or_else(|| McpError::ToolNotFound {
            name: params.name.clone(),
        })?;

        let tool_name = params.name.clone();
        let result = handler
            .handle(params)
            .await
            .map_err(|e| McpError::ToolExecutionFailed {
                tool: tool_name,
                message: e.to_string(),
            })?;
        Ok(serde_json::to_value(result)?)
    }

    /// Handle list prompts request
    #[inline]
    pub async fn handle_list_prompts(&self) -> Result<Value, McpError> {
        let prompts = self.server.prompts.read().await;
        let prompts_vec: Vec<Prompt> = prompts.values().cloned().collect();

        let result = ListPromptsResult {
            prompts: prompts_vec,
        };
        Ok(serde_json::to_value(result)?)
    }

    /// Handle get prompt request
    #[inline]
    pub async fn handle_get_prompt(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: GetPromptParams = match params {
            Some(p) => serde_json::from_value(p)?,
            None => {
                return Err(McpError::InvalidParameters {
                    message: "Prompt request missing parameters".to_string(),
                });
            }
        };

        let handlers = self.server.prompt_handlers.read().await;
        let handler = handlers
            .get(&params.name)
            .ok_or_else(|| McpError::PromptNotFound {
                name: params.name.clone(),
            })?;

        let result = handler
            .handle(params.arguments.unwrap_or_default())
            .await
            .map_err(McpError::from)?;
        Ok(serde_json::to_value(result)?)
    }

    /// Handle list resources request
    async fn handle_list_resources(&self) -> Result<Value, McpError> {
        let resources = self.server.resources.read().await;
        let resources_vec: Vec<Resource> = resources.values().cloned().collect();

        let result = ListResourcesResult {
            resources: resources_vec,
        };
        Ok(serde_json::to_value(result)?)
    }

    /// Handle read resource request. Registered uris may be templates with
    /// a trailing `{url}` placeholder; the longest matching template wins.
    async fn handle_read_resource(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: ReadResourceParams = match params {
            Some(p) => serde_json::from_value(p)?,
            None => {
                return Err(McpError::InvalidParameters {
                    message: "Resource read request missing parameters".to_string(),
                });
            }
        };

        let handlers = self.server.resource_handlers.read().await;
        let key = {
            let resources = self.server.resources.read().await;
            match_resource_template(resources.keys(), &params.uri).ok_or_else(|| {
                McpError::ResourceNotFound {
                    uri: params.uri.clone(),
                }
            })?
        };

        let handler = handlers.get(&key).ok_or_else(|| McpError::ResourceNotFound {
            uri: params.uri.clone(),
        })?;

        let value = handler
            .handle(&params.uri)
            .await
            .map_err(|e| McpError::ResourceAccessFailed {
                uri: params.uri.clone(),
                message: e.to_string(),
            })?;

        let result = ReadResourceResult {
            contents: vec![ResourceContents {
                uri: params.uri,
                mime_type: Some("application/json".to_string()),
                text: Some(serde_json::to_string_pretty(&value)?),
            }],
        };
        Ok(serde_json::to_value(result)?)
    }

    /// Handle ping request
    #[inline]
    pub fn handle_ping(&self) -> Result<Value, McpError> {
        Ok(serde_json::json!({}))
    }

    /// Send a response message
    async fn send_response<W>(&self, writer: &mut W, message: JsonRpcMessage) -> Result<()>
    where
        W: AsyncWriteExt + Unpin,
    {
        self.server.send_message(writer, &message).await
    }
}

/// Pick the registered resource key matching a concrete uri. Exact matches
/// win; otherwise the longest template prefix (the part before `{`) that
/// the uri starts with.
pub fn match_resource_template<'a, I>(keys: I, uri: &str) -> Option<String>
where
    I: Iterator<Item = &'a String>,
{
    let mut best: Option<&String> = None;

    for key in keys {
        if key == uri {
            return Some(key.clone());
        }

        if let Some(prefix) = key.split('{').next() {
            if !prefix.is_empty()
                && key.contains('{')
                && uri.starts_with(prefix)
                && best.is_none_or(|current| key.len() > current.len())
            {
                best = Some(key);
            }
        }
    }

    best.cloned()
}
