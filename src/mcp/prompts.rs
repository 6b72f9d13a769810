//! MCP Prompts Implementation
//!
//! Bridges the prompt template library to the MCP `prompts/get` surface.
//! Each template is described by a [`PromptKind`] carrying its definition
//! and rendered by [`TemplatePromptHandler`].

use crate::mcp::errors::McpError;
use crate::mcp::protocol::*;
use crate::mcp::server::PromptHandler;
use crate::prompts::{self, Role, TemplateMessage};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// The prompt templates the prompts server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    ExplainTopic,
    GenerateCodeRequest,
    StartRoleplay,
    GenerateReport,
    CodeReview,
    LearningPlan,
}

impl PromptKind {
    pub const ALL: [Self; 6] = [
        Self::ExplainTopic,
        Self::GenerateCodeRequest,
        Self::StartRoleplay,
        Self::GenerateReport,
        Self::CodeReview,
        Self::LearningPlan,
    ];

    /// Prompt name as advertised over `prompts/list`.
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Self::ExplainTopic => "explain_topic",
            Self::GenerateCodeRequest => "generate_code_request",
            Self::StartRoleplay => "start_roleplay",
            Self::GenerateReport => "generate_report",
            Self::CodeReview => "code_review",
            Self::LearningPlan => "learning_plan",
        }
    }

    /// Protocol definition including declared arguments.
    #[inline]
    pub fn definition(self) -> Prompt {
        match self {
            Self::ExplainTopic => Prompt {
                name: self.name().to_string(),
                description: Some("Ask for a detailed explanation of a topic".to_string()),
                arguments: Some(vec![required_arg("topic", "Concept to explain")]),
            },
            Self::GenerateCodeRequest => Prompt {
                name: self.name().to_string(),
                description: Some("Request code generation for a task".to_string()),
                arguments: Some(vec![
                    required_arg("language", "Programming language to use"),
                    required_arg("task_description", "What the code should do"),
                ]),
            },
            Self::StartRoleplay => Prompt {
                name: self.name().to_string(),
                description: Some(
                    "Open a roleplay conversation with a chosen character".to_string(),
                ),
                arguments: Some(vec![required_arg("character", "Character to play")]),
            },
            Self::GenerateReport => Prompt {
                name: self.name().to_string(),
                description: Some(
                    "Build a data report request with summary statistics".to_string(),
                ),
                arguments: Some(vec![
                    required_arg("title", "Report title"),
                    optional_arg("data", "JSON array of integers to summarize"),
                ]),
            },
            Self::CodeReview => Prompt {
                name: self.name().to_string(),
                description: Some("Request a structured review of a code snippet".to_string()),
                arguments: Some(vec![
                    required_arg("language", "Language of the snippet"),
                    required_arg("code", "Code to review"),
                ]),
            },
            Self::LearningPlan => Prompt {
                name: self.name().to_string(),
                description: Some("Request a staged learning plan for a topic".to_string()),
                arguments: Some(vec![
                    required_arg("topic", "Subject to learn"),
                    optional_arg("level", "Current skill level (default: beginner)"),
                    optional_arg("duration", "Time available (default: 4 weeks)"),
                ]),
            },
        }
    }
}

fn required_arg(name: &str, description: &str) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        description: Some(description.to_string()),
        required: Some(true),
    }
}

fn optional_arg(name: &str, description: &str) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        description: Some(description.to_string()),
        required: Some(false),
    }
}

/// Renders one [`PromptKind`] from `prompts/get` arguments.
pub struct TemplatePromptHandler {
    kind: PromptKind,
}

impl TemplatePromptHandler {
    #[inline]
    pub fn new(kind: PromptKind) -> Self {
        Self { kind }
    }

    fn require<'a>(
        args: &'a HashMap<String, String>,
        name: &str,
        prompt: PromptKind,
    ) -> Result<&'a str, McpError> {
        args.get(name)
            .map(String::as_str)
            .ok_or_else(|| McpError::InvalidParameters {
                message: format!(
                    "Prompt {} missing required argument: {}",
                    prompt.name(),
                    name
                ),
            })
    }

    fn render(&self, args: &HashMap<String, String>) -> Result<GetPromptResult, McpError> {
        let messages = match self.kind {
            PromptKind::ExplainTopic => {
                let topic = Self::require(args, "topic", self.kind)?;
                vec![PromptMessage::text("user", prompts::explain_topic(topic))]
            }
            PromptKind::GenerateCodeRequest => {
                let language = Self::require(args, "language", self.kind)?;
                let task = Self::require(args, "task_description", self.kind)?;
                vec![to_protocol_message(prompts::generate_code_request(
                    language, task,
                ))]
            }
            PromptKind::StartRoleplay => {
                let character = Self::require(args, "character", self.kind)?;
                prompts::start_roleplay(character)
                    .into_iter()
                    .map(to_protocol_message)
                    .collect()
            }
            PromptKind::GenerateReport => {
                let title = Self::require(args, "title", self.kind)?;
                let data = match args.get("data") {
                    Some(raw) => serde_json::from_str::<Vec<i64>>(raw).map_err(|e| {
                        McpError::InvalidParameters {
                            message: format!(
                                "Prompt generate_report argument data is not a JSON array of integers: {}",
                                e
                            ),
                        }
                    })?,
                    None => Vec::new(),
                };
                vec![PromptMessage::text(
                    "user",
                    prompts::generate_report(title, &data),
                )]
            }
            PromptKind::CodeReview => {
                let language = Self::require(args, "language", self.kind)?;
                let code = Self::require(args, "code", self.kind)?;
                vec![PromptMessage::text(
                    "user",
                    prompts::code_review(language, code),
                )]
            }
            PromptKind::LearningPlan => {
                let topic = Self::require(args, "topic", self.kind)?;
                let level = args.get("level").map_or("beginner", String::as_str);
                let duration = args.get("duration").map_or("4 weeks", String::as_str);
                vec![PromptMessage::text(
                    "user",
                    prompts::learning_plan(topic, level, duration),
                )]
            }
        };

        Ok(GetPromptResult {
            description: self.kind.definition().description,
            messages,
        })
    }
}

#[async_trait]
impl PromptHandler for TemplatePromptHandler {
    #[inline]
    async fn handle(&self, arguments: HashMap<String, String>) -> Result<GetPromptResult> {
        Ok(self.render(&arguments)?)
    }
}

fn to_protocol_message(message: TemplateMessage) -> PromptMessage {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };
    PromptMessage::text(role, message.content)
}
