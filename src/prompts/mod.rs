//! Prompt template library
//!
//! Pure string-templating functions backing the prompt server. Each
//! template returns fully formatted prompt content; the MCP layer exposes
//! them through `prompts/list` and `prompts/get`.

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

/// Role of a templated conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single templated message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMessage {
    pub role: Role,
    pub content: String,
}

impl TemplateMessage {
    #[inline]
    pub fn user(content: String) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    #[inline]
    pub fn assistant(content: String) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }
}

/// Prompt asking for a thorough explanation of a topic.
#[inline]
pub fn explain_topic(topic: &str) -> String {
    format!(
        "Please explain the concept of \"{}\" in detail, covering its definition, \
         underlying principles, and typical application scenarios.",
        topic
    )
}

/// User message requesting code generation for a task.
#[inline]
pub fn generate_code_request(language: &str, task_description: &str) -> TemplateMessage {
    TemplateMessage::user(format!(
        "Write a {} function that performs the following task: {}",
        language, task_description
    ))
}

/// Two-message opener for a roleplay conversation: the user's kickoff plus
/// the assistant's in-character acknowledgement.
#[inline]
pub fn start_roleplay(character: &str) -> Vec<TemplateMessage> {
    vec![
        TemplateMessage::user(format!(
            "Let's play a roleplay game. You are now {character}. Stay fully immersed \
             in this character and respond with {character}'s identity, voice, and way \
             of thinking. Are you ready?"
        )),
        TemplateMessage::assistant(format!(
            "Ready! I am {character} now. Let's begin — what would you like me to do, \
             or what shall we talk about?"
        )),
    ]
}

/// Markdown report template with an item list and summary statistics.
#[inline]
pub fn generate_report(title: &str, data: &[i64]) -> String {
    let items: String = data
        .iter()
        .enumerate()
        .map(|(i, value)| format!("- Item {}: {}\n", i + 1, value))
        .collect();

    let (max, min, mean) = if data.is_empty() {
        ("N/A".to_string(), "N/A".to_string(), "N/A".to_string())
    } else {
        let max = data.iter().max().map_or(0, |v| *v);
        let min = data.iter().min().map_or(0, |v| *v);
        let mean = data.iter().sum::<i64>() as f64 / data.len() as f64;
        (max.to_string(), min.to_string(), format!("{:.2}", mean))
    };

    format!(
        "# {title}\n\n\
         ## Data Overview\n\n\
         {items}\n\
         ## Statistics\n\n\
         - Count: {count}\n\
         - Maximum: {max}\n\
         - Minimum: {min}\n\
         - Mean: {mean}\n\n\
         ## Conclusion\n\n\
         Please derive conclusions and recommendations from the data above.\n",
        title = title,
        items = items,
        count = data.len(),
        max = max,
        min = min,
        mean = mean,
    )
}

/// Code review prompt wrapping the code in a fenced block.
#[inline]
pub fn code_review(language: &str, code: &str) -> String {
    format!(
        "Please perform a thorough review of the following {language} code:\n\n\
         ```{language}\n{code}\n```\n\n\
         Analyze it along these dimensions:\n\n\
         1. **Code quality**: readability, maintainability, style\n\
         2. **Performance**: bottlenecks and optimization opportunities\n\
         3. **Security**: vulnerabilities or risky constructs\n\
         4. **Best practices**: adherence to the idioms of the language\n\
         5. **Error handling**: completeness of failure paths\n\
         6. **Suggestions**: concrete improvements and refactoring proposals\n\n\
         Provide detailed analysis with improved code examples where relevant.\n"
    )
}

/// Staged learning-plan prompt for a topic, level, and duration.
#[inline]
pub fn learning_plan(topic: &str, level: &str, duration: &str) -> String {
    format!(
        "Please create a {duration} study plan for \"{topic}\". My current level is {level}.\n\n\
         Structure the plan as follows:\n\n\
         ## Goals\n\
         - The concrete outcomes this plan should achieve\n\n\
         ## Prerequisites\n\
         - Background knowledge required before starting\n\n\
         ## Learning Path\n\
         ### Stage 1: Fundamentals\n\
         - Material, recommended resources, practice project\n\n\
         ### Stage 2: Deeper Understanding\n\
         - Material, recommended resources, practice project\n\n\
         ### Stage 3: Applied Work\n\
         - Material, recommended resources, capstone project\n\n\
         ## Recommended Resources\n\
         - Books, courses, practice platforms, communities\n\n\
         ## Checkpoints\n\
         - Assessment criteria and exercises for each stage\n\n\
         Make the plan detailed and actionable.\n"
    )
}
