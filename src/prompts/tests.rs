use super::*;

#[test]
fn explain_topic_mentions_the_topic() {
    let prompt = explain_topic("ownership in Rust");
    assert!(prompt.contains("ownership in Rust"));
    assert!(prompt.contains("definition"));
}

#[test]
fn generate_code_request_is_a_user_message() {
    let message = generate_code_request("Rust", "parse an XML sitemap");
    assert_eq!(message.role, Role::User);
    assert!(message.content.contains("Rust function"));
    assert!(message.content.contains("parse an XML sitemap"));
}

#[test]
fn start_roleplay_returns_user_then_assistant() {
    let messages = start_roleplay("a ship's navigator");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Assistant);
    assert!(messages[0].content.contains("a ship's navigator"));
    assert!(messages[1].content.contains("a ship's navigator"));
}

#[test]
fn generate_report_includes_statistics() {
    let report = generate_report("Weekly Numbers", &[3, 9, 6]);
    assert!(report.starts_with("# Weekly Numbers"));
    assert!(report.contains("- Item 1: 3"));
    assert!(report.contains("- Item 3: 6"));
    assert!(report.contains("- Count: 3"));
    assert!(report.contains("- Maximum: 9"));
    assert!(report.contains("- Minimum: 3"));
    assert!(report.contains("- Mean: 6.00"));
}

#[test]
fn generate_report_handles_empty_data() {
    let report = generate_report("Empty", &[]);
    assert!(report.contains("- Count: 0"));
    assert!(report.contains("- Maximum: N/A"));
    assert!(report.contains("- Minimum: N/A"));
    assert!(report.contains("- Mean: N/A"));
}

#[test]
fn code_review_fences_the_code() {
    let review = code_review("python", "def f():\n    return 1");
    assert!(review.contains("```python\ndef f():\n    return 1\n```"));
    assert!(review.contains("Error handling"));
}

#[test]
fn learning_plan_uses_all_inputs() {
    let plan = learning_plan("async Rust", "intermediate", "six week");
    assert!(plan.contains("async Rust"));
    assert!(plan.contains("intermediate"));
    assert!(plan.contains("six week"));
    assert!(plan.contains("## Learning Path"));
}

#[test]
fn template_message_serializes_with_lowercase_role() {
    let message = TemplateMessage::assistant("hello".to_string());
    let json = serde_json::to_value(&message).expect("serializes");
    assert_eq!(json["role"], "assistant");
    assert_eq!(json["content"], "hello");
}
