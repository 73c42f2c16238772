//! Prompt templates for the judgment service

/// Templates for reviewer and extraction requests
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for a reviewer.
    ///
    /// The built-in reviewers (`cyber`, `infra`, `architecture`) have fixed
    /// briefs; any other reviewer is described by its configured `focus`.
    pub fn reviewer_system(reviewer: &str, focus: Option<&str>) -> String {
        let brief = match (reviewer, focus) {
            (_, Some(focus)) if !focus.trim().is_empty() => format!(
                "You are a {} subject-matter expert evaluating a permit application.\nFocus on: {}",
                reviewer,
                focus.trim()
            ),
            ("cyber", _) => "You are a Cybersecurity SME evaluating a permit application.\n\
                Assess security risks: data exposure, authentication, network surface and compliance."
                .to_string(),
            ("infra", _) => "You are an Infrastructure SME evaluating a permit application.\n\
                Assess infrastructure and operational risks: capacity, availability, cost and supportability."
                .to_string(),
            ("architecture", _) => "You are a Software Architecture SME evaluating a permit application.\n\
                Assess whether the design aligns with enterprise standards, uses approved technology \
                stacks and will scale and remain maintainable."
                .to_string(),
            (other, _) => format!(
                "You are a {} subject-matter expert evaluating a permit application.",
                other
            ),
        };

        format!(
            r#"{brief}

Return a strict JSON object with keys:
- decision: "approve" or "decline"
- justification: short, concrete rationale naming the key factors
- confidence: a float between 0 and 1

JSON only. No extra text."#
        )
    }

    /// User prompt carrying the application to review
    pub fn reviewer_request(application_json: &str) -> String {
        format!("Application details:\n{}", application_json)
    }

    /// System prompt for field extraction
    pub fn extraction_system() -> &'static str {
        r#"You are helping a user fill out a permit application.
Extract values for the requested fields from the user's latest message.
Return a flat JSON object mapping field names to string values.
Omit any field whose value is not present. JSON only."#
    }

    /// User prompt for field extraction
    pub fn extraction_request(history: &str, message: &str, missing_fields: &[&str]) -> String {
        format!(
            r#"Current missing fields: {}

Conversation history:
{}

User message:
{}"#,
            missing_fields.join(", "),
            if history.is_empty() { "(none)" } else { history },
            message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_reviewer_briefs() {
        assert!(PromptTemplate::reviewer_system("cyber", None).contains("Cybersecurity"));
        assert!(PromptTemplate::reviewer_system("infra", None).contains("Infrastructure"));
        assert!(PromptTemplate::reviewer_system("architecture", None).contains("Architecture"));
    }

    #[test]
    fn test_focus_overrides_brief() {
        let prompt = PromptTemplate::reviewer_system("finance", Some("budget realism"));
        assert!(prompt.contains("finance subject-matter expert"));
        assert!(prompt.contains("Focus on: budget realism"));
        assert!(prompt.contains("JSON only"));
    }

    #[test]
    fn test_extraction_request_lists_fields() {
        let prompt =
            PromptTemplate::extraction_request("", "It's called Atlas", &["project_name", "budget"]);
        assert!(prompt.contains("project_name, budget"));
        assert!(prompt.contains("(none)"));
        assert!(prompt.contains("It's called Atlas"));
    }
}
