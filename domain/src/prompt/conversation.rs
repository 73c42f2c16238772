//! Fixed conversational replies and the final summary block.

use crate::permit::{ApplicationRecord, RequiredField};
use crate::review::ConsensusResult;

/// Bot replies that are not scripted by the permit catalog
pub struct ConversationText;

impl ConversationText {
    /// First message of a session without an active application
    pub fn permit_type_prompt(permit_types: &[&str]) -> String {
        format!(
            "Welcome to PermitFlow. Which permit would you like to apply for? \
             Reply with the permit type, for example \"{}\". Available: {}.",
            permit_types.first().copied().unwrap_or("Permit to Build"),
            permit_types.join(", ")
        )
    }

    /// Reply to a message that is not shaped like a permit type
    pub fn retry_permit_type(permit_types: &[&str]) -> String {
        format!(
            "Sorry, I didn't catch a permit type. Please reply in the form \"Permit to <purpose>\". \
             Available: {}.",
            permit_types.join(", ")
        )
    }

    /// Reply to a well-formed but unconfigured permit type
    pub fn unknown_permit_type(requested: &str, permit_types: &[&str]) -> String {
        format!(
            "\"{}\" is not a permit type I can process. Please choose one of: {}.",
            requested,
            permit_types.join(", ")
        )
    }

    /// Greeting when an application starts without a scripted first prompt
    pub fn application_started(permit_type: &str) -> String {
        format!("Starting a new {} application.", permit_type)
    }

    /// Conversational ask for one missing field
    pub fn ask_for_field(field: &RequiredField) -> String {
        match &field.question {
            Some(question) => question.clone(),
            None => format!("Could you tell me the {}?", field.label()),
        }
    }

    /// Default reply on entering the review tollgate
    pub fn ready_to_submit() -> &'static str {
        "Great, I have everything I need. Reply with anything to submit the application for review."
    }

    /// Default finalize prompt when none is scripted
    pub fn default_finalize() -> &'static str {
        "The review is complete."
    }

    /// Reply to every message once the session is finalized
    pub fn process_complete() -> &'static str {
        "This application has been processed. The process is complete; start a new session to apply again."
    }

    /// Finalize prompt followed by the fixed-format summary block
    pub fn final_summary(
        finalize_prompt: &str,
        record: &ApplicationRecord,
        result: &ConsensusResult,
    ) -> String {
        let mut out = String::new();
        out.push_str(finalize_prompt);
        out.push_str("\n\n=== Application Summary ===\n");
        out.push_str(&format!("Permit type: {}\n", record.permit_type()));

        out.push_str("Fields:\n");
        for (name, value) in record.fields() {
            out.push_str(&format!("- {}: {}\n", name, value));
        }

        out.push_str("Reviewer decisions:\n");
        for verdict in &result.verdicts {
            out.push_str(&format!(
                "- {}: {} (confidence {:.2})\n",
                verdict.reviewer, verdict.decision, verdict.confidence
            ));
        }

        out.push_str(&format!("Final decision: {}\n", result.decision.as_token()));
        if let Some(reviewer) = &result.vetoed_by {
            out.push_str(&format!("Vetoed by: {}\n", reviewer));
        }
        out.push_str("Justification:\n");
        out.push_str(&result.justification);
        out
    }
}
