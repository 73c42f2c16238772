//! Field extraction backed by the judgment service

use async_trait::async_trait;
use permitflow_application::{
    ExtractionError, ExtractionRequest, FieldExtractor, JudgmentService,
};
use permitflow_domain::review::extract_json_object;
use permitflow_domain::util::field_key;
use permitflow_domain::{Message, PromptTemplate};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Asks the judgment service to pull missing fields out of a free-form message
pub struct LlmFieldExtractor {
    service: Arc<dyn JudgmentService>,
}

impl LlmFieldExtractor {
    pub fn new(service: Arc<dyn JudgmentService>) -> Self {
        Self { service }
    }
}

/// Scalars become strings; blanks, nulls and nested values are dropped.
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[async_trait]
impl FieldExtractor for LlmFieldExtractor {
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<Option<BTreeMap<String, String>>, ExtractionError> {
        if request.missing_fields.is_empty() {
            return Ok(None);
        }

        let missing: Vec<&str> = request.missing_fields.iter().map(String::as_str).collect();
        let messages = [
            Message::system(PromptTemplate::extraction_system()),
            Message::user(PromptTemplate::extraction_request(
                &request.history,
                &request.message,
                &missing,
            )),
        ];

        let reply = self
            .service
            .complete(&messages)
            .await
            .map_err(|e| ExtractionError::Failed(e.to_string()))?;

        let object = extract_json_object(&reply)
            .ok_or_else(|| ExtractionError::Malformed("no JSON object in reply".to_string()))?;

        let fields: BTreeMap<String, String> = object
            .iter()
            .filter_map(|(key, value)| scalar_text(value).map(|text| (field_key(key), text)))
            .filter(|(key, _)| !key.is_empty())
            .collect();

        Ok((!fields.is_empty()).then_some(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judgment::testing::ScriptedJudgment;
    use permitflow_application::JudgmentError;

    fn request(missing: &[&str]) -> ExtractionRequest {
        ExtractionRequest {
            message: "It's called Atlas and costs 50000".to_string(),
            history: "bot: What is the name of your project?".to_string(),
            missing_fields: missing.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_extracts_and_stringifies_scalars() {
        let service = Arc::new(ScriptedJudgment::reply(
            r#"Sure: {"project_name": " Atlas ", "budget": 50000, "approved": true, "owner": "", "tags": ["a"], "meta": {"x": 1}, "notes": null}"#,
        ));
        let extractor = LlmFieldExtractor::new(service.clone());

        let fields = extractor
            .extract(&request(&["project_name", "budget"]))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fields.len(), 3);
        assert_eq!(fields["project_name"], "Atlas");
        assert_eq!(fields["budget"], "50000");
        assert_eq!(fields["approved"], "true");

        let sent = service.last_request();
        assert!(sent[1].content.contains("project_name, budget"));
        assert!(sent[1].content.contains("costs 50000"));
    }

    #[tokio::test]
    async fn test_reply_keys_are_folded() {
        let extractor = LlmFieldExtractor::new(Arc::new(ScriptedJudgment::reply(
            r#"{"Tech-Stack": "rust", "Owner": "Dana", " ": "x"}"#,
        )));

        let fields = extractor
            .extract(&request(&["owner", "tech_stack"]))
            .await
            .unwrap()
            .unwrap();

        let keys: Vec<_> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["owner", "tech_stack"]);
    }

    #[tokio::test]
    async fn test_nothing_missing_skips_service() {
        let service = Arc::new(ScriptedJudgment::reply(r#"{"budget": "1"}"#));
        let extractor = LlmFieldExtractor::new(service.clone());

        assert_eq!(extractor.extract(&request(&[])).await.unwrap(), None);
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_object_is_none() {
        let extractor = LlmFieldExtractor::new(Arc::new(ScriptedJudgment::reply("{}")));
        assert_eq!(extractor.extract(&request(&["budget"])).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_prose_reply_is_malformed() {
        let extractor =
            LlmFieldExtractor::new(Arc::new(ScriptedJudgment::reply("I could not find any.")));
        assert!(matches!(
            extractor.extract(&request(&["budget"])).await,
            Err(ExtractionError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_service_error_is_failed() {
        let extractor =
            LlmFieldExtractor::new(Arc::new(ScriptedJudgment::fail(JudgmentError::NotConfigured)));
        assert!(matches!(
            extractor.extract(&request(&["budget"])).await,
            Err(ExtractionError::Failed(_))
        ));
    }
}
