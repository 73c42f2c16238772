//! Permit type configuration from TOML (`[[permits]]` array)
//!
//! ```toml
//! [[permits]]
//! name = "Permit to Build"
//! required_fields = [
//!     "project_name",
//!     { name = "budget", question = "What is the estimated budget?" },
//! ]
//! phase_prompts = [
//!     ["Welcome to the build tollgate."],     # 1: intake
//!     ["Shall I submit this for review?"],    # 2: review
//!     ["Thank you, here is the outcome."],    # 3: finalize
//! ]
//! ```

use permitflow_domain::util::{field_key, normalize_key};
use permitflow_domain::{
    ConfigIssue, ConfigIssueCode, PermitCatalog, PermitDefinition, RequiredField,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A required field: either a bare name or a name with a custom question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileRequiredField {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        question: Option<String>,
    },
}

impl FileRequiredField {
    pub fn name(&self) -> &str {
        match self {
            FileRequiredField::Name(name) => name,
            FileRequiredField::Detailed { name, .. } => name,
        }
    }

    fn asked(name: &str, question: &str) -> Self {
        FileRequiredField::Detailed {
            name: name.to_string(),
            question: Some(question.to_string()),
        }
    }

    pub fn to_required_field(&self) -> RequiredField {
        match self {
            FileRequiredField::Name(name) => RequiredField::new(name.trim()),
            FileRequiredField::Detailed { name, question } => {
                let field = RequiredField::new(name.trim());
                match question {
                    Some(q) if !q.trim().is_empty() => field.with_question(q.trim()),
                    _ => field,
                }
            }
        }
    }
}

/// One permit type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePermitConfig {
    pub name: String,
    #[serde(default)]
    pub required_fields: Vec<FileRequiredField>,
    /// Prompt lists indexed by phase number - 1
    #[serde(default)]
    pub phase_prompts: Vec<Vec<String>>,
}

impl FilePermitConfig {
    pub fn to_definition(&self) -> PermitDefinition {
        PermitDefinition::new(
            self.name.trim(),
            self.required_fields
                .iter()
                .map(FileRequiredField::to_required_field)
                .collect(),
        )
        .with_phase_prompts(self.phase_prompts.clone())
    }
}

/// Built-in permit types used when no `[[permits]]` are configured
pub fn default_permits() -> Vec<FilePermitConfig> {
    vec![
        FilePermitConfig {
            name: "Permit to Build".to_string(),
            required_fields: vec![
                FileRequiredField::asked("project_name", "What is the name of your project?"),
                FileRequiredField::asked(
                    "description",
                    "Please provide a brief description of the project.",
                ),
                FileRequiredField::asked("tech_stack", "What is the proposed technology stack?"),
                FileRequiredField::asked(
                    "compliance_level",
                    "What is the compliance level (High, Medium, Low)?",
                ),
                FileRequiredField::asked("budget", "What is the estimated budget?"),
            ],
            phase_prompts: Vec::new(),
        },
        FilePermitConfig {
            name: "Permit to Design".to_string(),
            required_fields: vec![
                FileRequiredField::Name("service_name".to_string()),
                FileRequiredField::Name("owner".to_string()),
                FileRequiredField::asked(
                    "data_classification",
                    "How is the service's data classified (public, internal, confidential)?",
                ),
            ],
            phase_prompts: Vec::new(),
        },
    ]
}

pub fn to_catalog(permits: &[FilePermitConfig]) -> PermitCatalog {
    PermitCatalog::new(permits.iter().map(FilePermitConfig::to_definition).collect())
}

pub fn validate_permits(permits: &[FilePermitConfig]) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if permits.is_empty() {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::NoPermitTypes,
            "permits: at least one permit type must be configured",
        ));
    }

    let mut seen = HashSet::new();
    for permit in permits {
        if !seen.insert(normalize_key(&permit.name)) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::DuplicatePermitType,
                format!("permits: '{}' is configured more than once", permit.name),
            ));
        }
        if permit
            .required_fields
            .iter()
            .all(|f| field_key(f.name()).is_empty())
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::PermitWithoutFields,
                format!("permits: '{}' has no required fields", permit.name),
            ));
        }

        let mut keys = HashSet::new();
        for field in &permit.required_fields {
            let key = field_key(field.name());
            if key.is_empty() {
                continue;
            }
            if !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidFieldName,
                    format!(
                        "permits: '{}' field '{}' may only use letters, digits, spaces, '-' and '_'",
                        permit.name,
                        field.name()
                    ),
                ));
            } else if !keys.insert(key.clone()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateField,
                    format!(
                        "permits: '{}' lists field '{}' more than once",
                        permit.name, key
                    ),
                ));
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_mixed_required_fields() {
        let toml_str = r#"
[[permits]]
name = "Permit to Build"
required_fields = ["owner", { name = "budget", question = "How much?" }]
phase_prompts = [["Hello"], [], ["Bye"]]
"#;
        #[derive(Deserialize)]
        struct Wrapper {
            permits: Vec<FilePermitConfig>,
        }
        let wrapper: Wrapper = toml::from_str(toml_str).unwrap();
        let definition = wrapper.permits[0].to_definition();

        assert_eq!(definition.required_fields[0], RequiredField::new("owner"));
        assert_eq!(
            definition.required_fields[1],
            RequiredField::new("budget").with_question("How much?")
        );
        assert_eq!(definition.prompts_for(1), ["Hello".to_string()]);
        assert!(definition.prompts_for(2).is_empty());
    }

    #[test]
    fn test_default_permits_are_valid() {
        let permits = default_permits();
        assert!(validate_permits(&permits).is_empty());
        let catalog = to_catalog(&permits);
        assert!(catalog.lookup("permit to build").is_ok());
        assert!(catalog.lookup("Permit to Design").is_ok());
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            validate_permits(&[])[0].code,
            ConfigIssueCode::NoPermitTypes
        );

        let permits = vec![
            FilePermitConfig {
                name: "Permit to Build".to_string(),
                required_fields: vec![],
                phase_prompts: vec![],
            },
            FilePermitConfig {
                name: "permit  to build".to_string(),
                required_fields: vec![FileRequiredField::Name("owner".to_string())],
                phase_prompts: vec![],
            },
        ];
        let codes: Vec<_> = validate_permits(&permits).into_iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![
                ConfigIssueCode::PermitWithoutFields,
                ConfigIssueCode::DuplicatePermitType
            ]
        );
    }

    #[test]
    fn test_field_names_are_folded_to_record_keys() {
        let permit = FilePermitConfig {
            name: "Permit to Ship".to_string(),
            required_fields: vec![
                FileRequiredField::Name("Owner".to_string()),
                FileRequiredField::Detailed {
                    name: " Tech-Stack ".to_string(),
                    question: Some("Which stack?".to_string()),
                },
            ],
            phase_prompts: vec![],
        };
        assert!(validate_permits(std::slice::from_ref(&permit)).is_empty());

        let definition = permit.to_definition();
        let names: Vec<_> = definition
            .required_fields
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["owner", "tech_stack"]);
    }

    #[test]
    fn test_field_name_validation() {
        let permits = vec![FilePermitConfig {
            name: "Permit to Ship".to_string(),
            required_fields: vec![
                FileRequiredField::Name("tech-stack".to_string()),
                FileRequiredField::Name("Tech Stack".to_string()),
                FileRequiredField::Name("cost (usd)".to_string()),
            ],
            phase_prompts: vec![],
        }];
        let codes: Vec<_> = validate_permits(&permits).into_iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![ConfigIssueCode::DuplicateField, ConfigIssueCode::InvalidFieldName]
        );
    }
}
