use std::fmt;

use serde::{Deserialize, Serialize};

use super::GenerateError;

/// Advisory text every role carries when the pipeline is started without a
/// report. The generation backend is never contacted in that case.
pub const EMPTY_REPORT_ADVICE: &str = "Medical report is empty. Please select a file first.";

/// Text for a successful backend call that returned no usable content.
pub const NO_RESPONSE_TEXT: &str = "No response generated.";

/// Text for roles skipped by a cooperative cancel.
pub const CANCELLED_TEXT: &str = "Analysis cancelled.";

// ═══════════════════════════════════════════════════════════
// Roles
// ═══════════════════════════════════════════════════════════

/// The four analytical perspectives applied to one report.
///
/// Cardiology, Psychology and Pulmonology depend only on the report text;
/// Aggregation consumes the outputs of the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Cardiology,
    Psychology,
    Pulmonology,
    Aggregation,
}

impl Role {
    /// All four roles, Aggregation last.
    pub fn all() -> &'static [Role] {
        &[
            Self::Cardiology,
            Self::Psychology,
            Self::Pulmonology,
            Self::Aggregation,
        ]
    }

    /// The three roles that run against the raw report, in canonical order.
    pub fn independent() -> &'static [Role] {
        &[Self::Cardiology, Self::Psychology, Self::Pulmonology]
    }

    pub fn is_independent(&self) -> bool {
        !matches!(self, Self::Aggregation)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cardiology => "Cardiology",
            Self::Psychology => "Psychology",
            Self::Pulmonology => "Pulmonology",
            Self::Aggregation => "Aggregation",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════
// Role outputs
// ═══════════════════════════════════════════════════════════

/// How a role's generation attempt ended.
///
/// The failure text is already in its displayable form; `RoleOutput::as_text`
/// renders both variants uniformly for display, file sections, and the
/// Aggregation prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "text")]
pub enum Outcome {
    Generated(String),
    Failed(String),
}

/// The text result of exactly one role, immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOutput {
    pub role: Role,
    pub outcome: Outcome,
}

impl RoleOutput {
    /// Fold a backend result into a uniform per-role output.
    ///
    /// Success text is trimmed of leading/trailing whitespace; a trimmed
    /// empty success becomes `NO_RESPONSE_TEXT`; errors render as
    /// `"Error: <cause>"`. Nothing raises past this boundary.
    pub fn from_generation(role: Role, result: Result<String, GenerateError>) -> Self {
        let outcome = match result {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Outcome::Failed(NO_RESPONSE_TEXT.to_string())
                } else {
                    Outcome::Generated(trimmed.to_string())
                }
            }
            Err(e) => Outcome::Failed(format!("Error: {e}")),
        };
        Self { role, outcome }
    }

    pub fn failed(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            outcome: Outcome::Failed(text.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }

    /// The displayable text, whatever the outcome. Failed roles are never
    /// blank: they carry their failure description.
    pub fn as_text(&self) -> &str {
        match &self.outcome {
            Outcome::Generated(text) | Outcome::Failed(text) => text,
        }
    }
}

/// The four outputs of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpinionSet {
    pub cardiology: RoleOutput,
    pub psychology: RoleOutput,
    pub pulmonology: RoleOutput,
    pub aggregation: RoleOutput,
}

impl OpinionSet {
    pub fn get(&self, role: Role) -> &RoleOutput {
        match role {
            Role::Cardiology => &self.cardiology,
            Role::Psychology => &self.psychology,
            Role::Pulmonology => &self.pulmonology,
            Role::Aggregation => &self.aggregation,
        }
    }

    /// Canonical order: Cardiology, Psychology, Pulmonology, Aggregation.
    pub fn iter(&self) -> impl Iterator<Item = &RoleOutput> {
        [
            &self.cardiology,
            &self.psychology,
            &self.pulmonology,
            &self.aggregation,
        ]
        .into_iter()
    }
}

// ═══════════════════════════════════════════════════════════
// Generation seam and scheduling
// ═══════════════════════════════════════════════════════════

/// Generation backend abstraction (allows mocking).
///
/// One operation: text in, text or error out. Synchronous and blocking
/// from the caller's point of view; no retries, no streaming.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// How the three independent roles are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One backend call at a time, matching the reference behavior.
    #[default]
    Sequential,
    /// Fan the three independent roles out across worker threads.
    Concurrent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_roles_end_with_aggregation() {
        let roles = Role::all();
        assert_eq!(roles.len(), 4);
        assert_eq!(roles[3], Role::Aggregation);
    }

    #[test]
    fn independent_roles_exclude_aggregation() {
        let roles = Role::independent();
        assert_eq!(roles.len(), 3);
        assert!(roles.iter().all(|r| r.is_independent()));
    }

    #[test]
    fn role_display_matches_section_names() {
        assert_eq!(Role::Cardiology.to_string(), "Cardiology");
        assert_eq!(Role::Aggregation.to_string(), "Aggregation");
    }

    #[test]
    fn role_serializes_snake_case() {
        let json = serde_json::to_string(&Role::Pulmonology).unwrap();
        assert_eq!(json, "\"pulmonology\"");
    }

    #[test]
    fn successful_generation_is_trimmed() {
        let output =
            RoleOutput::from_generation(Role::Cardiology, Ok("  sinus rhythm  \n".to_string()));
        assert_eq!(output.as_text(), "sinus rhythm");
        assert!(!output.is_failure());
    }

    #[test]
    fn empty_success_becomes_no_response() {
        let output = RoleOutput::from_generation(Role::Psychology, Ok("   ".to_string()));
        assert!(output.is_failure());
        assert_eq!(output.as_text(), NO_RESPONSE_TEXT);
    }

    #[test]
    fn backend_error_renders_with_error_prefix() {
        let output = RoleOutput::from_generation(
            Role::Pulmonology,
            Err(GenerateError::Connection("http://localhost:1".to_string())),
        );
        assert!(output.is_failure());
        assert!(output.as_text().starts_with("Error: "));
        assert!(output.as_text().contains("http://localhost:1"));
    }

    #[test]
    fn opinion_set_iterates_in_canonical_order() {
        let set = OpinionSet {
            cardiology: RoleOutput::failed(Role::Cardiology, "a"),
            psychology: RoleOutput::failed(Role::Psychology, "b"),
            pulmonology: RoleOutput::failed(Role::Pulmonology, "c"),
            aggregation: RoleOutput::failed(Role::Aggregation, "d"),
        };
        let roles: Vec<Role> = set.iter().map(|o| o.role).collect();
        assert_eq!(roles, Role::all());
        assert_eq!(set.get(Role::Psychology).as_text(), "b");
    }
}
