//! The diagnostic record: severity, structured payload, hints, relations.
//!
//! Diagnostics are data first. The `message` is rendered for humans, but
//! everything a machine consumer needs - the code, the structured payload,
//! the hint templates, the repair back-links - is carried alongside it.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use clank_ir::{NodeId, Span};

use crate::{DiagnosticId, ErrorCode, RepairId};

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
            Severity::Info => f.write_str("info"),
            Severity::Hint => f.write_str("hint"),
        }
    }
}

/// Confidence attached to hints and repairs.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// The strategy a hint proposes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HintStrategy {
    /// Guard the operation with a conditional.
    Guard,
    /// Strengthen a parameter's refinement.
    RefineParam,
    /// Insert a runtime assertion.
    Assert,
    /// Informational context only.
    Info,
}

/// A structured hint attached to a diagnostic or obligation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Hint {
    pub strategy: HintStrategy,
    pub description: String,
    /// Machine-insertable code template, when the strategy has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    pub confidence: Confidence,
}

impl Hint {
    pub fn new(
        strategy: HintStrategy,
        description: impl Into<String>,
        confidence: Confidence,
    ) -> Self {
        Hint {
            strategy,
            description: description.into(),
            template: None,
            confidence,
        }
    }

    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }
}

/// Related location with an explanatory message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Related {
    pub message: String,
    pub location: Span,
}

/// A missing pattern, with enough detail for the repair generator to
/// synthesize a concrete arm.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingPattern {
    /// Rendered pattern text, e.g. `Pending` or `Circle(_)`.
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    pub has_payload: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_names: Vec<String>,
}

/// String-keyed counterexample map; `_`-prefixed keys are metadata.
pub type Counterexample = BTreeMap<String, String>;

/// Machine-readable payload driving repair generation.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Structured {
    /// Discriminator, e.g. `similar_names`, `immutable_assign`.
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub similar_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub similar_fields: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub similar_types: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_patterns: Vec<MissingPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_arity: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_arity: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterexample: Option<Counterexample>,
}

impl Structured {
    pub fn new(kind: impl Into<String>) -> Self {
        Structured {
            kind: kind.into(),
            ..Structured::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(effect.into());
        self
    }

    #[must_use]
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    #[must_use]
    pub fn with_types(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    #[must_use]
    pub fn with_arity(mut self, expected: usize, found: usize) -> Self {
        self.expected_arity = Some(expected);
        self.found_arity = Some(found);
        self
    }

    #[must_use]
    pub fn with_similar_names(mut self, names: Vec<String>) -> Self {
        self.similar_names = names;
        self
    }

    #[must_use]
    pub fn with_similar_fields(mut self, fields: Vec<String>) -> Self {
        self.similar_fields = fields;
        self
    }

    #[must_use]
    pub fn with_similar_types(mut self, types: Vec<String>) -> Self {
        self.similar_types = types;
        self
    }

    #[must_use]
    pub fn with_missing_patterns(mut self, patterns: Vec<MissingPattern>) -> Self {
        self.missing_patterns = patterns;
        self
    }

    #[must_use]
    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    #[must_use]
    pub fn with_counterexample(mut self, counterexample: Counterexample) -> Self {
        self.counterexample = Some(counterexample);
        self
    }
}

/// A compiler diagnostic.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[must_use = "diagnostics should be emitted into a collector, not dropped"]
pub struct Diagnostic {
    /// Unique within one compilation; allocated by the collector.
    pub id: DiagnosticId,
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    pub location: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_node_id: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured: Option<Structured>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<Related>,
    /// Back-links to repair candidates; populated by the aggregator.
    pub repair_refs: Vec<RepairId>,
}

impl Diagnostic {
    /// Create a diagnostic at the code's default severity. The id is a
    /// placeholder until the collector assigns the real one.
    pub fn new(code: ErrorCode, message: impl Into<String>, location: Span) -> Self {
        Diagnostic {
            id: DiagnosticId::from_raw(0),
            severity: code.default_severity(),
            code,
            message: message.into(),
            location,
            primary_node_id: None,
            structured: None,
            hints: Vec::new(),
            related: Vec::new(),
            repair_refs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn with_node(mut self, node: NodeId) -> Self {
        self.primary_node_id = Some(node);
        self
    }

    #[must_use]
    pub fn with_structured(mut self, structured: Structured) -> Self {
        self.structured = Some(structured);
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: Hint) -> Self {
        self.hints.push(hint);
        self
    }

    #[must_use]
    pub fn with_related(mut self, message: impl Into<String>, location: Span) -> Self {
        self.related.push(Related {
            message: message.into(),
            location,
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        if !self.location.is_dummy() {
            write!(f, "\n  --> {}", self.location)?;
        }
        for hint in &self.hints {
            write!(f, "\n  = help: {}", hint.description)?;
        }
        for related in &self.related {
            write!(f, "\n  = note: {} ({})", related.message, related.location)?;
        }
        Ok(())
    }
}
