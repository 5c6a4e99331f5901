//! Diagnostic types - the output of constraint validation.

use crate::Severity;

/// The output of one constraint check against one matching entity.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub constraint_name: String,
    pub entity_name: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        constraint_name: impl Into<String>,
        entity_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            constraint_name: constraint_name.into(),
            entity_name: entity_name.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

/// Ordered collection of diagnostics from one validation run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Check if any error-severity diagnostic fired.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    pub fn all(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        if self.diagnostics.is_empty() {
            return "no violations found".to_string();
        }
        format!(
            "{} violation(s): {} error(s), {} warning(s)",
            self.len(),
            self.error_count(),
            self.warning_count()
        )
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
