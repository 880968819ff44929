use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Fatal,
}

impl DiagnosticLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Fatal => "fatal",
        }
    }
}

/// A caller-visible message produced while comparing.
///
/// The engine never formats these for a particular medium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub sheet: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn info(sheet: Option<&str>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, sheet, message)
    }

    pub fn warning(sheet: Option<&str>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, sheet, message)
    }

    pub fn fatal(sheet: Option<&str>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Fatal, sheet, message)
    }

    fn new(level: DiagnosticLevel, sheet: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            level,
            sheet: sheet.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn is_warning(&self) -> bool {
        self.level == DiagnosticLevel::Warning
    }

    pub fn is_fatal(&self) -> bool {
        self.level == DiagnosticLevel::Fatal
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sheet {
            Some(sheet) => write!(f, "[{}] {sheet}: {}", self.level.as_str(), self.message),
            None => write!(f, "[{}] {}", self.level.as_str(), self.message),
        }
    }
}
