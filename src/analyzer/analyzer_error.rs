use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    /// AST shape with no typing rule, carrying the offending SQL text.
    Unsupported(String),
    UnificationClash { left: String, right: String, expression: String },
    UnknownCollection(String),
    UnknownColumn { name: String, candidates: Vec<String> },
    AmbiguousColumn { name: String, matches: Vec<(String, String)> }, // (collection, column)
    FunctionNotFound(String),
    FunctionArgMismatch { name: String, expected: String, got: usize },
    ColumnCountMismatch { expected: usize, got: usize },
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerError::Unsupported(sql) => write!(f, "Unsupported expression: {}", sql),
            AnalyzerError::UnificationClash { left, right, expression } => {
                write!(f, "Type mismatch: {} and {} in '{}'", left, right, expression)
            }
            AnalyzerError::UnknownCollection(name) => write!(f, "Unknown table '{}'", name),
            AnalyzerError::UnknownColumn { name, candidates } if candidates.is_empty() => {
                write!(f, "Unknown column '{}'", name)
            }
            AnalyzerError::UnknownColumn { name, candidates } => {
                write!(f, "Unknown column '{}' (available: {})", name, candidates.join(", "))
            }
            AnalyzerError::AmbiguousColumn { name, matches } => {
                let tables = matches.iter().map(|(coll, col)| format!("{}.{}", coll, col)).collect::<Vec<_>>();
                write!(f, "Column '{}' is ambiguous: {}", name, tables.join(", "))
            }
            AnalyzerError::FunctionNotFound(name) => write!(f, "Function not supported: {}", name),
            AnalyzerError::FunctionArgMismatch { name, expected, got } => {
                write!(f, "{} expects {} argument(s), got {}", name, expected, got)
            }
            AnalyzerError::ColumnCountMismatch { expected, got } => {
                write!(f, "Column count doesn't match value count: expected {}, got {}", expected, got)
            }
        }
    }
}

impl std::error::Error for AnalyzerError {}
