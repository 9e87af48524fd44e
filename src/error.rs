//! Error handling for the MRUP oracle.
//!
//! Only input contract violations are errors. Cardinality and partition
//! mismatches are verdicts and never surface here.
//!
//! Every variant carries a stable numeric code so harnesses and the CLI can
//! report failures without matching on message text.

use thiserror::Error;

/// Error codes for comparator input violations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[allow(non_camel_case_types)]
pub enum ErrorCode {
    /// E100_InvalidCase (code 100)
    #[error("E100_InvalidCase({0})")]
    E100_InvalidCase(/* reason */ String),

    /// E101_Io (code 101)
    #[error("E101_Io({0})")]
    E101_Io(/* reason */ String),

    /// E200_SchemaTooNarrow (code 200)
    #[error("E200_SchemaTooNarrow({0})")]
    E200_SchemaTooNarrow(/* count */ u64),

    /// E201_DuplicateColumn (code 201)
    #[error("E201_DuplicateColumn({0})")]
    E201_DuplicateColumn(/* column */ String),

    /// E202_RowArity (code 202)
    #[error("E202_RowArity({0}, {1}, {2})")]
    E202_RowArity(/* index */ u64, /* expected */ u64, /* got */ u64),

    /// E203_SchemaMismatch (code 203)
    #[error("E203_SchemaMismatch({0}, {1})")]
    E203_SchemaMismatch(/* expected */ u64, /* got */ u64),

    /// E300_UnresolvedOrderColumn (code 300)
    #[error("E300_UnresolvedOrderColumn({0}, {1})")]
    E300_UnresolvedOrderColumn(/* index */ u64, /* count */ u64),

    /// E301_UnknownColumn (code 301)
    #[error("E301_UnknownColumn({0})")]
    E301_UnknownColumn(/* column */ String),

    /// E302_MalformedWindow (code 302)
    #[error("E302_MalformedWindow({0})")]
    E302_MalformedWindow(/* reason */ String),

    /// E303_PartitionNotLeading (code 303)
    #[error("E303_PartitionNotLeading({0})")]
    E303_PartitionNotLeading(/* column */ String),

    /// E400_PartitionOverlap (code 400)
    #[error("E400_PartitionOverlap({0})")]
    E400_PartitionOverlap(/* key */ String),
}

impl ErrorCode {
    /// Get the numeric error code.
    pub fn code(&self) -> u32 {
        match self {
            ErrorCode::E100_InvalidCase(_) => 100,
            ErrorCode::E101_Io(_) => 101,
            ErrorCode::E200_SchemaTooNarrow(_) => 200,
            ErrorCode::E201_DuplicateColumn(_) => 201,
            ErrorCode::E202_RowArity(_, _, _) => 202,
            ErrorCode::E203_SchemaMismatch(_, _) => 203,
            ErrorCode::E300_UnresolvedOrderColumn(_, _) => 300,
            ErrorCode::E301_UnknownColumn(_) => 301,
            ErrorCode::E302_MalformedWindow(_) => 302,
            ErrorCode::E303_PartitionNotLeading(_) => 303,
            ErrorCode::E400_PartitionOverlap(_) => 400,
        }
    }

    /// Get the error name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::E100_InvalidCase(_) => "E100_InvalidCase",
            ErrorCode::E101_Io(_) => "E101_Io",
            ErrorCode::E200_SchemaTooNarrow(_) => "E200_SchemaTooNarrow",
            ErrorCode::E201_DuplicateColumn(_) => "E201_DuplicateColumn",
            ErrorCode::E202_RowArity(_, _, _) => "E202_RowArity",
            ErrorCode::E203_SchemaMismatch(_, _) => "E203_SchemaMismatch",
            ErrorCode::E300_UnresolvedOrderColumn(_, _) => "E300_UnresolvedOrderColumn",
            ErrorCode::E301_UnknownColumn(_) => "E301_UnknownColumn",
            ErrorCode::E302_MalformedWindow(_) => "E302_MalformedWindow",
            ErrorCode::E303_PartitionNotLeading(_) => "E303_PartitionNotLeading",
            ErrorCode::E400_PartitionOverlap(_) => "E400_PartitionOverlap",
        }
    }

    /// True for violations of the result-set schema contract.
    pub fn is_schema_error(&self) -> bool {
        (200..300).contains(&self.code())
    }
}

impl From<std::io::Error> for ErrorCode {
    fn from(e: std::io::Error) -> Self {
        ErrorCode::E101_Io(e.to_string())
    }
}

impl From<serde_json::Error> for ErrorCode {
    fn from(e: serde_json::Error) -> Self {
        ErrorCode::E100_InvalidCase(e.to_string())
    }
}

/// Result type for oracle operations.
pub type OracleResult<T> = Result<T, ErrorCode>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_names() {
        let err = ErrorCode::E202_RowArity(3, 4, 2);
        assert_eq!(err.code(), 202);
        assert_eq!(err.name(), "E202_RowArity");
        assert_eq!(err.to_string(), "E202_RowArity(3, 4, 2)");
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_order_errors_are_not_schema_errors() {
        let err = ErrorCode::E300_UnresolvedOrderColumn(7, 4);
        assert_eq!(err.code(), 300);
        assert!(!err.is_schema_error());
    }

    #[test]
    fn test_json_error_maps_to_invalid_case() {
        let err: ErrorCode = serde_json::from_str::<u32>("not json")
            .map_err(ErrorCode::from)
            .unwrap_err();
        assert_eq!(err.code(), 100);
    }
}
