//! SCS exit codes.

/// Exit status returned by `scs()` and stored in `ScsInfo::status_val`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// Solved to reduced accuracy.
    SolvedInaccurate,
    Solved,
    /// Solver stopped before a verdict.
    Unfinished,
    Unbounded,
    Infeasible,
    /// Neither a solution nor a certificate was found.
    Indeterminate,
    Failed,
    /// Interrupted by SIGINT.
    Sigint,
    UnboundedInaccurate,
    InfeasibleInaccurate,
}

impl SolveStatus {
    /// Numeric code as defined in `glbopts.h`.
    pub fn code(self) -> i64 {
        match self {
            SolveStatus::SolvedInaccurate => 2,
            SolveStatus::Solved => 1,
            SolveStatus::Unfinished => 0,
            SolveStatus::Unbounded => -1,
            SolveStatus::Infeasible => -2,
            SolveStatus::Indeterminate => -3,
            SolveStatus::Failed => -4,
            SolveStatus::Sigint => -5,
            SolveStatus::UnboundedInaccurate => -6,
            SolveStatus::InfeasibleInaccurate => -7,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        let status = match code {
            2 => SolveStatus::SolvedInaccurate,
            1 => SolveStatus::Solved,
            0 => SolveStatus::Unfinished,
            -1 => SolveStatus::Unbounded,
            -2 => SolveStatus::Infeasible,
            -3 => SolveStatus::Indeterminate,
            -4 => SolveStatus::Failed,
            -5 => SolveStatus::Sigint,
            -6 => SolveStatus::UnboundedInaccurate,
            -7 => SolveStatus::InfeasibleInaccurate,
            _ => return None,
        };
        Some(status)
    }

    /// Status text in the form SCS writes into `ScsInfo::status`.
    pub fn as_str(self) -> &'static str {
        match self {
            SolveStatus::SolvedInaccurate => "solved (inaccurate)",
            SolveStatus::Solved => "solved",
            SolveStatus::Unfinished => "unfinished",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Indeterminate => "indeterminate",
            SolveStatus::Failed => "failure",
            SolveStatus::Sigint => "interrupted",
            SolveStatus::UnboundedInaccurate => "unbounded (inaccurate)",
            SolveStatus::InfeasibleInaccurate => "infeasible (inaccurate)",
        }
    }

    pub fn is_solved(self) -> bool {
        matches!(self, SolveStatus::Solved | SolveStatus::SolvedInaccurate)
    }

    pub fn is_infeasible(self) -> bool {
        matches!(
            self,
            SolveStatus::Infeasible | SolveStatus::InfeasibleInaccurate
        )
    }

    pub fn is_unbounded(self) -> bool {
        matches!(
            self,
            SolveStatus::Unbounded | SolveStatus::UnboundedInaccurate
        )
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SolveStatus; 10] = [
        SolveStatus::SolvedInaccurate,
        SolveStatus::Solved,
        SolveStatus::Unfinished,
        SolveStatus::Unbounded,
        SolveStatus::Infeasible,
        SolveStatus::Indeterminate,
        SolveStatus::Failed,
        SolveStatus::Sigint,
        SolveStatus::UnboundedInaccurate,
        SolveStatus::InfeasibleInaccurate,
    ];

    #[test]
    fn test_codes_match_library() {
        let codes: Vec<i64> = ALL.iter().map(|status| status.code()).collect();
        assert_eq!(codes, vec![2, 1, 0, -1, -2, -3, -4, -5, -6, -7]);
        for status in ALL {
            assert_eq!(SolveStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(SolveStatus::from_code(3), None);
        assert_eq!(SolveStatus::from_code(-8), None);
    }

    #[test]
    fn test_status_families() {
        assert!(SolveStatus::SolvedInaccurate.is_solved());
        assert!(SolveStatus::UnboundedInaccurate.is_unbounded());
        assert!(SolveStatus::InfeasibleInaccurate.is_infeasible());
        assert!(!SolveStatus::Failed.is_solved());
        assert_eq!(SolveStatus::Failed.to_string(), "failure");
    }
}
