use serde::{Deserialize, Serialize};

/// Outcome of one executed test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Success,
    Failed,
    Error,
    Skipped,
    Inconclusive,
}

impl TestStatus {
    /// Resolve a Gallio `outcome` (`status`, `category`) pair.
    ///
    /// | status         | category            | result         |
    /// |----------------|---------------------|----------------|
    /// | `passed`       | any                 | `Success`      |
    /// | `failed`       | `error`, `timeout`  | `Error`        |
    /// | `failed`       | other or none       | `Failed`       |
    /// | `skipped`      | any                 | `Skipped`      |
    /// | `inconclusive` | any                 | `Inconclusive` |
    /// | anything else  | any                 | `Inconclusive` |
    ///
    /// Comparison ignores ASCII case. Unknown statuses are logged and never
    /// resolve to `Success`.
    pub fn from_outcome(status: &str, category: Option<&str>) -> Self {
        let status = status.trim();
        let category = category.map(str::trim).unwrap_or_default();
        if status.eq_ignore_ascii_case("passed") {
            TestStatus::Success
        } else if status.eq_ignore_ascii_case("failed") {
            if category.eq_ignore_ascii_case("error") || category.eq_ignore_ascii_case("timeout") {
                TestStatus::Error
            } else {
                TestStatus::Failed
            }
        } else if status.eq_ignore_ascii_case("skipped") {
            TestStatus::Skipped
        } else if status.eq_ignore_ascii_case("inconclusive") {
            TestStatus::Inconclusive
        } else {
            tracing::warn!(status, category, "unknown test outcome, recording as inconclusive");
            TestStatus::Inconclusive
        }
    }

    /// Resolve the NUnit 2 `executed` / `success` attribute pair.
    pub fn from_execution(executed: bool, success: bool) -> Self {
        match (executed, success) {
            (false, _) => TestStatus::Skipped,
            (true, true) => TestStatus::Success,
            (true, false) => TestStatus::Failed,
        }
    }

    /// Failed and errored outcomes carry messages and stack traces.
    pub fn is_failure(self) -> bool {
        matches!(self, TestStatus::Failed | TestStatus::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Success => "success",
            TestStatus::Failed => "failed",
            TestStatus::Error => "error",
            TestStatus::Skipped => "skipped",
            TestStatus::Inconclusive => "inconclusive",
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
