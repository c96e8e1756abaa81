use std::fmt;
use std::str::FromStr;

/// What to do when a step's `forward` fails after its group validated.
///
/// - `Abort`: stop immediately and return the error; no further steps or
///   groups run (default).
/// - `Continue`: log the failure, skip the rest of that group, and carry on
///   with the next group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepFailurePolicy {
    #[default]
    Abort,
    Continue,
}

impl FromStr for StepFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(StepFailurePolicy::Abort),
            "continue" => Ok(StepFailurePolicy::Continue),
            other => Err(format!(
                "invalid step failure policy: {other} (expected \"abort\" or \"continue\")"
            )),
        }
    }
}

impl fmt::Display for StepFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepFailurePolicy::Abort => f.write_str("abort"),
            StepFailurePolicy::Continue => f.write_str("continue"),
        }
    }
}
