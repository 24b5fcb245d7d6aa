//! Validate scripts without running them

use super::CliError;
use crate::{Grammar, PlanBuilder, Step};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Script text
    pub code: String,
    /// Return the built plan instead of a summary
    pub show_plan: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Script parsed and planned into this many steps
    Valid { steps: usize },
    /// The plan itself
    Plan(Vec<Step>),
}

/// Parse and plan a script; data files are never opened
pub fn execute_check(grammar: &Grammar, options: &CheckOptions) -> Result<CheckResult, CliError> {
    if options.code.trim().is_empty() {
        return Err(CliError::NoInput);
    }

    let script = grammar.parse(&options.code)?;
    let steps = PlanBuilder::new().build(&script)?;

    if options.show_plan {
        return Ok(CheckResult::Plan(steps));
    }
    Ok(CheckResult::Valid { steps: steps.len() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(code: &str, show_plan: bool) -> Result<CheckResult, CliError> {
        execute_check(
            &Grammar::new(),
            &CheckOptions {
                code: code.to_string(),
                show_plan,
            },
        )
    }

    #[test]
    fn counts_steps() {
        let result = check("DATA a; SET a.csv; RUN; PROC MEANS; RUN;", false).unwrap();
        assert!(matches!(result, CheckResult::Valid { steps: 2 }));
    }

    #[test]
    fn returns_plan() {
        let result = check("PROC FREQ; TABLES gender; RUN;", true).unwrap();
        let CheckResult::Plan(steps) = result else {
            panic!("expected a plan");
        };
        assert_eq!(steps[0].describe(), "PROC FREQ");
    }

    #[test]
    fn reports_plan_errors() {
        let result = check("DATA a; WHERE x > 1; RUN;", false);
        assert!(matches!(result, Err(CliError::Fatal(_))));
    }

    #[test]
    fn empty_script_is_no_input() {
        assert!(matches!(check("  \n", false), Err(CliError::NoInput)));
    }
}
