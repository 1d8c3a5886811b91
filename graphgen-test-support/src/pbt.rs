//! Property-test case budget shared by the property suites.

use std::env;

/// Environment variable overriding the number of proptest cases.
pub const PBT_CASES_ENV_KEY: &str = "GRAPHGEN_PBT_CASES";

/// Returns the case count from [`PBT_CASES_ENV_KEY`], or `default_cases`
/// when the variable is unset or not a positive integer.
///
/// # Examples
/// ```
/// use graphgen_test_support::pbt::cases;
///
/// assert!(cases(32) > 0);
/// ```
#[must_use]
pub fn cases(default_cases: u32) -> u32 {
    env::var(PBT_CASES_ENV_KEY)
        .ok()
        .map_or(default_cases, |raw| parse_cases(&raw, default_cases))
}

fn parse_cases(raw: &str, default_cases: u32) -> u32 {
    match raw.trim().parse::<u32>() {
        Ok(cases) if cases > 0 => cases,
        _ => {
            tracing::warn!(
                env = PBT_CASES_ENV_KEY,
                raw = %raw,
                "invalid property-test case override; using default",
            );
            default_cases
        }
    }
}
