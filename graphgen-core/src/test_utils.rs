//! Shared test utilities for `graphgen-core`.

use graphgen_test_support::pbt;
use proptest::test_runner::Config as ProptestConfig;

/// Builds a proptest configuration honouring `GRAPHGEN_PBT_CASES`.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    ProptestConfig {
        cases: pbt::cases(default_cases),
        ..ProptestConfig::default()
    }
}
