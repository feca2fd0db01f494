//! Prompt Composer: fixed template + normalized results → one request payload.

use std::fmt::Write;

use crate::insights::normalizer::NormalizedResultSet;

/// Renders each test as a labeled block, in the order the normalizer produced.
pub fn format_results(results: &NormalizedResultSet) -> String {
    let mut out = String::from("PSYCHOLOGICAL TEST RESULTS:\n\n");
    for result in results.iter() {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "=== {} ===", result.test_identifier.to_uppercase());
        for (name, value) in &result.attributes {
            let _ = writeln!(out, "{name}: {value}");
        }
        out.push('\n');
    }
    out
}

/// Builds the full prompt. Deterministic for identical inputs.
pub fn compose_prompt(template: &str, results: &NormalizedResultSet) -> String {
    format!(
        "{template}\n\nHere are the test results:\n\n{}",
        format_results(results)
    )
}
