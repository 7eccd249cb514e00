//! Positional placeholder substitution
//!
//! Templates refer to parameters by index: `"Hello, {0}!"`. Whitespace inside the
//! braces is tolerated (`{ 0 }`). Parameters are substituted in ascending index
//! order and a placeholder without a matching parameter is left as written.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*(\d+)\s*\}").expect("placeholder pattern is valid"));

/// Substitute `parameters` into `template`
///
/// # Example
///
/// ```ignore
/// let text = interpolate("{0} and {1}", &["A".to_string()]);
/// assert_eq!(text, "A and {1}");
/// ```
pub fn interpolate(template: &str, parameters: &[String]) -> String {
    let mut result = template.to_string();
    if parameters.is_empty() {
        return result;
    }

    for (index, parameter) in parameters.iter().enumerate() {
        let index = index.to_string();
        let replaced = PLACEHOLDER.replace_all(&result, |caps: &Captures| {
            if caps[1] == index {
                parameter.clone()
            } else {
                caps[0].to_string()
            }
        });
        result = replaced.into_owned();
    }
    result
}

/// Indices of the placeholders used by `template`, sorted and deduplicated
pub fn placeholder_indices(template: &str) -> Vec<usize> {
    let mut indices: Vec<usize> = PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps[1].parse().ok())
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}
