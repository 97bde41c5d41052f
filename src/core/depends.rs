//! Dependency expression normalization
//!
//! Turns raw `Build-Depends` / `Depends` relation strings into sets of bare
//! package names. Build alternatives are flattened: any of them could satisfy
//! the relation, so every named alternative is treated as a potential
//! predecessor. Runtime relations are only split on `,`, and an alternative
//! group there names no single package and adds no edge.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Marks a build-time substitution variable such as `${shlibs:Depends}`
const SUBSTITUTION_MARKER: char = '$';

/// Separates alternatives inside a relation group
const ALTERNATIVE_MARKER: char = '|';

/// Leading package name of a relation, stopping at version constraints,
/// architecture restrictions, build profiles and multiarch qualifiers.
fn package_name_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([^\s(\[<:]+)").expect("package name pattern is valid"))
}

/// Extract the bare package name from a single relation
fn package_name(relation: &str) -> Option<&str> {
    package_name_regex()
        .captures(relation.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Split a relation list into its comma-separated groups
fn groups(expression: &str) -> impl Iterator<Item = &str> {
    expression
        .split(',')
        .map(str::trim)
        .filter(|group| !group.is_empty())
}

/// Split a relation list into its alternatives
fn alternatives(expression: &str) -> impl Iterator<Item = &str> {
    groups(expression)
        .flat_map(|group| group.split(ALTERNATIVE_MARKER))
        .map(str::trim)
        .filter(|alt| !alt.is_empty())
}

/// Normalize a source package's build dependencies
///
/// `"debhelper-compat (= 13), python3-dev | python3-all-dev"` yields
/// `{debhelper-compat, python3-all-dev, python3-dev}`.
pub fn normalize_build_depends(expression: &str) -> BTreeSet<String> {
    alternatives(expression)
        .filter_map(package_name)
        .map(ToString::to_string)
        .collect()
}

/// Normalize a binary package's runtime dependencies
///
/// Tokens carrying a substitution variable or an alternative group are not
/// single package names and are dropped.
pub fn normalize_runtime_depends(expression: &str) -> BTreeSet<String> {
    groups(expression)
        .filter(|group| !group.contains(SUBSTITUTION_MARKER) && !group.contains(ALTERNATIVE_MARKER))
        .filter_map(package_name)
        .map(ToString::to_string)
        .collect()
}
