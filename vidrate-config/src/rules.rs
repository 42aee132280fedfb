//! URL rule evaluation.
//!
//! Decides whether a page URL should receive speed control. The include list
//! takes strict precedence over the exclude list: the two are never combined,
//! giving a simple allow-list mode vs deny-list mode without boolean rule
//! composition. A malformed pattern is logged and treated as non-matching,
//! never fatal.

use crate::settings::Settings;
use regex::Regex;

/// Decide whether speed control applies to `url` under `settings`.
///
/// - `global_enabled == false` always yields `false`.
/// - Non-empty `include_rules`: `true` iff at least one pattern matches.
/// - Otherwise, non-empty `exclude_rules`: `false` iff at least one matches.
/// - Both empty: `true`.
pub fn should_apply(url: &str, settings: &Settings) -> bool {
    if !settings.global_enabled {
        return false;
    }

    if !settings.include_rules.is_empty() {
        return settings
            .include_rules
            .iter()
            .any(|rule| rule_matches(rule, url, "include"));
    }

    if !settings.exclude_rules.is_empty() {
        let excluded = settings
            .exclude_rules
            .iter()
            .any(|rule| rule_matches(rule, url, "exclude"));
        return !excluded;
    }

    true
}

fn rule_matches(pattern: &str, url: &str, kind: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(url),
        Err(e) => {
            log::warn!("Invalid {kind} rule '{pattern}': {e}");
            false
        }
    }
}

/// Precompiled form of the rule lists for repeated evaluation.
///
/// A page session evaluates its URL on every guarded operation and every
/// reconciliation tick, so patterns are compiled once per settings reload.
/// Malformed patterns are skipped with a warning; an include list whose
/// patterns all failed to compile still counts as allow-list mode and matches
/// nothing, which is exactly what per-call compilation would decide.
#[derive(Debug)]
pub struct CompiledRules {
    enabled: bool,
    include_mode: bool,
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl CompiledRules {
    /// Compile the rule lists from a settings snapshot.
    pub fn new(settings: &Settings) -> Self {
        Self {
            enabled: settings.global_enabled,
            include_mode: !settings.include_rules.is_empty(),
            include: compile_list(&settings.include_rules, "include"),
            exclude: compile_list(&settings.exclude_rules, "exclude"),
        }
    }

    /// Same decision as [`should_apply`], against the precompiled patterns.
    pub fn should_apply(&self, url: &str) -> bool {
        if !self.enabled {
            return false;
        }
        if self.include_mode {
            return self.include.iter().any(|re| re.is_match(url));
        }
        if !self.exclude.is_empty() {
            return !self.exclude.iter().any(|re| re.is_match(url));
        }
        true
    }
}

fn compile_list(rules: &[String], kind: &str) -> Vec<Regex> {
    rules
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                log::warn!("Skipping invalid {kind} rule '{pattern}': {e}");
                None
            }
        })
        .collect()
}
