//! Referential integrity checks.
//!
//! A synthesized document must be self-consistent before it is handed to
//! the serializer: every name used by a group or rule exists, names are
//! unique, and the rule list ends in exactly one catch-all. A violation
//! means the group/provider templates are broken, not that the input
//! links were bad.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, warn};

use crate::config::StashConfig;
use crate::config::util::is_builtin_target;

// ============================================================================
// Error Types
// ============================================================================

/// A single integrity violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// Two proxies/groups share a name, or one uses a built-in target name.
    DuplicateName {
        /// The duplicated name.
        name: String,
    },

    /// A group lists a member that is not defined.
    GroupMemberNotFound {
        /// The group name.
        group: String,
        /// The missing member.
        member: String,
    },

    /// Groups contain each other.
    GroupCycle {
        /// The group where the cycle was detected.
        group: String,
        /// The cycle path (e.g., `["a", "b", "a"]`).
        cycle: Vec<String>,
    },

    /// A rule routes to an undefined proxy or group.
    RuleTargetNotFound {
        /// The rule index (0-based).
        rule_index: usize,
        /// The referenced target.
        target: String,
    },

    /// A rule reads from an undefined rule provider.
    RuleProviderNotFound {
        /// The rule index (0-based).
        rule_index: usize,
        /// The referenced provider.
        provider: String,
    },

    /// A rule evaluates an undefined script shortcut.
    ScriptShortcutNotFound {
        /// The rule index (0-based).
        rule_index: usize,
        /// The referenced shortcut.
        shortcut: String,
    },

    /// The rule list has no catch-all.
    MissingCatchAll,

    /// A catch-all appears before the end of the rule list.
    CatchAllNotLast {
        /// The rule index (0-based).
        rule_index: usize,
    },
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName { name } => write!(f, "duplicate proxy/group name '{name}'"),
            Self::GroupMemberNotFound { group, member } => {
                write!(f, "group '{group}' references non-existent member '{member}'")
            }
            Self::GroupCycle { group, cycle } => {
                write!(
                    f,
                    "circular reference detected in group '{}': {}",
                    group,
                    cycle.join(" -> ")
                )
            }
            Self::RuleTargetNotFound { rule_index, target } => {
                let rule_num = rule_index + 1;
                write!(f, "rule #{rule_num} references non-existent target '{target}'")
            }
            Self::RuleProviderNotFound {
                rule_index,
                provider,
            } => {
                let rule_num = rule_index + 1;
                write!(
                    f,
                    "rule #{rule_num} references non-existent rule provider '{provider}'"
                )
            }
            Self::ScriptShortcutNotFound {
                rule_index,
                shortcut,
            } => {
                let rule_num = rule_index + 1;
                write!(
                    f,
                    "rule #{rule_num} references non-existent script shortcut '{shortcut}'"
                )
            }
            Self::MissingCatchAll => write!(f, "rule list has no MATCH rule"),
            Self::CatchAllNotLast { rule_index } => {
                let rule_num = rule_index + 1;
                write!(f, "MATCH rule #{rule_num} is not the last rule")
            }
        }
    }
}

/// One or more integrity violations found in a synthesized document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityError {
    pub violations: Vec<IntegrityViolation>,
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "config integrity check failed with {} violation(s)",
            self.violations.len()
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for IntegrityError {}

// ============================================================================
// Validation Result
// ============================================================================

/// Result of document validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of violations found.
    pub violations: Vec<IntegrityViolation>,
}

impl ValidationResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn add(&mut self, violation: IntegrityViolation) {
        self.violations.push(violation);
    }

    /// Convert to a Result type.
    ///
    /// # Errors
    ///
    /// Returns an [`IntegrityError`] carrying every violation if any were found.
    pub fn into_result(self) -> Result<(), IntegrityError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(IntegrityError {
                violations: self.violations,
            })
        }
    }

    /// Log all violations using tracing.
    pub fn log_violations(&self) {
        for violation in &self.violations {
            warn!(violation = %violation, "config integrity violation");
        }
    }
}

// ============================================================================
// Validation Implementation
// ============================================================================

impl StashConfig {
    /// Check the document's referential integrity.
    ///
    /// - Proxy and group names are unique and never shadow `DIRECT`/`REJECT`
    /// - Group members exist, and groups do not contain each other in a cycle
    /// - Rule targets, providers and script shortcuts exist
    /// - Exactly one `MATCH` rule, in last position
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        debug!("starting config integrity check");

        let names = self.collect_names(&mut result);
        debug!(count = names.len(), "collected proxy and group names");

        self.check_group_members(&names, &mut result);
        self.check_group_cycles(&mut result);
        self.check_rule_refs(&names, &mut result);
        self.check_catch_all(&mut result);

        if result.is_ok() {
            debug!("config integrity check passed");
        } else {
            warn!(
                violation_count = result.violation_count(),
                "config integrity check failed"
            );
            result.log_violations();
        }

        result
    }

    /// Collect proxy and group names, flagging duplicates.
    fn collect_names(&self, result: &mut ValidationResult) -> HashSet<&str> {
        let mut names = HashSet::new();
        let all = self
            .proxies
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.proxy_groups.iter().map(|g| g.name.as_str()));

        for name in all {
            if is_builtin_target(name) || !names.insert(name) {
                result.add(IntegrityViolation::DuplicateName {
                    name: name.to_string(),
                });
            }
        }

        names
    }

    fn check_group_members(&self, names: &HashSet<&str>, result: &mut ValidationResult) {
        for group in &self.proxy_groups {
            for member in &group.proxies {
                if !is_builtin_target(member) && !names.contains(member.as_str()) {
                    result.add(IntegrityViolation::GroupMemberNotFound {
                        group: group.name.clone(),
                        member: member.clone(),
                    });
                }
            }
        }
    }

    /// Depth-first search over group -> member-group edges.
    fn check_group_cycles(&self, result: &mut ValidationResult) {
        let edges: HashMap<&str, Vec<&str>> = self
            .proxy_groups
            .iter()
            .map(|g| (g.name.as_str(), g.proxies.iter().map(String::as_str).collect()))
            .collect();

        let mut done: HashSet<&str> = HashSet::new();
        for group in &self.proxy_groups {
            let mut path = Vec::new();
            if let Some(cycle) = find_cycle(group.name.as_str(), &edges, &mut path, &mut done) {
                result.add(IntegrityViolation::GroupCycle {
                    group: group.name.clone(),
                    cycle,
                });
            }
        }
    }

    fn check_rule_refs(&self, names: &HashSet<&str>, result: &mut ValidationResult) {
        let shortcuts: HashSet<&str> = self
            .script
            .as_ref()
            .map(|s| s.shortcuts.keys().map(String::as_str).collect())
            .unwrap_or_default();

        for (index, rule) in self.rules.iter().enumerate() {
            if let Some(target) = rule.target().referenced_name()
                && !names.contains(target)
            {
                result.add(IntegrityViolation::RuleTargetNotFound {
                    rule_index: index,
                    target: target.to_string(),
                });
            }

            if let Some(provider) = rule.provider()
                && !self.rule_providers.contains_key(provider)
            {
                result.add(IntegrityViolation::RuleProviderNotFound {
                    rule_index: index,
                    provider: provider.to_string(),
                });
            }

            if let Some(shortcut) = rule.shortcut()
                && !shortcuts.contains(shortcut)
            {
                result.add(IntegrityViolation::ScriptShortcutNotFound {
                    rule_index: index,
                    shortcut: shortcut.to_string(),
                });
            }
        }
    }

    fn check_catch_all(&self, result: &mut ValidationResult) {
        let last = self.rules.len().saturating_sub(1);
        let mut found = false;
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.is_catch_all() {
                found = true;
                if index != last {
                    result.add(IntegrityViolation::CatchAllNotLast { rule_index: index });
                }
            }
        }
        if !found {
            result.add(IntegrityViolation::MissingCatchAll);
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Returns the cycle reachable from `node`, if any. Nodes in `done` are
/// known to be acyclic and are skipped.
fn find_cycle<'a>(
    node: &'a str,
    edges: &HashMap<&'a str, Vec<&'a str>>,
    path: &mut Vec<&'a str>,
    done: &mut HashSet<&'a str>,
) -> Option<Vec<String>> {
    if done.contains(node) {
        return None;
    }
    if let Some(pos) = path.iter().position(|n| *n == node) {
        let mut cycle: Vec<String> = path[pos..].iter().map(|n| n.to_string()).collect();
        cycle.push(node.to_string());
        return Some(cycle);
    }

    // Only groups have outgoing edges
    let members = edges.get(node)?;
    path.push(node);
    for member in members {
        if let Some(cycle) = find_cycle(*member, edges, path, done) {
            return Some(cycle);
        }
    }
    path.pop();
    done.insert(node);
    None
}
