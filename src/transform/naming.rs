//! Collision-free display names.
//!
//! The first record with a given base name keeps it; later ones become
//! `Name (2)`, `Name (3)`, ... If that still collides (an earlier record
//! was literally called `Name (2)`), a random `-xxxx` suffix is appended
//! until the name is free.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::parser::ProxyRecord;
use crate::random::{RandomSource, ThreadRandom};

/// Length of the random collision suffix.
const DISAMBIGUATOR_LEN: usize = 4;

/// Assigns every record a unique display name.
pub struct NameResolver {
    /// Occurrences per base name
    counters: HashMap<String, usize>,
    /// Every name handed out, plus reserved names
    seen: HashSet<String>,
    random: Arc<dyn RandomSource>,
}

impl NameResolver {
    pub fn new() -> Self {
        Self::with_random(Arc::new(ThreadRandom))
    }

    pub fn with_random(random: Arc<dyn RandomSource>) -> Self {
        Self {
            counters: HashMap::new(),
            seen: HashSet::new(),
            random,
        }
    }

    /// Marks names no record may take (group names, built-in targets).
    pub fn reserve<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seen.extend(names.into_iter().map(Into::into));
    }

    /// Renames `records` in place and returns them.
    pub fn resolve(&mut self, mut records: Vec<ProxyRecord>) -> Vec<ProxyRecord> {
        let mut renamed = 0;
        for record in &mut records {
            let name = self.unique_name(&record.display_name);
            if name != record.display_name {
                trace!("Renamed '{}' -> '{}'", record.display_name, name);
                record.display_name = name;
                renamed += 1;
            }
        }
        if renamed > 0 {
            debug!("Renamed {} proxies to keep names unique", renamed);
        }
        records
    }

    /// Returns a fresh name derived from `base` and records it as taken.
    pub fn unique_name(&mut self, base: &str) -> String {
        let count = self.counters.entry(base.to_string()).or_insert(0);
        *count += 1;
        let mut name = if *count == 1 {
            base.to_string()
        } else {
            format!("{} ({})", base, count)
        };

        while self.seen.contains(&name) {
            name = format!("{}-{}", name, self.random.hex(DISAMBIGUATOR_LEN));
        }

        self.seen.insert(name.clone());
        name
    }
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::parser::{SecurityMode, Transport, TransportParams};
    use crate::random::SequenceSource;

    fn record(name: &str) -> ProxyRecord {
        ProxyRecord {
            display_name: name.to_string(),
            host: "1.2.3.4".to_string(),
            port: 443,
            identity: "id".to_string(),
            transport: Transport::Tcp,
            security: SecurityMode::Reality,
            tls: None,
            reality: None,
            flow: None,
            transport_params: TransportParams::default(),
        }
    }

    fn resolver() -> NameResolver {
        NameResolver::with_random(Arc::new(SequenceSource::new(0)))
    }

    fn names(records: &[ProxyRecord]) -> Vec<&str> {
        records.iter().map(|r| r.display_name.as_str()).collect()
    }

    #[test]
    fn test_counter_suffix() {
        let records = vec![record("A"), record("B"), record("A"), record("A")];
        let resolved = resolver().resolve(records);
        assert_eq!(names(&resolved), vec!["A", "B", "A (2)", "A (3)"]);
    }

    #[test]
    fn test_collision_with_suffixed_name() {
        let records = vec![record("A (2)"), record("A"), record("A")];
        let resolved = resolver().resolve(records);
        assert_eq!(names(&resolved), vec!["A (2)", "A", "A (2)-0000"]);
    }

    #[test]
    fn test_repeated_disambiguation() {
        let records = vec![
            record("A (2)"),
            record("A (2)-0000"),
            record("A"),
            record("A"),
        ];
        let resolved = resolver().resolve(records);
        // "A (2)" is taken, "A (2)-0000" is taken, the next draw is 0001
        assert_eq!(names(&resolved)[3], "A (2)-0000-0001");
    }

    #[test]
    fn test_reserved_names_never_assigned() {
        let mut resolver = resolver();
        resolver.reserve(["DIRECT", "🚀 Main Proxy"]);
        let resolved = resolver.resolve(vec![record("DIRECT"), record("🚀 Main Proxy")]);
        assert_eq!(names(&resolved), vec!["DIRECT-0000", "🚀 Main Proxy-0001"]);
    }

    #[test]
    fn test_all_names_unique() {
        let bases = ["x", "x (2)", "x", "x", "y", "x (3)", "x (2)", "y"];
        let resolved = resolver().resolve(bases.iter().map(|b| record(b)).collect());
        let unique: HashSet<&str> = names(&resolved).into_iter().collect();
        assert_eq!(unique.len(), bases.len());
    }

    #[test]
    fn test_first_occurrence_unchanged_and_ordered() {
        let records = vec![record("C"), record("B"), record("C"), record("A")];
        let resolved = resolver().resolve(records);
        assert_eq!(names(&resolved), vec!["C", "B", "C (2)", "A"]);
    }

    #[test]
    fn test_deterministic_without_collisions() {
        let input = || vec![record("A"), record("A"), record("B")];
        let first = NameResolver::new().resolve(input());
        let second = NameResolver::new().resolve(input());
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_empty() {
        assert!(resolver().resolve(Vec::new()).is_empty());
    }
}
