//! Completeness check of discovered region names against the reference catalogue.
//!
//! Names match by exact equality after whitespace normalization. A spelling or
//! casing difference shows up as one missing plus one unexpected entry and has
//! to be fixed in the name table, not here.

use std::collections::BTreeSet;

use serde::Serialize;

/// Trim and collapse internal whitespace runs to a single space.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Read-only catalogue of canonical region names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    names: BTreeSet<String>,
}

impl ReferenceSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|n| normalize_name(n.as_ref()))
            .filter(|n| !n.is_empty())
            .collect();
        ReferenceSet { names }
    }

    /// One name per line; blank lines and `#` comments are ignored.
    pub fn from_lines(text: &str) -> Self {
        Self::new(text.lines().filter(|l| !l.trim_start().starts_with('#')))
    }

    pub fn contains(&self, name: &str) -> bool { self.names.contains(&normalize_name(name)) }

    pub fn len(&self) -> usize { self.names.len() }

    pub fn is_empty(&self) -> bool { self.names.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &str> { self.names.iter().map(String::as_str) }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CompletenessReport {
    /// Reference names nobody produced, ascending.
    pub missing: Vec<String>,
    /// Produced names absent from the reference, ascending.
    pub unexpected: Vec<String>,
}

impl CompletenessReport {
    pub fn is_complete(&self) -> bool { self.missing.is_empty() }
}

/// `missing = reference - discovered`, `unexpected = discovered - reference`.
pub fn validate<'a, I>(discovered: I, reference: &ReferenceSet) -> CompletenessReport
where
    I: IntoIterator<Item = &'a str>,
{
    let found: BTreeSet<String> = discovered
        .into_iter()
        .map(normalize_name)
        .filter(|n| !n.is_empty())
        .collect();
    let missing = reference.names.difference(&found).cloned().collect();
    let unexpected = found.difference(&reference.names).cloned().collect();
    CompletenessReport { missing, unexpected }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_is_normalized() {
        assert_eq!(normalize_name("  Sahara   and\tSahel "), "Sahara and Sahel");
        let r = ReferenceSet::new(["Sahara and Sahel"]);
        assert!(r.contains("Sahara  and Sahel"));
    }

    #[test]
    fn casing_is_not_forgiven() {
        let r = ReferenceSet::new(["Amazonia"]);
        let rep = validate(["amazonia"], &r);
        assert_eq!(rep.missing, vec!["Amazonia".to_string()]);
        assert_eq!(rep.unexpected, vec!["amazonia".to_string()]);
    }

    #[test]
    fn from_lines_skips_comments_and_blanks() {
        let r = ReferenceSet::from_lines("# realms\nAlpha\n\n  Beta \n");
        assert_eq!(r.iter().collect::<Vec<_>>(), vec!["Alpha", "Beta"]);
    }
}
