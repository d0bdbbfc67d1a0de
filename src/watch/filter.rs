// src/watch/filter.rs

use std::collections::BTreeSet;
use std::fmt;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::Result;

/// Suffixes browsers and download tools put on files that are still being
/// transferred.
pub const DEFAULT_PARTIAL_SUFFIXES: &[&str] = &[".crdownload", ".part", ".tmp"];

/// Names present in `current` but absent from `baseline`.
pub fn new_entries(baseline: &BTreeSet<String>, current: &BTreeSet<String>) -> BTreeSet<String> {
    current.difference(baseline).cloned().collect()
}

/// Decides which new entry names are eligible to be reported.
///
/// A name is rejected when it ends with one of the in-progress suffixes
/// (ASCII case-insensitive) or matches one of the exclude globs. Globs are
/// matched against the bare entry name, e.g. `"*.DS_Store"` or `"~$*"`.
#[derive(Clone)]
pub struct EntryFilter {
    partial_suffixes: Vec<String>,
    exclude_patterns: Vec<String>,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for EntryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryFilter")
            .field("partial_suffixes", &self.partial_suffixes)
            .field("exclude", &self.exclude_patterns)
            .finish()
    }
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self::with_suffixes(DEFAULT_PARTIAL_SUFFIXES.iter().copied())
    }
}

impl EntryFilter {
    /// Filter that admits every name.
    pub fn permissive() -> Self {
        Self {
            partial_suffixes: Vec::new(),
            exclude_patterns: Vec::new(),
            exclude_set: None,
        }
    }

    pub fn with_suffixes<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            partial_suffixes: normalize_suffixes(suffixes),
            exclude_patterns: Vec::new(),
            exclude_set: None,
        }
    }

    /// Build a filter from suffixes plus exclude globs.
    pub fn new<I, S>(suffixes: I, exclude: &[String]) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude)?)
        };

        Ok(Self {
            partial_suffixes: normalize_suffixes(suffixes),
            exclude_patterns: exclude.to_vec(),
            exclude_set,
        })
    }

    pub fn partial_suffixes(&self) -> &[String] {
        &self.partial_suffixes
    }

    /// True when `name` carries an in-progress suffix.
    pub fn is_in_progress(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        self.partial_suffixes.iter().any(|s| lower.ends_with(s.as_str()))
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude_set
            .as_ref()
            .is_some_and(|set| set.is_match(name))
    }

    pub fn admits(&self, name: &str) -> bool {
        !self.is_in_progress(name) && !self.is_excluded(name)
    }

    /// Keep only the admitted names.
    pub fn apply(&self, names: BTreeSet<String>) -> BTreeSet<String> {
        names.into_iter().filter(|n| self.admits(n)).collect()
    }
}

fn normalize_suffixes<I, S>(suffixes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    suffixes
        .into_iter()
        .map(|s| s.into().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

pub(crate) fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(builder.build()?)
}
