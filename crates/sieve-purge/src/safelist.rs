//! Names that are always kept.

use std::collections::BTreeSet;

/// Class names exempt from purging.
///
/// Membership is an exact, case-sensitive string match. Typical entries are
/// names only ever added by runtime scripts (`active`, `pagination`), which
/// a static scan cannot see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Safelist {
    names: BTreeSet<String>,
}

impl Safelist {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Safelist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_names(iter)
    }
}
