//! Observed class-name usage.

use std::collections::BTreeSet;

/// Accumulates names while documents are scanned.
///
/// A `UsageSet` only exists once the collector is finished, so nothing can
/// consult usage data while a scan is still in progress.
#[derive(Debug, Default)]
pub struct UsageCollector {
    names: BTreeSet<String>,
}

impl UsageCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<S: Into<String>>(&mut self, name: S) {
        self.names.insert(name.into());
    }

    pub fn finish(self) -> UsageSet {
        UsageSet { names: self.names }
    }
}

impl<S: Into<String>> Extend<S> for UsageCollector {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.names.extend(iter.into_iter().map(Into::into));
    }
}

/// Every class name seen across the scanned documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageSet {
    names: BTreeSet<String>,
}

impl UsageSet {
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

impl<S: Into<String>> FromIterator<S> for UsageSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut collector = UsageCollector::new();
        collector.extend(iter);
        collector.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_unions_documents() {
        let mut collector = UsageCollector::new();
        collector.extend(["flex", "active"]);
        collector.extend(vec!["active".to_string(), "prose".to_string()]);
        collector.add("hidden");

        let usage = collector.finish();
        assert_eq!(usage.iter().collect::<Vec<_>>(), vec!["active", "flex", "hidden", "prose"]);
    }

    #[test]
    fn test_order_does_not_matter() {
        let a: UsageSet = ["x", "y", "z"].into_iter().collect();
        let b: UsageSet = ["z", "x", "y", "x"].into_iter().collect();
        assert_eq!(a, b);
    }
}
