use std::{convert::Infallible, str::FromStr};

use serde::{Deserialize, Serialize};

/// Namespace value meaning "every namespace".
pub const ALL_NAMESPACES: &str = "";

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Comma separated list of resource names as given by the user.
///
/// Validation against the known catalog happens later, at build time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceSet(pub Vec<String>);

impl ResourceSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl FromStr for ResourceSet {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(split_list(s)))
    }
}

impl From<Vec<String>> for ResourceSet {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}

/// Namespaces to watch; empty means all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceList(pub Vec<String>);

impl NamespaceList {
    pub fn is_all(&self) -> bool {
        self.0.is_empty() || self.0.iter().any(|ns| ns == ALL_NAMESPACES)
    }

    /// Namespaces to open watches for. A single [`ALL_NAMESPACES`] entry when unrestricted.
    pub fn watch_targets(&self) -> Vec<String> {
        if self.is_all() {
            return vec![ALL_NAMESPACES.to_string()];
        }
        let mut out = self.0.clone();
        out.sort();
        out.dedup();
        out
    }
}

impl FromStr for NamespaceList {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(split_list(s)))
    }
}

impl From<Vec<String>> for NamespaceList {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_set_trims_and_drops_empties() {
        let set: ResourceSet = " pods, ,nodes ,".parse().unwrap();
        assert_eq!(set.as_slice(), ["pods", "nodes"]);
    }

    #[test]
    fn empty_namespace_list_watches_everything() {
        let ns: NamespaceList = "".parse().unwrap();
        assert!(ns.is_all());
        assert_eq!(ns.watch_targets(), vec![ALL_NAMESPACES.to_string()]);
    }

    #[test]
    fn namespace_targets_are_sorted_and_unique() {
        let ns: NamespaceList = "kube-system,default,kube-system".parse().unwrap();
        assert!(!ns.is_all());
        assert_eq!(ns.watch_targets(), vec!["default", "kube-system"]);
    }

    #[test]
    fn config_file_form_is_a_plain_list() {
        let ns: NamespaceList = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(ns.0, vec!["a", "b"]);
    }
}
