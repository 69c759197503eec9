//! Known resources, enabled-resource validation and allow-list resolution.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::CoreError;

/// Wildcard token, both as a resource key and as a label key.
pub const WILDCARD: &str = "*";

/// Resolved resource name -> permitted label/annotation keys.
pub type AllowList = BTreeMap<String, Vec<String>>;

/// Immutable set of resource names this process knows how to watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCatalog {
    names: Vec<String>,
}

impl ResourceCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.binary_search_by(|n| n.as_str().cmp(name)).is_ok()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    fn unknown(&self, resource: &str) -> CoreError {
        CoreError::UnknownResource {
            resource: resource.to_string(),
            available: self.names.join(","),
        }
    }
}

/// Validate requested resources against the catalog; result is sorted and unique.
pub fn resolve_enabled_resources(
    catalog: &ResourceCatalog,
    requested: &[String],
) -> Result<Vec<String>, CoreError> {
    if let Some(unknown) = requested.iter().find(|r| !catalog.contains(r)) {
        return Err(catalog.unknown(unknown));
    }
    let mut enabled = requested.to_vec();
    enabled.sort();
    enabled.dedup();
    Ok(enabled)
}

fn as_set(values: &[String]) -> BTreeSet<&str> {
    values.iter().map(String::as_str).collect()
}

/// Resolve a user allow-list map against the enabled resources.
///
/// A `*` key applies its keys to every enabled resource. Other entries next to it
/// are only accepted when they are enabled resources repeating the exact same keys.
pub fn resolve_allow_list(
    catalog: &ResourceCatalog,
    enabled: &[String],
    list: &BTreeMap<String, Vec<String>>,
) -> Result<AllowList, CoreError> {
    let is_enabled = |r: &str| enabled.iter().any(|e| e == r);

    let Some(wildcard) = list.get(WILDCARD) else {
        let mut resolved = AllowList::new();
        for (resource, keys) in list {
            if !catalog.contains(resource) {
                return Err(catalog.unknown(resource));
            }
            if !is_enabled(resource) {
                return Err(CoreError::ResourceNotEnabled(resource.clone()));
            }
            resolved.insert(resource.clone(), keys.clone());
        }
        return Ok(resolved);
    };

    let wildcard_set = as_set(wildcard);
    for (resource, keys) in list.iter().filter(|(r, _)| r.as_str() != WILDCARD) {
        if !catalog.contains(resource) {
            return Err(CoreError::MutuallyExclusive(resource.clone()));
        }
        if !is_enabled(resource) {
            return Err(CoreError::ResourceNotEnabled(resource.clone()));
        }
        if as_set(keys) != wildcard_set {
            return Err(CoreError::MutuallyExclusive(resource.clone()));
        }
    }

    Ok(enabled
        .iter()
        .map(|r| (r.clone(), wildcard.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ResourceCatalog {
        ResourceCatalog::new(["configmaps", "cronjobs", "deployments", "pods", "secrets"])
    }

    fn enabled() -> Vec<String> {
        strings(&["cronjobs", "deployments", "pods"])
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn list(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), strings(v)))
            .collect()
    }

    #[test]
    fn enabled_resources_are_sorted_and_unique() {
        let got = resolve_enabled_resources(
            &catalog(),
            &strings(&["pods", "cronjobs", "deployments", "pods"]),
        )
        .unwrap();
        assert_eq!(got, strings(&["cronjobs", "deployments", "pods"]));
    }

    #[test]
    fn unknown_enabled_resource_fails() {
        let err = resolve_enabled_resources(&catalog(), &strings(&["pods", "widgets"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "resource widgets does not exist. Available resources: configmaps,cronjobs,deployments,pods,secrets"
        );
    }

    #[test]
    fn empty_allow_list_resolves_to_empty() {
        assert!(resolve_allow_list(&catalog(), &enabled(), &BTreeMap::new()).unwrap().is_empty());
    }

    #[test]
    fn wildcard_expands_to_every_enabled_resource() {
        let got = resolve_allow_list(&catalog(), &enabled(), &list(&[("*", &["*"])])).unwrap();
        assert_eq!(
            got,
            list(&[("cronjobs", &["*"]), ("pods", &["*"]), ("deployments", &["*"])])
        );
    }

    #[test]
    fn wildcard_with_matching_explicit_entries_is_idempotent() {
        let input = list(&[("*", &["*"]), ("pods", &["*"]), ("cronjobs", &["*"])]);
        let got = resolve_allow_list(&catalog(), &enabled(), &input).unwrap();
        assert_eq!(
            got,
            list(&[("cronjobs", &["*"]), ("pods", &["*"]), ("deployments", &["*"])])
        );
    }

    #[test]
    fn wildcard_with_disabled_resource_fails() {
        let input = list(&[("*", &["*"]), ("configmaps", &["*"])]);
        let err = resolve_allow_list(&catalog(), &enabled(), &input).unwrap_err();
        assert_eq!(err, CoreError::ResourceNotEnabled("configmaps".to_string()));
    }

    #[test]
    fn wildcard_with_foreign_keys_is_ambiguous() {
        let input = list(&[("*", &["*"]), ("foo", &["*"]), ("bar", &["*"])]);
        let err = resolve_allow_list(&catalog(), &enabled(), &input).unwrap_err();
        assert!(matches!(err, CoreError::MutuallyExclusive(_)));
    }

    #[test]
    fn wildcard_with_different_keys_is_ambiguous() {
        let input = list(&[("*", &["app"]), ("pods", &["team"])]);
        let err = resolve_allow_list(&catalog(), &enabled(), &input).unwrap_err();
        assert_eq!(err, CoreError::MutuallyExclusive("pods".to_string()));
    }

    #[test]
    fn explicit_entries_are_kept_as_given() {
        let input = list(&[("pods", &["team", "app"])]);
        let got = resolve_allow_list(&catalog(), &enabled(), &input).unwrap();
        assert_eq!(got, list(&[("pods", &["team", "app"])]));
    }

    #[test]
    fn explicit_entry_must_be_known_and_enabled() {
        let err = resolve_allow_list(&catalog(), &enabled(), &list(&[("widgets", &["a"])])).unwrap_err();
        assert!(matches!(err, CoreError::UnknownResource { .. }));

        let err = resolve_allow_list(&catalog(), &enabled(), &list(&[("secrets", &["a"])])).unwrap_err();
        assert_eq!(err, CoreError::ResourceNotEnabled("secrets".to_string()));
    }
}
