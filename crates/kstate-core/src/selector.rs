//! Field selector helpers for list/watch requests.

/// AND-combine field selectors, skipping empty ones.
pub fn merge_field_selectors<S: AsRef<str>>(selectors: &[S]) -> String {
    selectors
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Selector excluding every namespace in `denied`.
pub fn exclude_namespaces_selector<S: AsRef<str>>(denied: &[S]) -> String {
    let parts: Vec<String> = denied
        .iter()
        .map(|ns| ns.as_ref().trim())
        .filter(|ns| !ns.is_empty())
        .map(|ns| format!("metadata.namespace!={ns}"))
        .collect();
    merge_field_selectors(&parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_skips_empty_selectors() {
        assert_eq!(
            merge_field_selectors(&["spec.nodeName=n1", "", " status.phase=Running "]),
            "spec.nodeName=n1,status.phase=Running"
        );
        assert_eq!(merge_field_selectors::<&str>(&[]), "");
    }

    #[test]
    fn excluded_namespaces_become_inequalities() {
        assert_eq!(
            exclude_namespaces_selector(&["kube-system", "monitoring"]),
            "metadata.namespace!=kube-system,metadata.namespace!=monitoring"
        );
    }
}
