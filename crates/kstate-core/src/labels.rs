//! Turning Kubernetes label/annotation maps into Prometheus labels, and merging
//! identity labels into generated samples.

use std::collections::{BTreeMap, HashMap};

use crate::allow::WILDCARD;

/// Replace every character Prometheus does not allow in a label name with `_`.
pub fn sanitize_label_name(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// `camelCase` to `snake_case`, lowercased.
pub fn lint_label_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            out.push('_');
        }
        out.push(c);
        prev = Some(c);
    }
    out.to_lowercase()
}

fn label_name(prefix: &str, key: &str) -> String {
    format!("{prefix}_{}", lint_label_name(&sanitize_label_name(key)))
}

fn conflict_suffix(label: &str, count: usize) -> String {
    format!("{label}_conflict{count}")
}

/// Project a whole map into `prefix_<key>` labels, sorted by raw key.
///
/// Keys that collapse onto the same label name are disambiguated with
/// `_conflictN` suffixes, the first occurrence included.
pub fn map_to_prometheus_labels(
    prefix: &str,
    map: &BTreeMap<String, String>,
) -> (Vec<String>, Vec<String>) {
    struct Conflict {
        count: usize,
        initial: usize,
    }

    let mut keys: Vec<String> = Vec::with_capacity(map.len());
    let mut values = Vec::with_capacity(map.len());
    let mut conflicts: HashMap<String, Conflict> = HashMap::new();

    for (raw, value) in map {
        let mut name = label_name(prefix, raw);
        match conflicts.get_mut(&name) {
            Some(conflict) => {
                if conflict.count == 1 {
                    keys[conflict.initial] = conflict_suffix(&keys[conflict.initial], 1);
                }
                conflict.count += 1;
                name = conflict_suffix(&name, conflict.count);
            }
            None => {
                conflicts.insert(
                    name.clone(),
                    Conflict {
                        count: 1,
                        initial: keys.len(),
                    },
                );
            }
        }
        keys.push(name);
        values.push(value.clone());
    }
    (keys, values)
}

/// Project only the allow-listed keys of `map`; `["*", ..]` projects everything.
pub fn create_prometheus_label_keys_values(
    prefix: &str,
    map: Option<&BTreeMap<String, String>>,
    allowed: &[String],
) -> (Vec<String>, Vec<String>) {
    let empty = BTreeMap::new();
    let map = map.unwrap_or(&empty);

    if allowed.first().is_some_and(|first| first == WILDCARD) {
        return map_to_prometheus_labels(prefix, map);
    }

    let selected: BTreeMap<String, String> = allowed
        .iter()
        .filter_map(|key| map.get(key).map(|v| (key.clone(), v.clone())))
        .collect();
    map_to_prometheus_labels(prefix, &selected)
}

/// Identity labels first, then the generator's own labels.
///
/// A generator label whose key repeats an identity key is dropped; the identity
/// value always wins.
pub fn merge_key_values(
    identity_keys: &[String],
    identity_values: &[String],
    keys: Vec<String>,
    values: Vec<String>,
) -> (Vec<String>, Vec<String>) {
    let mut out_keys = Vec::with_capacity(identity_keys.len() + keys.len());
    let mut out_values = Vec::with_capacity(identity_values.len() + values.len());
    out_keys.extend_from_slice(identity_keys);
    out_values.extend_from_slice(identity_values);

    for (k, v) in keys.into_iter().zip(values) {
        if identity_keys.contains(&k) {
            continue;
        }
        out_keys.push(k);
        out_values.push(v);
    }
    (out_keys, out_values)
}
