use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Parsed `--metric-labels-allowlist` style flag: `resource=[key1,key2],resourceN=[]`.
///
/// Keys are resource names (or `*`), values are label/annotation keys (or `*`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelsAllowList(pub BTreeMap<String, Vec<String>>);

impl LabelsAllowList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

impl From<BTreeMap<String, Vec<String>>> for LabelsAllowList {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        Self(map)
    }
}

fn valid_token(token: &str) -> bool {
    token == "*"
        || (!token.is_empty()
            && token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_'))
}

impl FromStr for LabelsAllowList {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidAllowList(s.to_string());
        let input = s.trim();
        let mut map = BTreeMap::new();
        if input.is_empty() {
            return Ok(Self(map));
        }

        let mut rest = input;
        loop {
            let (name, after_name) = rest.split_once('=').ok_or_else(invalid)?;
            let name = name.trim();
            if !valid_token(name) {
                return Err(invalid());
            }

            let body = after_name.trim_start().strip_prefix('[').ok_or_else(invalid)?;
            let (inner, tail) = body.split_once(']').ok_or_else(invalid)?;

            let mut keys = Vec::new();
            if !inner.trim().is_empty() {
                for key in inner.split(',') {
                    let key = key.trim();
                    if !valid_token(key) {
                        return Err(invalid());
                    }
                    keys.push(key.to_string());
                }
            }
            map.insert(name.to_string(), keys);

            let tail = tail.trim_start();
            if tail.is_empty() {
                break;
            }
            rest = tail.strip_prefix(',').ok_or_else(invalid)?;
            if rest.trim().is_empty() {
                return Err(invalid());
            }
        }
        Ok(Self(map))
    }
}

impl fmt::Display for LabelsAllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(name, keys)| format!("{name}=[{}]", keys.join(",")))
            .collect();
        f.write_str(&parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<BTreeMap<String, Vec<String>>, ModelError> {
        s.parse::<LabelsAllowList>().map(LabelsAllowList::into_inner)
    }

    #[test]
    fn empty_input_is_empty_map() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("   ").unwrap().is_empty());
    }

    #[test]
    fn parses_multiple_resources() {
        let m = parse("pods=[app,team],namespaces=[]").unwrap();
        assert_eq!(m["pods"], vec!["app", "team"]);
        assert!(m["namespaces"].is_empty());
    }

    #[test]
    fn tolerates_whitespace_around_tokens() {
        let m = parse(" pods = [ app , team ] , nodes=[zone]").unwrap();
        assert_eq!(m["pods"], vec!["app", "team"]);
        assert_eq!(m["nodes"], vec!["zone"]);
    }

    #[test]
    fn accepts_wildcards() {
        let m = parse("*=[*]").unwrap();
        assert_eq!(m["*"], vec!["*"]);
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in [
            "pods",
            "pods=app",
            "pods=[app",
            "pods=[app]nodes=[]",
            "pods=[app],",
            ",pods=[app]",
            "pods=[a-b]",
            "po.ds=[app]",
            "pods=[app,,team]",
        ] {
            let err = parse(bad).unwrap_err();
            assert_eq!(
                err.to_string(),
                "invalid format, metric=[label1,label2,labeln...],metricN=[]",
                "input {bad:?}"
            );
        }
    }

    #[test]
    fn display_is_parseable() {
        let list: LabelsAllowList = "pods=[app],nodes=[]".parse().unwrap();
        let again: LabelsAllowList = list.to_string().parse().unwrap();
        assert_eq!(list, again);
    }
}
