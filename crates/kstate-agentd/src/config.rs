use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use kstate_model::{LabelsAllowList, NamespaceList, ResourceSet};
use kstate_observe::{LoggerConfig, LoggerFormat};
use serde::Deserialize;

const DEFAULT_HOST: &str = "::";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TELEMETRY_PORT: u16 = 8081;

/// Command line flags. Every flag left unset falls back to the config file, then the default.
#[derive(Parser, Debug, Default)]
#[command(name = "kstate-agentd", version, about = "Expose the state of Kubernetes objects as Prometheus metrics")]
pub struct Cli {
    /// JSON config file; flags given on the command line take precedence.
    #[arg(long, env = "KSTATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Comma-separated resources to watch, all when empty.
    #[arg(long)]
    pub resources: Option<String>,

    /// Comma-separated namespaces to watch, all when empty.
    #[arg(long)]
    pub namespaces: Option<String>,

    /// Comma-separated namespaces to exclude; only valid when watching all namespaces.
    #[arg(long = "namespaces-denylist")]
    pub namespaces_denylist: Option<String>,

    /// Kubernetes label keys per resource, e.g. `pods=[app,team],*=[env]`.
    #[arg(long = "metric-labels-allowlist")]
    pub metric_labels_allowlist: Option<String>,

    /// Kubernetes annotation keys per resource, same format as the labels allowlist.
    #[arg(long = "metric-annotations-allowlist")]
    pub metric_annotations_allowlist: Option<String>,

    /// Comma-separated regexes of metric families to expose.
    #[arg(long = "metric-allowlist")]
    pub metric_allowlist: Option<String>,

    /// Comma-separated regexes of metric families to hide.
    #[arg(long = "metric-denylist")]
    pub metric_denylist: Option<String>,

    /// Comma-separated regexes of opt-in metric families to enable.
    #[arg(long = "metric-opt-in-list")]
    pub metric_opt_in_list: Option<String>,

    /// Extra field selector applied to every list/watch.
    #[arg(long = "field-selector")]
    pub field_selector: Option<String>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long = "telemetry-host")]
    pub telemetry_host: Option<String>,

    #[arg(long = "telemetry-port")]
    pub telemetry_port: Option<u16>,

    /// Log filter directive, e.g. `info` or `kstate_store=debug,info`.
    #[arg(long = "log-level", env = "KSTATE_LOG")]
    pub log_level: Option<String>,

    /// text | json | journald
    #[arg(long = "log-format")]
    pub log_format: Option<String>,
}

/// Config file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub resources: Option<ResourceSet>,
    pub namespaces: Option<NamespaceList>,
    pub namespaces_denylist: Option<Vec<String>>,
    pub metric_labels_allowlist: Option<LabelsAllowList>,
    pub metric_annotations_allowlist: Option<LabelsAllowList>,
    pub metric_allowlist: Option<Vec<String>>,
    pub metric_denylist: Option<Vec<String>>,
    pub metric_opt_in_list: Option<Vec<String>>,
    pub field_selector: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub telemetry_host: Option<String>,
    pub telemetry_port: Option<u16>,
    pub log_level: Option<String>,
    pub log_format: Option<LoggerFormat>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
    }
}

/// Fully resolved process configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub resources: ResourceSet,
    pub namespaces: NamespaceList,
    pub namespaces_denylist: Vec<String>,
    pub labels_allowlist: LabelsAllowList,
    pub annotations_allowlist: LabelsAllowList,
    pub metric_allowlist: Vec<String>,
    pub metric_denylist: Vec<String>,
    pub metric_opt_in_list: Vec<String>,
    pub field_selector: String,
    pub listen: String,
    pub telemetry_listen: String,
    pub logger: LoggerConfig,
}

fn split(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// `host:port`, bracketing bare IPv6 hosts.
fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

impl Settings {
    /// Read the config file named by `cli`, if any, and resolve.
    pub fn load(cli: Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self> {
        let labels_allowlist = match cli.metric_labels_allowlist {
            Some(raw) => raw.parse().context("--metric-labels-allowlist")?,
            None => file.metric_labels_allowlist.unwrap_or_default(),
        };
        let annotations_allowlist = match cli.metric_annotations_allowlist {
            Some(raw) => raw.parse().context("--metric-annotations-allowlist")?,
            None => file.metric_annotations_allowlist.unwrap_or_default(),
        };
        let log_format = match cli.log_format {
            Some(raw) => raw.parse().context("--log-format")?,
            None => file.log_format.unwrap_or_default(),
        };

        let host = cli.host.or(file.host).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file.port).unwrap_or(DEFAULT_PORT);
        let telemetry_host = cli
            .telemetry_host
            .or(file.telemetry_host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let telemetry_port = cli.telemetry_port.or(file.telemetry_port).unwrap_or(DEFAULT_TELEMETRY_PORT);

        let level = cli.log_level.or(file.log_level).unwrap_or_else(|| "info".to_string());

        Ok(Self {
            resources: cli
                .resources
                .map(|r| ResourceSet::from(split(&r)))
                .or(file.resources)
                .unwrap_or_default(),
            namespaces: cli
                .namespaces
                .map(|n| NamespaceList::from(split(&n)))
                .or(file.namespaces)
                .unwrap_or_default(),
            namespaces_denylist: cli
                .namespaces_denylist
                .map(|n| split(&n))
                .or(file.namespaces_denylist)
                .unwrap_or_default(),
            labels_allowlist,
            annotations_allowlist,
            metric_allowlist: cli
                .metric_allowlist
                .map(|m| split(&m))
                .or(file.metric_allowlist)
                .unwrap_or_default(),
            metric_denylist: cli
                .metric_denylist
                .map(|m| split(&m))
                .or(file.metric_denylist)
                .unwrap_or_default(),
            metric_opt_in_list: cli
                .metric_opt_in_list
                .map(|m| split(&m))
                .or(file.metric_opt_in_list)
                .unwrap_or_default(),
            field_selector: cli.field_selector.or(file.field_selector).unwrap_or_default(),
            listen: join_host_port(&host, port),
            telemetry_listen: join_host_port(&telemetry_host, telemetry_port),
            logger: LoggerConfig::new(log_format, level),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_watch_everything() {
        let s = Settings::resolve(Cli::default(), FileConfig::default()).unwrap();
        assert!(s.resources.is_empty());
        assert!(s.namespaces.is_all());
        assert_eq!(s.listen, "[::]:8080");
        assert_eq!(s.telemetry_listen, "[::]:8081");
        assert_eq!(s.logger.level, "info");
        assert_eq!(s.logger.format, LoggerFormat::Text);
    }

    #[test]
    fn flags_parse_like_the_command_line() {
        let cli = Cli::try_parse_from([
            "kstate-agentd",
            "--resources=pods, nodes",
            "--namespaces=default,kube-system",
            "--metric-labels-allowlist=pods=[app,team]",
            "--metric-denylist=kube_pod_labels,kube_node_.*",
            "--host=127.0.0.1",
            "--port=9100",
            "--log-format=json",
        ])
        .unwrap();
        let s = Settings::resolve(cli, FileConfig::default()).unwrap();
        assert_eq!(s.resources.as_slice(), strings(&["pods", "nodes"]).as_slice());
        assert_eq!(s.namespaces.watch_targets(), strings(&["default", "kube-system"]));
        assert_eq!(s.labels_allowlist.0.get("pods"), Some(&strings(&["app", "team"])));
        assert_eq!(s.metric_denylist, strings(&["kube_pod_labels", "kube_node_.*"]));
        assert_eq!(s.listen, "127.0.0.1:9100");
        assert_eq!(s.logger.format, LoggerFormat::Json);
    }

    #[test]
    fn flags_override_file_values() {
        let file: FileConfig = serde_json::from_str(
            r#"{
                "resources": ["pods", "services"],
                "metric_labels_allowlist": {"pods": ["app"]},
                "port": 9000,
                "log_level": "debug"
            }"#,
        )
        .unwrap();
        let cli = Cli::try_parse_from(["kstate-agentd", "--port=9100"]).unwrap();
        let s = Settings::resolve(cli, file).unwrap();
        assert_eq!(s.resources.as_slice(), strings(&["pods", "services"]).as_slice());
        assert_eq!(s.labels_allowlist.0.get("pods"), Some(&strings(&["app"])));
        assert_eq!(s.listen, "[::]:9100");
        assert_eq!(s.logger.level, "debug");
    }

    #[test]
    fn malformed_allowlist_is_rejected() {
        let cli = Cli::try_parse_from(["kstate-agentd", "--metric-labels-allowlist=pods=app"]).unwrap();
        let err = Settings::resolve(cli, FileConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("--metric-labels-allowlist"));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(serde_json::from_str::<FileConfig>(r#"{"resource": ["pods"]}"#).is_err());
    }
}
