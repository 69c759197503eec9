use k8s_openapi::api::batch::v1::CronJob;
use kstate_core::{
    FamilyGenerator,
    state::{bool_f64, timestamp_metric},
    with_identity,
};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, labels_family, namespace_name,
    opt_i64, opt_value, resource_version_family, value_family,
};

fn info(c: &CronJob) -> Vec<Metric> {
    let spec = c.spec.as_ref();
    let schedule = spec.map(|s| s.schedule.clone()).unwrap_or_default();
    let concurrency = spec
        .and_then(|s| s.concurrency_policy.clone())
        .unwrap_or_default();
    let timezone = spec
        .and_then(|s| s.time_zone.clone())
        .unwrap_or_else(|| "local".to_string());
    vec![Metric::with_labels(
        [
            ("schedule", schedule),
            ("concurrency_policy", concurrency),
            ("timezone", timezone),
        ],
        1.0,
    )]
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<CronJob>> {
    with_identity(
        vec![
            annotations_family(
                "cronjob",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::Skip,
            ),
            labels_family(
                "cronjob",
                StabilityLevel::Stable,
                &allowed.labels,
                EmptyAllowList::Skip,
            ),
            FamilyGenerator::new(
                "kube_cronjob_info",
                "Info about cronjob.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                info,
            ),
            created_family("cronjob", StabilityLevel::Stable),
            value_family(
                "kube_cronjob_status_active",
                "Active holds pointers to currently running jobs.",
                StabilityLevel::Stable,
                |c: &CronJob| {
                    c.status
                        .as_ref()
                        .and_then(|s| s.active.as_ref())
                        .map_or(0, Vec::len) as f64
                },
            ),
            FamilyGenerator::new(
                "kube_cronjob_status_last_schedule_time",
                "LastScheduleTime keeps information of when was the last time the job was successfully scheduled.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |c: &CronJob| {
                    timestamp_metric(c.status.as_ref().and_then(|s| s.last_schedule_time.as_ref()))
                },
            ),
            FamilyGenerator::new(
                "kube_cronjob_status_last_successful_time",
                "LastSuccessfulTime keeps information of when was the last time the job was completed successfully.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |c: &CronJob| {
                    timestamp_metric(c.status.as_ref().and_then(|s| s.last_successful_time.as_ref()))
                },
            ),
            FamilyGenerator::new(
                "kube_cronjob_spec_suspend",
                "Suspend flag tells the controller to suspend subsequent executions.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |c: &CronJob| {
                    c.spec
                        .as_ref()
                        .and_then(|s| s.suspend)
                        .map(|b| vec![Metric::value_only(bool_f64(b))])
                        .unwrap_or_default()
                },
            ),
            FamilyGenerator::new(
                "kube_cronjob_spec_starting_deadline_seconds",
                "Deadline in seconds for starting the job if it misses scheduled time for any reason.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |c: &CronJob| opt_i64(c.spec.as_ref().and_then(|s| s.starting_deadline_seconds)),
            ),
            resource_version_family(
                "cronjob",
                "Resource version representing a specific version of the cronjob.",
                StabilityLevel::Stable,
            ),
            FamilyGenerator::new(
                "kube_cronjob_spec_successful_job_history_limit",
                "Successful job history limit tells the controller how many completed jobs should be preserved.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |c: &CronJob| opt_value(c.spec.as_ref().and_then(|s| s.successful_jobs_history_limit)),
            ),
            FamilyGenerator::new(
                "kube_cronjob_spec_failed_job_history_limit",
                "Failed job history limit tells the controller how many failed jobs should be preserved.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |c: &CronJob| opt_value(c.spec.as_ref().and_then(|s| s.failed_jobs_history_limit)),
            ),
        ],
        &["namespace", "cronjob"],
        namespace_name,
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::common::testing::{fixture, samples};

    #[test]
    fn active_cronjob() {
        let c: CronJob = fixture(json!({
            "metadata": {"name": "ActiveRunningCronJob1", "namespace": "ns1", "resourceVersion": "11111"},
            "spec": {
                "schedule": "0 */6 * * *",
                "concurrencyPolicy": "Forbid",
                "suspend": false,
                "startingDeadlineSeconds": 300,
                "successfulJobsHistoryLimit": 3,
                "jobTemplate": {},
            },
            "status": {
                "active": [{"name": "FakeJob1"}, {"name": "FakeJob2"}],
                "lastScheduleTime": "2017-09-20T10:06:40Z",
            },
        }));
        let gens = generators(&AllowedKeys::default());
        assert_eq!(
            samples(&gens, &c, "kube_cronjob_info"),
            vec!["kube_cronjob_info{namespace=\"ns1\",cronjob=\"ActiveRunningCronJob1\",schedule=\"0 */6 * * *\",concurrency_policy=\"Forbid\",timezone=\"local\"} 1"]
        );
        assert_eq!(
            samples(&gens, &c, "kube_cronjob_status_active"),
            vec!["kube_cronjob_status_active{namespace=\"ns1\",cronjob=\"ActiveRunningCronJob1\"} 2"]
        );
        assert_eq!(
            samples(&gens, &c, "kube_cronjob_spec_suspend"),
            vec!["kube_cronjob_spec_suspend{namespace=\"ns1\",cronjob=\"ActiveRunningCronJob1\"} 0"]
        );
        assert_eq!(
            samples(&gens, &c, "kube_cronjob_metadata_resource_version"),
            vec!["kube_cronjob_metadata_resource_version{namespace=\"ns1\",cronjob=\"ActiveRunningCronJob1\"} 11111"]
        );
        assert!(samples(&gens, &c, "kube_cronjob_spec_failed_job_history_limit").is_empty());
        assert!(samples(&gens, &c, "kube_cronjob_status_last_successful_time").is_empty());
    }
}
