use k8s_openapi::api::batch::v1::{Job, JobCondition, JobStatus};
use kstate_core::{
    FamilyGenerator,
    state::{bool_f64, condition_metrics, timestamp_metric},
    with_identity,
};
use kstate_model::{Metric, MetricType, StabilityLevel};

use crate::common::{
    AllowedKeys, EmptyAllowList, annotations_family, created_family, info_family, labels_family,
    namespace_name, opt_i64, opt_value, owner_metrics, value_family,
};

const FAILURE_REASONS: [&str; 3] = ["BackoffLimitExceeded", "DeadlineExceeded", "Evicted"];

fn conditions(j: &Job) -> impl Iterator<Item = &JobCondition> {
    j.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .into_iter()
        .flatten()
}

fn status_count<F>(j: &Job, f: F) -> f64
where
    F: Fn(&JobStatus) -> Option<i32>,
{
    j.status.as_ref().and_then(f).map_or(0.0, f64::from)
}

/// Failed pod count, broken down by the reason of the `Failed` conditions.
fn failed(j: &Job) -> Vec<Metric> {
    let failed = status_count(j, |s| s.failed);
    if failed == 0.0 {
        return vec![Metric::value_only(0.0)];
    }

    let mut ms = Vec::new();
    let mut reason_known = false;
    for c in conditions(j).filter(|c| c.type_ == "Failed") {
        let reason = c.reason.as_deref().unwrap_or_default();
        for known in FAILURE_REASONS {
            reason_known |= reason == known;
            ms.push(Metric::with_labels([("reason", known)], bool_f64(reason == known)));
        }
    }
    if !reason_known {
        ms.push(Metric::with_labels([("reason", "")], failed));
    }
    ms
}

fn condition_family(j: &Job, ty: &str) -> Vec<Metric> {
    conditions(j)
        .filter(|c| c.type_ == ty)
        .flat_map(|c| condition_metrics("condition", &c.status))
        .collect()
}

pub(crate) fn generators(allowed: &AllowedKeys) -> Vec<FamilyGenerator<Job>> {
    with_identity(
        vec![
            annotations_family(
                "job",
                StabilityLevel::Alpha,
                &allowed.annotations,
                EmptyAllowList::Skip,
            ),
            labels_family("job", StabilityLevel::Stable, &allowed.labels, EmptyAllowList::Skip),
            info_family("kube_job_info", "Information about job.", StabilityLevel::Stable),
            created_family("job", StabilityLevel::Stable),
            FamilyGenerator::new(
                "kube_job_spec_parallelism",
                "The maximum desired number of pods the job should run at any given time.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |j: &Job| opt_value(j.spec.as_ref().and_then(|s| s.parallelism)),
            ),
            FamilyGenerator::new(
                "kube_job_spec_completions",
                "The desired number of successfully finished pods the job should be run with.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |j: &Job| opt_value(j.spec.as_ref().and_then(|s| s.completions)),
            ),
            FamilyGenerator::new(
                "kube_job_spec_active_deadline_seconds",
                "The duration in seconds relative to the startTime that the job may be active before the system tries to terminate it.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |j: &Job| opt_i64(j.spec.as_ref().and_then(|s| s.active_deadline_seconds)),
            ),
            value_family(
                "kube_job_status_succeeded",
                "The number of pods which reached Phase Succeeded.",
                StabilityLevel::Stable,
                |j: &Job| status_count(j, |s| s.succeeded),
            ),
            FamilyGenerator::new(
                "kube_job_status_failed",
                "The number of pods which reached Phase Failed and the reason for failure.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                failed,
            ),
            value_family(
                "kube_job_status_active",
                "The number of actively running pods.",
                StabilityLevel::Stable,
                |j: &Job| status_count(j, |s| s.active),
            ),
            value_family(
                "kube_job_status_ready",
                "The number of ready pods that belong to this Job.",
                StabilityLevel::Alpha,
                |j: &Job| status_count(j, |s| s.ready),
            ),
            FamilyGenerator::new(
                "kube_job_complete",
                "The job has completed its execution.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |j: &Job| condition_family(j, "Complete"),
            ),
            FamilyGenerator::new(
                "kube_job_failed",
                "The job has failed its execution.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |j: &Job| condition_family(j, "Failed"),
            ),
            FamilyGenerator::new(
                "kube_job_status_start_time",
                "StartTime represents time when the job was acknowledged by the Job Manager.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |j: &Job| timestamp_metric(j.status.as_ref().and_then(|s| s.start_time.as_ref())),
            ),
            FamilyGenerator::new(
                "kube_job_status_completion_time",
                "CompletionTime represents time when the job was completed.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |j: &Job| timestamp_metric(j.status.as_ref().and_then(|s| s.completion_time.as_ref())),
            ),
            FamilyGenerator::new(
                "kube_job_status_suspended",
                "The number of pods which reached Phase Suspended.",
                MetricType::Gauge,
                StabilityLevel::Alpha,
                |j: &Job| {
                    conditions(j)
                        .filter(|c| c.type_ == "Suspended")
                        .map(|c| Metric::value_only(bool_f64(c.status == "True")))
                        .collect()
                },
            ),
            FamilyGenerator::new(
                "kube_job_owner",
                "Information about the Job's owner.",
                MetricType::Gauge,
                StabilityLevel::Stable,
                |j: &Job| owner_metrics(j.metadata.owner_references.as_ref(), ""),
            ),
        ],
        &["namespace", "job_name"],
        namespace_name,
    )
}
