//! Semantic config validation
//!
//! Structural problems are caught by the decoder. The checks here look at
//! how the parts of a config refer to each other. Validators are injected
//! into the API state so rule sets can change without touching the save
//! flow.

use sluice_core::domain::config::{Config, PlanStep, ResourceConfig, TaskStep};
use sluice_core::domain::validation::{ConfigWarning, ValidationOutcome};
use std::collections::HashSet;

pub const INVALID_IDENTIFIER: &str = "invalid_identifier";
pub const UNUSED_RESOURCE: &str = "unused_resource";

/// Checks a decoded config and reports errors and warnings
pub trait ConfigValidator: Send + Sync {
    fn validate(&self, config: &Config) -> ValidationOutcome;
}

/// Default rule set
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardValidator;

impl ConfigValidator for StandardValidator {
    fn validate(&self, config: &Config) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();

        validate_resources(&mut outcome, "resource_type", &config.resource_types);
        validate_resources(&mut outcome, "resource", &config.resources);
        validate_groups(&mut outcome, config);
        validate_jobs(&mut outcome, config);
        warn_unused_resources(&mut outcome, config);

        outcome
    }
}

// =============================================================================
// Rules
// =============================================================================

fn validate_resources(outcome: &mut ValidationOutcome, kind: &str, resources: &[ResourceConfig]) {
    let mut seen = HashSet::new();

    for (index, resource) in resources.iter().enumerate() {
        if resource.name.is_empty() {
            outcome
                .errors
                .push(format!("{kind} at index {index} has no name"));
            continue;
        }

        if !seen.insert(resource.name.as_str()) {
            outcome
                .errors
                .push(format!("{kind} '{}' is declared more than once", resource.name));
        }

        if resource.resource_type.is_empty() {
            outcome
                .errors
                .push(format!("{kind} '{}' has no type", resource.name));
        }

        if let Some(interval) = &resource.check_every {
            if !is_valid_interval(interval) {
                outcome.errors.push(format!(
                    "{kind} '{}' has invalid check_every '{interval}'",
                    resource.name
                ));
            }
        }

        check_identifier(outcome, kind, &resource.name);
    }
}

fn validate_groups(outcome: &mut ValidationOutcome, config: &Config) {
    let mut seen = HashSet::new();

    for (index, group) in config.groups.iter().enumerate() {
        if group.name.is_empty() {
            outcome
                .errors
                .push(format!("group at index {index} has no name"));
            continue;
        }

        if !seen.insert(group.name.as_str()) {
            outcome
                .errors
                .push(format!("group '{}' is declared more than once", group.name));
        }

        for job in &group.jobs {
            if config.job(job).is_none() {
                outcome
                    .errors
                    .push(format!("group '{}' refers to unknown job '{job}'", group.name));
            }
        }

        for resource in &group.resources {
            if config.resource(resource).is_none() {
                outcome.errors.push(format!(
                    "group '{}' refers to unknown resource '{resource}'",
                    group.name
                ));
            }
        }

        check_identifier(outcome, "group", &group.name);
    }
}

fn validate_jobs(outcome: &mut ValidationOutcome, config: &Config) {
    let mut seen = HashSet::new();

    for (index, job) in config.jobs.iter().enumerate() {
        if job.name.is_empty() {
            outcome.errors.push(format!("job at index {index} has no name"));
            continue;
        }

        if !seen.insert(job.name.as_str()) {
            outcome
                .errors
                .push(format!("job '{}' is declared more than once", job.name));
        }

        check_identifier(outcome, "job", &job.name);

        for step in &job.plan {
            let location = format!("job '{}' step '{}'", job.name, step.name());

            match step {
                PlanStep::Get(get) => {
                    check_resource_ref(outcome, config, &location, step);

                    for upstream in &get.passed {
                        if config.job(upstream).is_none() {
                            outcome
                                .errors
                                .push(format!("{location} requires unknown job '{upstream}'"));
                        } else if upstream == &job.name {
                            outcome
                                .errors
                                .push(format!("{location} requires its own job in passed"));
                        }
                    }
                }
                PlanStep::Put(_) => check_resource_ref(outcome, config, &location, step),
                PlanStep::Task(task) => validate_task(outcome, &location, task),
            }
        }
    }
}

fn check_resource_ref(
    outcome: &mut ValidationOutcome,
    config: &Config,
    location: &str,
    step: &PlanStep,
) {
    if let Some(resource) = step.resource() {
        if config.resource(resource).is_none() {
            outcome
                .errors
                .push(format!("{location} refers to unknown resource '{resource}'"));
        }
    }
}

fn validate_task(outcome: &mut ValidationOutcome, location: &str, task: &TaskStep) {
    match (&task.config, &task.file) {
        (None, None) => outcome
            .errors
            .push(format!("{location} specifies neither config nor file")),
        (Some(config), None) => {
            let has_path = config.run.as_ref().is_some_and(|run| !run.path.is_empty());
            if !has_path {
                outcome
                    .errors
                    .push(format!("{location} config does not specify run.path"));
            }
        }
        // An inline config next to a file only overrides parts of it.
        (_, Some(_)) => {}
    }
}

fn warn_unused_resources(outcome: &mut ValidationOutcome, config: &Config) {
    let used: HashSet<&str> = config
        .jobs
        .iter()
        .flat_map(|job| job.plan.iter())
        .filter_map(PlanStep::resource)
        .collect();

    for resource in &config.resources {
        if !resource.name.is_empty() && !used.contains(resource.name.as_str()) {
            outcome.warnings.push(ConfigWarning::new(
                UNUSED_RESOURCE,
                format!("resource '{}' is not used by any job", resource.name),
            ));
        }
    }
}

fn check_identifier(outcome: &mut ValidationOutcome, kind: &str, name: &str) {
    if !is_valid_identifier(name) {
        outcome.warnings.push(ConfigWarning::new(
            INVALID_IDENTIFIER,
            format!(
                "{kind} '{name}' is not a valid identifier: must start with a lowercase letter \
                 and contain only lowercase letters, digits, '-', '_' or '.'"
            ),
        ));
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.')
        })
}

/// Accepts `never` and Go-style durations such as `30s`, `1h30m` or `1.5h`
fn is_valid_interval(interval: &str) -> bool {
    if interval == "never" {
        return true;
    }
    if interval.is_empty() {
        return false;
    }

    let mut rest = interval;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 || rest[..number_len].parse::<f64>().is_err() {
            return false;
        }
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        if !matches!(&rest[..unit_len], "ns" | "us" | "µs" | "ms" | "s" | "m" | "h") {
            return false;
        }
        rest = &rest[unit_len..];
    }

    true
}
