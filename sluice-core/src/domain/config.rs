//! Pipeline configuration document
//!
//! The typed shape of a pipeline definition as submitted by a team. Every
//! struct rejects unknown fields so that a document is either fully
//! understood or refused; the top-level key check is done separately by the
//! decoder so it can report the offending key names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque parameter tree (resource `source`, step `params`).
///
/// No fixed schema: any mix of strings, numbers, booleans, sequences and
/// mappings is preserved as-is.
pub type Params = BTreeMap<String, serde_json::Value>;

/// Decoded pipeline definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_types: Vec<ResourceConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<JobConfig>,
}

impl Config {
    /// Keys accepted at the top level of a submitted document
    pub const TOP_LEVEL_KEYS: [&'static str; 4] = ["groups", "resources", "resource_types", "jobs"];

    /// Find a resource by name
    pub fn resource(&self, name: &str) -> Option<&ResourceConfig> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Find a job by name
    pub fn job(&self, name: &str) -> Option<&JobConfig> {
        self.jobs.iter().find(|j| j.name == name)
    }
}

/// Named view over a subset of jobs and resources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
}

/// A resource, or a pipeline-scoped resource type (same shape)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Params>,

    /// Check interval as a duration string, e.g. `10s` or `1h30m`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_every: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub public: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub serial: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plan: Vec<PlanStep>,
}

/// One step of a job's build plan
///
/// The step kind is determined by which of `get`, `put` or `task` is present;
/// a step carrying fields of more than one kind matches none of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanStep {
    Get(GetStep),
    Put(PutStep),
    Task(TaskStep),
}

impl PlanStep {
    /// Name the step is known by inside the build
    pub fn name(&self) -> &str {
        match self {
            PlanStep::Get(step) => &step.get,
            PlanStep::Put(step) => &step.put,
            PlanStep::Task(step) => &step.task,
        }
    }

    /// Resource a get or put step talks to; `None` for tasks
    pub fn resource(&self) -> Option<&str> {
        match self {
            PlanStep::Get(step) => Some(step.resource.as_deref().unwrap_or(&step.get)),
            PlanStep::Put(step) => Some(step.resource.as_deref().unwrap_or(&step.put)),
            PlanStep::Task(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetStep {
    pub get: String,

    /// Actual resource to fetch when `get` is a local rename
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Upstream jobs the fetched version must have passed through
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub passed: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PutStep {
    pub put: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskStep {
    pub task: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub privileged: bool,

    /// Path to a task definition inside one of the build's inputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<TaskConfig>,
}

/// Inline task definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<TaskRunConfig>,

    /// Environment handed to the task process; values are always strings
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<TaskArtifact>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<TaskArtifact>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskRunConfig {
    pub path: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskArtifact {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Document text exactly as submitted
///
/// Kept next to the parsed [`Config`] so reads can reproduce the original
/// bytes, including when the stored document no longer parses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawConfig(pub String);

impl RawConfig {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for RawConfig {
    fn from(raw: String) -> Self {
        RawConfig(raw)
    }
}

impl From<&str> for RawConfig {
    fn from(raw: &str) -> Self {
        RawConfig(raw.to_string())
    }
}

impl fmt::Display for RawConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
