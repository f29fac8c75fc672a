//! Descriptor types exchanged with the host build graph.
//!
//! Field names serialize in camelCase so synthesized targets can be merged
//! verbatim into a project's JSON configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Target name → descriptor, ordered for deterministic output.
pub type Targets = BTreeMap<String, TargetDescriptor>;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed project name as known to the host graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectName(pub String);

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The kind of a project. Only libraries are ever published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Library,
    Application,
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectKind::Library => write!(f, "library"),
            ProjectKind::Application => write!(f, "application"),
        }
    }
}

/// Whether a dependency edge propagates the invoking target's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Params {
    Forward,
    Ignore,
}

/// Which projects a dependency edge points at. Absent means "this project".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectsSelector {
    Dependencies,
}

// ---------------------------------------------------------------------------
// Dependency edges
// ---------------------------------------------------------------------------

/// One dependency edge of a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DependsOnRepr")]
pub struct DependsOn {
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<ProjectsSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
}

impl DependsOn {
    /// Edge on `target` of the same project.
    pub fn on_self(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            projects: None,
            params: None,
        }
    }

    /// Edge on `target` of every declared dependency project.
    pub fn on_dependencies(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            projects: Some(ProjectsSelector::Dependencies),
            params: None,
        }
    }

    /// Forward the invoking target's parameters along this edge.
    pub fn forward(mut self) -> Self {
        self.params = Some(Params::Forward);
        self
    }
}

/// Host graphs accept both `"^build"` shorthand and the full object form.
#[derive(Deserialize)]
#[serde(untagged)]
enum DependsOnRepr {
    Short(String),
    Full {
        target: String,
        #[serde(default)]
        projects: Option<ProjectsSelector>,
        #[serde(default)]
        params: Option<Params>,
    },
}

impl From<DependsOnRepr> for DependsOn {
    fn from(repr: DependsOnRepr) -> Self {
        match repr {
            DependsOnRepr::Short(s) => match s.strip_prefix('^') {
                Some(target) => DependsOn::on_dependencies(target),
                None => DependsOn::on_self(s),
            },
            DependsOnRepr::Full {
                target,
                projects,
                params,
            } => DependsOn {
                target,
                projects,
                params,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// Declarative definition of a target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<DependsOn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,
}

impl TargetDescriptor {
    pub fn with_executor(executor: impl Into<String>) -> Self {
        Self {
            executor: Some(executor.into()),
            ..Self::default()
        }
    }

    pub fn option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_owned(), value.into());
        self
    }

    pub fn depends_on(mut self, edges: impl IntoIterator<Item = DependsOn>) -> Self {
        self.depends_on.extend(edges);
        self
    }
}

/// Static description of a project, owned by the host graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    pub name: ProjectName,
    #[serde(default)]
    pub root: PathBuf,
    #[serde(default, rename = "projectType", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProjectKind>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub targets: Targets,
}

impl ProjectDescriptor {
    pub fn new(name: impl Into<ProjectName>, kind: Option<ProjectKind>) -> Self {
        let name = name.into();
        Self {
            root: PathBuf::from("projects").join(&name.0),
            name,
            kind,
            tags: vec![],
            targets: Targets::new(),
        }
    }

    pub fn is_library(&self) -> bool {
        self.kind == Some(ProjectKind::Library)
    }

    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }

    pub fn has_any_target(&self, names: &[String]) -> bool {
        self.targets.keys().any(|t| names.contains(t))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
