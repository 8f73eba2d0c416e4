use crate::error::SpoonError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! str_enum {
    (
        $name:ident, $kind:literal {
            $($variant:ident => $s:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        impl $name {
            pub fn all() -> &'static [$name] {
                &[$($name::$variant),+]
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $s),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = SpoonError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($s $(| $alias)* => Ok($name::$variant),)+
                    _ => Err(SpoonError::InvalidValue {
                        kind: $kind,
                        value: s.to_string(),
                        expected: concat!($($s, " "),+),
                    }),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Coarse bucket derived from the progress value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Early,
    Mid,
    Advanced,
}

pub const MID_THRESHOLD: f64 = 0.3;
pub const ADVANCED_THRESHOLD: f64 = 0.7;

str_enum!(Stage, "stage" {
    Early => "early",
    Mid => "mid",
    Advanced => "advanced",
});

impl Stage {
    pub fn from_progress(progress: f64) -> Self {
        if progress < MID_THRESHOLD {
            Stage::Early
        } else if progress < ADVANCED_THRESHOLD {
            Stage::Mid
        } else {
            Stage::Advanced
        }
    }

    /// One-line guidance shown by `awaken` at this stage.
    pub fn guidance(self) -> &'static str {
        match self {
            Stage::Early => "Start small: scaffold one project and watch it run.",
            Stage::Mid => "You know the tools. Combine a frontend with a backend.",
            Stage::Advanced => "Nothing here is fixed. Ship it somewhere real.",
        }
    }

    /// Suggested next command for this stage.
    pub fn next_step(self) -> &'static str {
        match self {
            Stage::Early => "spoon go create react app called my-first-app",
            Stage::Mid => "spoon go create full-stack app with react and node called my-stack",
            Stage::Advanced => "spoon go deploy project called my-app",
        }
    }
}

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

/// What kind of interaction earned progress, and how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Route,
    Guidance,
    Chat,
    Harness,
    HarnessFallback,
}

impl ActionKind {
    pub fn delta(self) -> f64 {
        match self {
            ActionKind::Route => 0.05,
            ActionKind::Guidance => 0.03,
            ActionKind::Chat => 0.01,
            ActionKind::Harness => 0.15,
            ActionKind::HarnessFallback => 0.10,
        }
    }
}

// ---------------------------------------------------------------------------
// HistoryKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryKind {
    Guidance,
    Exchanges,
    Insights,
    Deployments,
    Environments,
    Harnessed,
    Operations,
    Projects,
}

str_enum!(HistoryKind, "history kind" {
    Guidance => "guidance",
    Exchanges => "exchanges" | "chat",
    Insights => "insights",
    Deployments => "deployments" | "deploys",
    Environments => "environments" | "envs",
    Harnessed => "harnessed" | "tools",
    Operations => "operations" | "ops",
    Projects => "projects",
});

impl HistoryKind {
    /// Maximum number of entries kept; older entries are evicted first.
    pub fn cap(self) -> usize {
        match self {
            HistoryKind::Guidance => 10,
            HistoryKind::Exchanges => 20,
            HistoryKind::Insights => 15,
            HistoryKind::Deployments => 10,
            HistoryKind::Environments => 10,
            HistoryKind::Harnessed => 20,
            HistoryKind::Operations => 50,
            HistoryKind::Projects => 50,
        }
    }

    /// Kinds whose entries are unique by subject.
    pub fn dedup(self) -> bool {
        matches!(self, HistoryKind::Harnessed)
    }
}

// ---------------------------------------------------------------------------
// Scaffolding options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frontend {
    React,
    Next,
}

str_enum!(Frontend, "frontend" {
    React => "react",
    Next => "next" | "nextjs",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Node,
    Python,
}

str_enum!(Backend, "backend" {
    Node => "node",
    Python => "python",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PythonKind {
    Django,
    Flask,
    Fastapi,
    Tensorflow,
    Pytorch,
    Ai,
    Basic,
}

str_enum!(PythonKind, "python kind" {
    Django => "django",
    Flask => "flask",
    Fastapi => "fastapi",
    Tensorflow => "tensorflow" | "tf",
    Pytorch => "pytorch" | "torch",
    Ai => "ai" | "ml",
    Basic => "basic" | "python",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployTarget {
    Netlify,
    Docker,
    Aws,
    Vercel,
}

str_enum!(DeployTarget, "deploy target" {
    Netlify => "netlify",
    Docker => "docker",
    Aws => "aws",
    Vercel => "vercel",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Next,
    Vue,
    Node,
    Transformers,
}

str_enum!(Tool, "tool" {
    Next => "next",
    Vue => "vue",
    Node => "node",
    Transformers => "transformers",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolAction {
    Create,
    Deploy,
    Start,
    Build,
    Install,
}

str_enum!(ToolAction, "tool action" {
    Create => "create",
    Deploy => "deploy",
    Start => "start",
    Build => "build",
    Install => "install",
});

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
