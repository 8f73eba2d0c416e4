//! Default routing rules.
//!
//! Order is the tie-break policy: the first rule whose condition holds
//! decides the category. "create a full-stack app with react and django"
//! is full-stack, not python; "deploy my react app" is react-create and
//! "deploy my next app" is a Next.js tool intent, because both sit above
//! deploy. Within deploy the generic words (vercel, deploy, host) are checked
//! before provider names, so "deploy to docker" goes to Vercel while "ship it
//! in a container" goes to Docker.

use crate::classifier::{Category, EvalContext, Rule};
use crate::types::{Backend, DeployTarget, Frontend, PythonKind, Tool, ToolAction};

// ---------------------------------------------------------------------------
// Keyword tables
// ---------------------------------------------------------------------------

const QUESTION_WORDS: &[&str] = &["who", "what", "where", "when", "why", "how", "explain"];

const FULL_STACK_WORDS: &[&str] = &["full-stack", "fullstack", "full stack"];
const REACT_SIDE: &[&str] = &["react", "frontend"];
const NEXT_SIDE: &[&str] = &["next", "nextjs"];
const NODE_SIDE: &[&str] = &["node", "backend", "api"];
const PYTHON_SIDE: &[&str] = &["python", "django", "flask"];

const PYTHON_AI_WORDS: &[&str] = &[
    "python",
    "ai",
    "machine learning",
    "tensorflow",
    "pytorch",
    "django",
    "flask",
    "fastapi",
];

const SYSTEM_WORDS: &[&str] = &["run command", "shell", "execute", "terminal", "harness"];
const HTML_WORDS: &[&str] = &["html", "website"];
const REACT_WORDS: &[&str] = &["react", "frontend", "ui"];

const NETLIFY_WORDS: &[&str] = &["netlify"];
const DOCKER_WORDS: &[&str] = &["docker", "container"];
const AWS_WORDS: &[&str] = &["aws", "amazon"];
const VERCEL_WORDS: &[&str] = &["vercel", "deploy", "host"];

const TOOL_WORDS: &[(Tool, &[&str])] = &[
    (Tool::Next, &["next", "nextjs"]),
    (Tool::Vue, &["vue", "vuejs"]),
    (Tool::Node, &["node", "backend", "api", "server"]),
    (Tool::Transformers, &["transformers", "huggingface"]),
];

const ACTION_WORDS: &[(ToolAction, &[&str])] = &[
    (ToolAction::Create, &["create", "make", "build", "generate", "new"]),
    (ToolAction::Deploy, &["deploy", "publish", "release", "host"]),
    (ToolAction::Start, &["start", "run", "begin", "launch"]),
    (ToolAction::Build, &["build", "compile"]),
    (ToolAction::Install, &["install", "setup", "configure"]),
];

// ---------------------------------------------------------------------------
// Condition helpers
// ---------------------------------------------------------------------------

fn is_question(ctx: &EvalContext) -> bool {
    ctx.first_word()
        .map(|w| QUESTION_WORDS.contains(&w))
        .unwrap_or(false)
}

fn is_full_stack(ctx: &EvalContext) -> bool {
    let react = ctx.mentions_any(REACT_SIDE);
    let next = ctx.mentions_any(NEXT_SIDE);
    let node = ctx.mentions_any(NODE_SIDE);
    let python = ctx.mentions_any(PYTHON_SIDE);
    ctx.mentions_any(FULL_STACK_WORDS) || (react && (node || python)) || (next && node)
}

fn is_python_ai(ctx: &EvalContext) -> bool {
    ctx.mentions_any(PYTHON_AI_WORDS)
}

fn is_system_command(ctx: &EvalContext) -> bool {
    ctx.mentions_any(SYSTEM_WORDS)
}

fn is_html(ctx: &EvalContext) -> bool {
    ctx.mentions_any(HTML_WORDS)
}

fn is_react(ctx: &EvalContext) -> bool {
    ctx.mentions_any(REACT_WORDS)
}

fn is_deploy(ctx: &EvalContext) -> bool {
    deploy_target(ctx).is_some()
}

fn is_tool(ctx: &EvalContext) -> bool {
    tool_of(ctx).is_some()
}

// ---------------------------------------------------------------------------
// Category builders
// ---------------------------------------------------------------------------

fn full_stack(ctx: &EvalContext) -> Category {
    let frontend = if ctx.mentions_any(NEXT_SIDE) && !ctx.mentions("react") {
        Frontend::Next
    } else {
        Frontend::React
    };
    let backend = if ctx.mentions_any(PYTHON_SIDE) {
        Backend::Python
    } else {
        Backend::Node
    };
    Category::FullStack { frontend, backend }
}

fn python_kind(ctx: &EvalContext) -> PythonKind {
    if ctx.mentions("django") {
        PythonKind::Django
    } else if ctx.mentions("flask") {
        PythonKind::Flask
    } else if ctx.mentions("fastapi") {
        PythonKind::Fastapi
    } else if ctx.mentions_any(&["tensorflow", "deep learning"]) {
        PythonKind::Tensorflow
    } else if ctx.mentions_any(&["pytorch", "torch"]) {
        PythonKind::Pytorch
    } else if ctx.mentions_any(&["ai", "machine learning"]) {
        PythonKind::Ai
    } else {
        PythonKind::Basic
    }
}

fn python_ai(ctx: &EvalContext) -> Category {
    Category::PythonAi {
        kind: python_kind(ctx),
    }
}

fn deploy_target(ctx: &EvalContext) -> Option<DeployTarget> {
    if ctx.mentions_any(VERCEL_WORDS) {
        Some(DeployTarget::Vercel)
    } else if ctx.mentions_any(DOCKER_WORDS) {
        Some(DeployTarget::Docker)
    } else if ctx.mentions_any(AWS_WORDS) {
        Some(DeployTarget::Aws)
    } else if ctx.mentions_any(NETLIFY_WORDS) {
        Some(DeployTarget::Netlify)
    } else {
        None
    }
}

fn deploy(ctx: &EvalContext) -> Category {
    Category::Deploy {
        provider: deploy_target(ctx).unwrap_or(DeployTarget::Vercel),
    }
}

fn tool_of(ctx: &EvalContext) -> Option<Tool> {
    TOOL_WORDS
        .iter()
        .find(|(_, words)| ctx.mentions_any(words))
        .map(|(tool, _)| *tool)
}

fn tool_action(ctx: &EvalContext) -> ToolAction {
    ACTION_WORDS
        .iter()
        .find(|(_, words)| ctx.mentions_any(words))
        .map(|(action, _)| *action)
        .unwrap_or(ToolAction::Create)
}

fn tool(ctx: &EvalContext) -> Category {
    Category::Tool {
        tool: tool_of(ctx).unwrap_or(Tool::Node),
        action: tool_action(ctx),
    }
}

// ---------------------------------------------------------------------------
// Rule list
// ---------------------------------------------------------------------------

pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "question",
            condition: is_question,
            category: |_| Category::Question,
        },
        Rule {
            id: "full-stack",
            condition: is_full_stack,
            category: full_stack,
        },
        Rule {
            id: "python-ai",
            condition: is_python_ai,
            category: python_ai,
        },
        Rule {
            id: "system-command",
            condition: is_system_command,
            category: |_| Category::SystemCommand,
        },
        Rule {
            id: "html-site",
            condition: is_html,
            category: |_| Category::HtmlSite,
        },
        Rule {
            id: "react-create",
            condition: is_react,
            category: |_| Category::ReactCreate,
        },
        Rule {
            id: "tool",
            condition: is_tool,
            category: tool,
        },
        Rule {
            id: "deploy",
            condition: is_deploy,
            category: deploy,
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::classifier::{classify, Category};
    use crate::types::{Backend, DeployTarget, Frontend, PythonKind, Tool, ToolAction};

    #[test]
    fn react_app_called_foo() {
        let i = classify("create react app called foo");
        assert_eq!(i.category, Category::ReactCreate);
        assert_eq!(i.category.name(), "react-create");
        assert_eq!(i.target, "foo");
    }

    #[test]
    fn python_ai_environment_named_neuro() {
        let i = classify("make a python ai environment named neuro");
        assert_eq!(
            i.category,
            Category::PythonAi {
                kind: PythonKind::Ai
            }
        );
        assert_eq!(i.category.name(), "python-ai");
        assert_eq!(i.target, "neuro");
    }

    #[test]
    fn empty_input_is_general() {
        let i = classify("");
        assert_eq!(i.category, Category::General);
        assert_eq!(i.target, "matrix-project");
    }

    #[test]
    fn questions_win_over_everything() {
        let i = classify("how do I deploy a react app to docker?");
        assert_eq!(i.category, Category::Question);
        assert_eq!(classify("Explain docker").category, Category::Question);
    }

    #[test]
    fn full_stack_combinations() {
        let i = classify("create full-stack app called shop");
        assert_eq!(
            i.category,
            Category::FullStack {
                frontend: Frontend::React,
                backend: Backend::Node
            }
        );

        let i = classify("build a react frontend with a django backend named blog");
        assert_eq!(
            i.category,
            Category::FullStack {
                frontend: Frontend::React,
                backend: Backend::Python
            }
        );
        assert_eq!(i.target, "blog");

        let i = classify("next site with node api");
        assert_eq!(
            i.category,
            Category::FullStack {
                frontend: Frontend::Next,
                backend: Backend::Node
            }
        );
    }

    #[test]
    fn python_kind_precedence() {
        let kind = |text: &str| match classify(text).category {
            Category::PythonAi { kind } => kind,
            other => panic!("expected python-ai for {text:?}, got {other:?}"),
        };
        assert_eq!(kind("django project called blog"), PythonKind::Django);
        assert_eq!(kind("flask service"), PythonKind::Flask);
        assert_eq!(kind("fastapi service"), PythonKind::Fastapi);
        assert_eq!(kind("python deep learning with tensorflow"), PythonKind::Tensorflow);
        assert_eq!(kind("pytorch sandbox"), PythonKind::Pytorch);
        assert_eq!(kind("machine learning lab"), PythonKind::Ai);
        assert_eq!(kind("python scripts"), PythonKind::Basic);
    }

    #[test]
    fn system_command_and_sites() {
        assert_eq!(classify("run command ls -la").category, Category::SystemCommand);
        assert_eq!(classify("harness the gh cli").category, Category::SystemCommand);
        assert_eq!(classify("make a website called home").category, Category::HtmlSite);
        assert_eq!(classify("build a ui called dash").category, Category::ReactCreate);
    }

    #[test]
    fn email_does_not_trigger_ai() {
        assert_eq!(classify("send email").category, Category::General);
    }

    #[test]
    fn deploy_providers() {
        let provider = |text: &str| match classify(text).category {
            Category::Deploy { provider } => provider,
            other => panic!("expected deploy for {text:?}, got {other:?}"),
        };
        assert_eq!(provider("push to netlify"), DeployTarget::Netlify);
        assert_eq!(provider("ship it in a container"), DeployTarget::Docker);
        assert_eq!(provider("push to amazon"), DeployTarget::Aws);
        assert_eq!(provider("deploy to vercel"), DeployTarget::Vercel);
        assert_eq!(provider("deploy it"), DeployTarget::Vercel);
    }

    #[test]
    fn generic_deploy_words_beat_provider_names() {
        let provider = |text: &str| match classify(text).category {
            Category::Deploy { provider } => provider,
            other => panic!("expected deploy for {text:?}, got {other:?}"),
        };
        assert_eq!(provider("deploy to docker"), DeployTarget::Vercel);
        assert_eq!(provider("deploy to netlify"), DeployTarget::Vercel);
        assert_eq!(provider("host it on aws"), DeployTarget::Vercel);
        assert_eq!(provider("docker image called shop"), DeployTarget::Docker);
    }

    #[test]
    fn tools_beat_deploy() {
        assert_eq!(
            classify("deploy my next app").category,
            Category::Tool {
                tool: Tool::Next,
                action: ToolAction::Deploy
            }
        );
        assert_eq!(
            classify("host the node server on docker").category,
            Category::Tool {
                tool: Tool::Node,
                action: ToolAction::Deploy
            }
        );
        assert_eq!(classify("deploy my react app").category, Category::ReactCreate);
    }

    #[test]
    fn tools_and_actions() {
        assert_eq!(
            classify("start the vue app called shop").category,
            Category::Tool {
                tool: Tool::Vue,
                action: ToolAction::Start
            }
        );
        assert_eq!(
            classify("new nextjs project called site").category,
            Category::Tool {
                tool: Tool::Next,
                action: ToolAction::Create
            }
        );
        assert_eq!(
            classify("install huggingface transformers").category,
            Category::Tool {
                tool: Tool::Transformers,
                action: ToolAction::Install
            }
        );
        assert_eq!(
            classify("compile the node server").category,
            Category::Tool {
                tool: Tool::Node,
                action: ToolAction::Build
            }
        );
    }

    #[test]
    fn case_insensitive_category_case_preserving_target() {
        let i = classify("CREATE REACT APP CALLED MyShop");
        assert_eq!(i.category, Category::ReactCreate);
        assert_eq!(i.target, "MyShop");
    }
}
