//! Static table of shell command templates.
//!
//! Every `{name}` in `template` and `creates` is replaced by the extracted
//! target, which only ever contains `[A-Za-z0-9_-]`.

use crate::types::{Backend, DeployTarget, Frontend, PythonKind, Tool, ToolAction};
use serde::Serialize;

pub const NAME_PLACEHOLDER: &str = "{name}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommandTemplate {
    pub id: &'static str,
    pub human_name: &'static str,
    pub template: &'static str,
    pub description: &'static str,
    /// Directory the command creates, relative to the working directory.
    pub creates: Option<&'static str>,
    /// Executable that must be on PATH for the command to work.
    pub requires: Option<&'static str>,
}

impl CommandTemplate {
    pub fn render(&self, name: &str) -> String {
        self.template.replace(NAME_PLACEHOLDER, name)
    }

    pub fn render_creates(&self, name: &str) -> Option<String> {
        self.creates.map(|c| c.replace(NAME_PLACEHOLDER, name))
    }
}

macro_rules! template {
    ($id:literal, $human:literal, $tpl:expr, $desc:literal, creates: $creates:expr, requires: $req:expr) => {
        CommandTemplate {
            id: $id,
            human_name: $human,
            template: $tpl,
            description: $desc,
            creates: $creates,
            requires: $req,
        }
    };
}

pub static CATALOG: &[CommandTemplate] = &[
    // Frontends
    template!("react-app", "React", "npx create-react-app {name}",
        "Create a React single-page app",
        creates: Some("{name}"), requires: Some("npx")),
    template!("react-frontend", "React frontend", "npx create-react-app {name}-frontend",
        "React frontend half of a full-stack project",
        creates: Some("{name}-frontend"), requires: Some("npx")),
    template!("next-frontend", "Next.js frontend", "npx create-next-app@latest {name}-frontend",
        "Next.js frontend half of a full-stack project",
        creates: Some("{name}-frontend"), requires: Some("npx")),
    template!("html-site", "Static site",
        "mkdir {name} && printf '<!DOCTYPE html>\\n<html>\\n<head><title>{name}</title></head>\\n<body>\\n<h1>{name}</h1>\\n</body>\\n</html>\\n' > {name}/index.html",
        "Plain HTML project with an index page",
        creates: Some("{name}"), requires: None),
    // Backends
    template!("node-backend", "Node backend",
        "mkdir {name}-backend && cd {name}-backend && npm init -y && npm install express cors",
        "Express API backend",
        creates: Some("{name}-backend"), requires: Some("npm")),
    template!("python-backend", "Python backend",
        "mkdir {name}-backend && cd {name}-backend && python3 -m venv env && env/bin/pip install flask flask-cors",
        "Flask API backend in a virtual environment",
        creates: Some("{name}-backend"), requires: Some("python3")),
    // Python environments
    template!("python-django", "Django",
        "django-admin startproject {name} && cd {name} && python3 manage.py startapp api",
        "Django project with an api app",
        creates: Some("{name}"), requires: Some("django-admin")),
    template!("python-flask", "Flask",
        "mkdir {name} && cd {name} && python3 -m venv venv && venv/bin/pip install flask python-dotenv && touch app.py requirements.txt",
        "Flask project in a virtual environment",
        creates: Some("{name}"), requires: Some("python3")),
    template!("python-fastapi", "FastAPI",
        "mkdir {name} && cd {name} && python3 -m venv venv && venv/bin/pip install fastapi uvicorn && touch main.py requirements.txt",
        "FastAPI project in a virtual environment",
        creates: Some("{name}"), requires: Some("python3")),
    template!("python-tensorflow", "TensorFlow",
        "mkdir {name} && cd {name} && python3 -m venv tf_env && tf_env/bin/pip install tensorflow numpy matplotlib",
        "TensorFlow workspace",
        creates: Some("{name}"), requires: Some("python3")),
    template!("python-pytorch", "PyTorch",
        "mkdir {name} && cd {name} && python3 -m venv torch_env && torch_env/bin/pip install torch torchvision numpy",
        "PyTorch workspace",
        creates: Some("{name}"), requires: Some("python3")),
    template!("python-ai", "Python AI",
        "mkdir {name} && cd {name} && python3 -m venv ai_env && ai_env/bin/pip install numpy pandas matplotlib scikit-learn jupyter",
        "General machine-learning workspace",
        creates: Some("{name}"), requires: Some("python3")),
    template!("python-basic", "Python venv", "python3 -m venv {name}_env",
        "Bare virtual environment",
        creates: Some("{name}_env"), requires: Some("python3")),
    // Deployment
    template!("deploy-netlify", "Netlify", "netlify deploy --prod",
        "Deploy the current directory to Netlify",
        creates: None, requires: Some("netlify")),
    template!("deploy-docker", "Docker", "docker build -t {name} .",
        "Build a container image from the current directory",
        creates: None, requires: Some("docker")),
    template!("deploy-aws", "AWS", "aws deploy create-deployment",
        "Start an AWS CodeDeploy deployment",
        creates: None, requires: Some("aws")),
    template!("deploy-vercel", "Vercel", "vercel --prod --yes",
        "Deploy the current directory to Vercel",
        creates: None, requires: Some("vercel")),
    // Individual tools
    template!("next-create", "Next.js", "npx create-next-app@latest {name}",
        "Create a Next.js app",
        creates: Some("{name}"), requires: Some("npx")),
    template!("next-start", "Next.js", "cd {name} && npm run dev",
        "Run the Next.js dev server",
        creates: None, requires: Some("npm")),
    template!("next-build", "Next.js", "cd {name} && npm run build",
        "Production build of a Next.js app",
        creates: None, requires: Some("npm")),
    template!("vue-create", "Vue", "npm create vue@latest {name}",
        "Create a Vue app",
        creates: Some("{name}"), requires: Some("npm")),
    template!("vue-start", "Vue", "cd {name} && npm run dev",
        "Run the Vue dev server",
        creates: None, requires: Some("npm")),
    template!("node-create", "Node.js", "mkdir {name} && cd {name} && npm init -y",
        "Create an empty Node.js package",
        creates: Some("{name}"), requires: Some("npm")),
    template!("node-install", "Node.js", "cd {name} && npm install express cors",
        "Install the API dependencies",
        creates: None, requires: Some("npm")),
    template!("transformers-install", "Hugging Face", "pip install transformers datasets",
        "Install the transformers library",
        creates: None, requires: Some("pip")),
];

pub fn lookup(id: &str) -> Option<&'static CommandTemplate> {
    CATALOG.iter().find(|t| t.id == id)
}

// ---------------------------------------------------------------------------
// Typed selectors
// ---------------------------------------------------------------------------

pub fn frontend_template(frontend: Frontend) -> &'static str {
    match frontend {
        Frontend::React => "react-frontend",
        Frontend::Next => "next-frontend",
    }
}

pub fn backend_template(backend: Backend) -> &'static str {
    match backend {
        Backend::Node => "node-backend",
        Backend::Python => "python-backend",
    }
}

pub fn python_template(kind: PythonKind) -> &'static str {
    match kind {
        PythonKind::Django => "python-django",
        PythonKind::Flask => "python-flask",
        PythonKind::Fastapi => "python-fastapi",
        PythonKind::Tensorflow => "python-tensorflow",
        PythonKind::Pytorch => "python-pytorch",
        PythonKind::Ai => "python-ai",
        PythonKind::Basic => "python-basic",
    }
}

pub fn deploy_template(target: DeployTarget) -> &'static str {
    match target {
        DeployTarget::Netlify => "deploy-netlify",
        DeployTarget::Docker => "deploy-docker",
        DeployTarget::Aws => "deploy-aws",
        DeployTarget::Vercel => "deploy-vercel",
    }
}

/// Template for `tool` performing `action`. A tool that has no template for
/// the requested action falls back to its primary one.
pub fn tool_template(tool: Tool, action: ToolAction) -> &'static CommandTemplate {
    let primary = match tool {
        Tool::Next => "next-create",
        Tool::Vue => "vue-create",
        Tool::Node => "node-create",
        Tool::Transformers => "transformers-install",
    };
    let id = format!("{}-{}", tool.as_str(), action.as_str());
    lookup(&id)
        .or_else(|| lookup(primary))
        .unwrap_or(&CATALOG[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = CATALOG.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), CATALOG.len());
    }

    #[test]
    fn typed_selectors_resolve() {
        for &k in PythonKind::all() {
            assert!(lookup(python_template(k)).is_some(), "{k}");
        }
        for &t in DeployTarget::all() {
            assert!(lookup(deploy_template(t)).is_some(), "{t}");
        }
        for &f in Frontend::all() {
            assert!(lookup(frontend_template(f)).is_some(), "{f}");
        }
        for &b in Backend::all() {
            assert!(lookup(backend_template(b)).is_some(), "{b}");
        }
    }

    #[test]
    fn render_replaces_every_placeholder() {
        let t = lookup("html-site").unwrap();
        let cmd = t.render("demo");
        assert!(!cmd.contains(NAME_PLACEHOLDER));
        assert_eq!(cmd.matches("demo").count(), 4);
        assert_eq!(t.render_creates("demo").as_deref(), Some("demo"));
    }

    #[test]
    fn tool_template_falls_back_to_primary() {
        assert_eq!(tool_template(Tool::Next, ToolAction::Build).id, "next-build");
        assert_eq!(tool_template(Tool::Vue, ToolAction::Deploy).id, "vue-create");
        assert_eq!(
            tool_template(Tool::Transformers, ToolAction::Create).id,
            "transformers-install"
        );
    }
}
