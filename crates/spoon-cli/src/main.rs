mod background;
mod cmd;
mod context;
mod output;
mod root;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cmd::{api::ApiSubcommand, config::ConfigSubcommand, tokens::TokensSubcommand};
use context::Ctx;
use spoon_core::config::{Config, WarnLevel};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "spoon",
    about = "Turn plain-language requests into scaffolding commands, and keep score",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding the state file (default: auto-detect from the state file or .git/)
    #[arg(long, global = true, env = "SPOON_ROOT")]
    root: Option<PathBuf>,

    /// Config file (default: <root>/spoon.yaml, then ~/.config/spoon/config.yaml)
    #[arg(long, global = true, env = "SPOON_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Answer "no" to every prompt instead of reading stdin
    #[arg(long, global = true)]
    no_input: bool,

    /// Answer "yes" to every prompt
    #[arg(long, global = true, short = 'y')]
    yes: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a request, then plan and run it
    #[command(alias = "bend")]
    Go {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Stage guidance, optionally followed by a request
    Awaken { text: Vec<String> },

    /// Show how a request would be routed without running anything
    Classify {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Create a Python environment
    Python {
        name: String,
        /// django, flask, fastapi, tensorflow, pytorch, ai, or basic
        #[arg(long, default_value = "basic")]
        kind: String,
    },

    /// Run a shell command, translating plain language when a key is set
    Shell {
        #[arg(
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        text: Vec<String>,
    },

    /// Talk to the assistant
    Ask {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Progress, stage, tokens and identity
    Status,

    /// Recent history entries
    History {
        /// guidance, exchanges, insights, deployments, environments, harnessed, operations, projects
        kind: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Show or top up the token balance
    Tokens {
        #[command(subcommand)]
        subcommand: Option<TokensSubcommand>,
    },

    /// Manage chat provider keys and the assistant model
    Api {
        #[command(subcommand)]
        subcommand: ApiSubcommand,
    },

    /// Link a GitHub account for gist sync
    Login {
        #[arg(long)]
        user: String,
        /// Personal access token with gist scope
        #[arg(long, env = "SPOON_GITHUB_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Forget the linked GitHub account
    Logout,

    /// Push local progress to the sync gist and merge the remote copy
    Sync,

    /// Reset progress to defaults
    Reset {
        /// Keep API keys and login
        #[arg(long)]
        keep_credentials: bool,
    },

    /// Inspect and validate configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn load_config(cli: &Cli, root: &std::path::Path) -> anyhow::Result<Config> {
    let config = Config::load(root, cli.config.as_deref()).context("failed to load config")?;
    if matches!(cli.command, Commands::Config { .. }) {
        return Ok(config);
    }
    let warnings = config.validate();
    for w in warnings.iter().filter(|w| w.level == WarnLevel::Warning) {
        eprintln!("warning: {}", w.message);
    }
    if Config::has_errors(&warnings) {
        let errors: Vec<&str> = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .map(|w| w.message.as_str())
            .collect();
        anyhow::bail!("invalid config: {}", errors.join("; "));
    }
    Ok(config)
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let config = match load_config(&cli, &root) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    };
    let ctx = Ctx::new(root, config, cli.json, cli.no_input, cli.yes);

    let result = match cli.command {
        Commands::Go { text } => cmd::go::run(&ctx, &text.join(" ")),
        Commands::Awaken { text } => {
            let text = text.join(" ");
            cmd::awaken::run(&ctx, Some(text.as_str()).filter(|t| !t.trim().is_empty()))
        }
        Commands::Classify { text } => cmd::classify::run(&ctx, &text.join(" ")),
        Commands::Python { name, kind } => cmd::python::run(&ctx, &name, &kind),
        Commands::Shell { text } => cmd::shell::run(&ctx, &text.join(" ")),
        Commands::Ask { text } => cmd::ask::run(&ctx, &text.join(" ")),
        Commands::Status => cmd::status::run(&ctx),
        Commands::History { kind, limit } => cmd::history::run(&ctx, kind.as_deref(), limit),
        Commands::Tokens { subcommand } => cmd::tokens::run(&ctx, subcommand),
        Commands::Api { subcommand } => cmd::api::run(&ctx, subcommand),
        Commands::Login { user, token } => cmd::login::run(&ctx, &user, &token),
        Commands::Logout => cmd::logout::run(&ctx),
        Commands::Sync => cmd::sync::run(&ctx),
        Commands::Reset { keep_credentials } => cmd::reset::run(&ctx, keep_credentials),
        Commands::Config { subcommand } => cmd::config::run(&ctx, subcommand),
    };

    ctx.finish();

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
