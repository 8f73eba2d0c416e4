use crate::context::Ctx;
use crate::output::print_json;
use clap::Subcommand;
use spoon_core::config::{Config, WarnLevel};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(ctx: &Ctx, subcmd: ConfigSubcommand) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(ctx),
        ConfigSubcommand::Validate => validate(ctx),
    }
}

fn show(ctx: &Ctx) -> anyhow::Result<()> {
    let source = ctx
        .config
        .source
        .as_ref()
        .map(|p| p.display().to_string());
    if ctx.json {
        return print_json(&serde_json::json!({
            "source": source,
            "config": ctx.config,
        }));
    }
    println!("# source: {}", source.as_deref().unwrap_or("built-in defaults"));
    print!("{}", ctx.config.to_yaml()?);
    Ok(())
}

fn validate(ctx: &Ctx) -> anyhow::Result<()> {
    let warnings = ctx.config.validate();

    if ctx.json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if Config::has_errors(&warnings) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
