use crate::context::Ctx;
use crate::output::{print_json, print_table};
use clap::Subcommand;
use spoon_core::state::mask_secret;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ApiSubcommand {
    /// Store an API key for a chat provider (openrouter, openai, ...)
    Add { provider: String, key: String },

    /// List stored providers with masked keys
    List,

    /// Forget a provider's key
    Remove { provider: String },

    /// Show or set the assistant model id
    Model { id: Option<String> },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(ctx: &Ctx, subcmd: ApiSubcommand) -> anyhow::Result<()> {
    let mut store = ctx.open_store();
    match subcmd {
        ApiSubcommand::Add { provider, key } => {
            let key = key.trim();
            if provider.trim().is_empty() || key.is_empty() {
                anyhow::bail!("provider and key must not be empty");
            }
            store.set_api_key(provider.trim(), key);
            if ctx.json {
                print_json(&serde_json::json!({
                    "provider": provider.trim().to_ascii_lowercase(),
                    "key": mask_secret(key),
                }))?;
            } else {
                println!("Stored key for {}.", provider.trim().to_ascii_lowercase());
            }
        }
        ApiSubcommand::List => {
            let keys = &store.state().api_keys;
            if ctx.json {
                let masked: serde_json::Map<String, serde_json::Value> = keys
                    .iter()
                    .map(|(p, k)| (p.clone(), mask_secret(k).into()))
                    .collect();
                print_json(&masked)?;
            } else if keys.is_empty() {
                println!("No API keys stored. Add one with: spoon api add openrouter <key>");
            } else {
                let rows: Vec<Vec<String>> = keys
                    .iter()
                    .map(|(p, k)| vec![p.clone(), mask_secret(k)])
                    .collect();
                print_table(&["PROVIDER", "KEY"], &rows);
            }
        }
        ApiSubcommand::Remove { provider } => {
            if !store.remove_api_key(&provider) {
                anyhow::bail!("no key stored for '{provider}'");
            }
            if !ctx.json {
                println!("Removed key for {}.", provider.to_ascii_lowercase());
            }
        }
        ApiSubcommand::Model { id } => {
            if let Some(id) = id {
                if id.trim().is_empty() {
                    anyhow::bail!("model id must not be empty");
                }
                store.set_model(id.trim());
            }
            let model = &store.state().assistant_model;
            if ctx.json {
                print_json(&serde_json::json!({ "assistant_model": model }))?;
            } else {
                println!("model: {model}");
            }
        }
    }
    Ok(())
}
