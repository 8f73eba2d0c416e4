use crate::context::Ctx;
use crate::output::{print_fields, print_json};
use serde::Serialize;
use spoon_core::types::{HistoryKind, Stage};
use std::collections::BTreeMap;

#[derive(Serialize)]
struct StatusOutput<'a> {
    progress: f64,
    stage: Stage,
    command_count: u64,
    system_control: f64,
    token_balance: u32,
    assistant_model: &'a str,
    providers: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    identity: Option<IdentityOutput<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_remote_sync: Option<String>,
    history: BTreeMap<&'static str, usize>,
    next_step: &'static str,
}

#[derive(Serialize)]
struct IdentityOutput<'a> {
    username: &'a str,
    token: String,
}

pub fn run(ctx: &Ctx) -> anyhow::Result<()> {
    let store = ctx.open_store();
    let state = store.state();
    let stage = state.current_stage();

    let out = StatusOutput {
        progress: state.progress_value,
        stage,
        command_count: state.command_count,
        system_control: state.system_control,
        token_balance: state.token_balance,
        assistant_model: &state.assistant_model,
        providers: state.api_keys.keys().map(String::as_str).collect(),
        identity: state.identity.as_ref().map(|i| IdentityOutput {
            username: &i.username,
            token: i.masked_token(),
        }),
        last_remote_sync: state.last_remote_sync.map(|t| t.to_rfc3339()),
        history: HistoryKind::all()
            .iter()
            .map(|&k| (k.as_str(), state.history.list(k).len()))
            .collect(),
        next_step: stage.next_step(),
    };

    if ctx.json {
        return print_json(&out);
    }

    let mut fields = vec![
        ("progress", format!("{:.1}%", out.progress * 100.0)),
        ("stage", stage.to_string()),
        ("commands", out.command_count.to_string()),
        ("control", format!("{:.1}%", out.system_control * 100.0)),
        ("tokens", out.token_balance.to_string()),
        ("model", out.assistant_model.to_string()),
        (
            "providers",
            if out.providers.is_empty() {
                "none".to_string()
            } else {
                out.providers.join(", ")
            },
        ),
    ];
    match &out.identity {
        Some(id) => fields.push(("identity", format!("{} ({})", id.username, id.token))),
        None => fields.push(("identity", "not logged in".to_string())),
    }
    if let Some(when) = &out.last_remote_sync {
        fields.push(("last sync", when.clone()));
    }
    fields.push(("next", out.next_step.to_string()));
    print_fields(&fields);
    Ok(())
}
