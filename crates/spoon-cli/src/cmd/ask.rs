use crate::context::Ctx;
use crate::output::print_json;
use spoon_core::state::ProgressState;
use spoon_core::store::ProgressStore;
use spoon_core::types::{ActionKind, HistoryKind};
use spoon_core::SpoonError;

pub fn run(ctx: &Ctx, text: &str) -> anyhow::Result<()> {
    let mut store = ctx.open_store();
    converse(ctx, &mut store, text)
}

/// Answer `text` with the chat endpoint, or with canned guidance when no
/// key is configured or the call fails.
pub fn converse(ctx: &Ctx, store: &mut ProgressStore, text: &str) -> anyhow::Result<()> {
    let (reply, offline) = match ctx.chat_client(store.state()) {
        Err(e) => {
            tracing::debug!("assistant offline: {e}");
            (offline_reply(store.state()), true)
        }
        Ok(client) => {
            if !store.consume_token() {
                return Err(SpoonError::TokensExhausted.into());
            }
            let prompt = system_prompt(store.state());
            match client.complete(&prompt, text, ctx.config.relay.chat_max_tokens) {
                Ok(reply) => (reply, false),
                Err(e) => {
                    tracing::warn!("assistant unavailable ({e}); answering offline");
                    (offline_reply(store.state()), true)
                }
            }
        }
    };

    store.advance_for(ActionKind::Chat);
    store.record(HistoryKind::Exchanges, text, Some(summary(&reply)));

    if ctx.json {
        print_json(&serde_json::json!({
            "reply": reply,
            "offline": offline,
            "token_balance": store.state().token_balance,
        }))
    } else {
        println!("{reply}");
        Ok(())
    }
}

fn system_prompt(state: &ProgressState) -> String {
    let tools: Vec<&str> = state
        .history
        .harnessed
        .iter()
        .map(|e| e.subject.as_str())
        .collect();
    let projects: Vec<&str> = state
        .history
        .projects
        .iter()
        .map(|e| e.subject.as_str())
        .collect();
    format!(
        "You are the guide inside the spoon terminal assistant. Be concise, practical, \
         and a little mysterious.\n\nContext:\n- Stage: {}\n- Progress: {:.1}%\n\
         - Harnessed tools: {}\n- Projects: {}",
        state.current_stage(),
        state.progress_value * 100.0,
        join_or_none(&tools),
        join_or_none(&projects),
    )
}

fn join_or_none(items: &[&str]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn offline_reply(state: &ProgressState) -> String {
    let stage = state.current_stage();
    format!(
        "{} Try: {}\n(offline: add a key with 'spoon api add openrouter <key>')",
        stage.guidance(),
        stage.next_step()
    )
}

/// First line of the reply, capped for the history note.
fn summary(reply: &str) -> &str {
    let line = reply.lines().next().unwrap_or("");
    match line.char_indices().nth(80) {
        Some((i, _)) => &line[..i],
        None => line,
    }
}
