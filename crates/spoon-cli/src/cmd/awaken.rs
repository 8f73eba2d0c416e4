use crate::context::Ctx;
use crate::output::print_json;
use spoon_core::types::{ActionKind, HistoryKind};

/// Stage guidance, then route `text` like `go` when one is given.
pub fn run(ctx: &Ctx, text: Option<&str>) -> anyhow::Result<()> {
    let mut store = ctx.open_store();
    let stage = store.state().current_stage();
    store.record(HistoryKind::Guidance, stage.as_str(), Some(stage.guidance()));
    let progress = store.advance_for(ActionKind::Guidance);

    if ctx.json && text.is_none() {
        print_json(&serde_json::json!({
            "stage": stage,
            "guidance": stage.guidance(),
            "next_step": stage.next_step(),
            "progress": progress,
        }))?;
    } else if !ctx.json {
        println!("{}", stage.guidance());
        println!("next: {}", stage.next_step());
    }

    match text {
        Some(text) => super::go::route(ctx, &mut store, text),
        None => Ok(()),
    }
}
