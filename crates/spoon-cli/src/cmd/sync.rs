use crate::context::Ctx;
use crate::output::print_json;
use anyhow::Context;
use spoon_core::SpoonError;

/// Push the local state to the sync gist, then merge the remote copy back.
pub fn run(ctx: &Ctx) -> anyhow::Result<()> {
    let mut store = ctx.open_store_without_sync();
    let identity = store
        .state()
        .identity
        .clone()
        .ok_or(SpoonError::NotLoggedIn)?;
    let client = ctx.gist_client(&identity)?;

    let gist = client.push(&store.shareable_snapshot()).context("sync push failed")?;
    if let Some(blob) = client.pull().context("sync pull failed")? {
        store
            .merge_remote(&blob)
            .map_err(|e| SpoonError::Remote(e.to_string()))?;
    }
    store.mark_synced();

    if ctx.json {
        print_json(&serde_json::json!({
            "gist": gist,
            "last_remote_sync": store.state().last_remote_sync,
        }))
    } else {
        println!("Synced with gist {gist}.");
        Ok(())
    }
}
