use crate::context::Ctx;
use spoon_core::prompt::Confirm;

pub fn run(ctx: &Ctx, keep_credentials: bool) -> anyhow::Result<()> {
    let question = if keep_credentials {
        "Reset all progress and history (keys and login are kept)?"
    } else {
        "Reset all progress, history, keys and login?"
    };
    if !ctx.confirm().confirm(question) {
        anyhow::bail!("reset cancelled");
    }
    let mut store = ctx.open_store_without_sync();
    store.reset(keep_credentials);
    println!("Progress reset.");
    Ok(())
}
