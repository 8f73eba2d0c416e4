use crate::context::Ctx;

pub fn run(ctx: &Ctx) -> anyhow::Result<()> {
    let mut store = ctx.open_store_without_sync();
    if store.clear_identity() {
        println!("Logged out. Local progress is kept.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}
