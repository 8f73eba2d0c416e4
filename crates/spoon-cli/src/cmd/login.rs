use crate::context::Ctx;
use anyhow::Context;
use spoon_core::state::Identity;
use spoon_relay::RelayError;

/// Verify the token against GitHub, store the identity, then pull the
/// remote copy of the state (or seed it from the local one).
pub fn run(ctx: &Ctx, user: &str, token: &str) -> anyhow::Result<()> {
    let identity = Identity {
        username: user.trim().to_string(),
        auth_token: token.trim().to_string(),
    };
    if identity.username.is_empty() {
        anyhow::bail!("username must not be empty");
    }

    let client = ctx.gist_client(&identity)?;
    match client.verify_user() {
        Ok(true) => {}
        Ok(false) => anyhow::bail!("token does not belong to GitHub user '{user}'"),
        Err(RelayError::InvalidCredential) => {
            anyhow::bail!("GitHub rejected the token; use a personal access token with 'gist' scope")
        }
        Err(e) => return Err(e).context("could not verify GitHub token"),
    }

    let mut store = ctx.open_store_without_sync();
    store.set_identity(identity);

    match client.pull() {
        Ok(Some(blob)) => match store.merge_remote(&blob) {
            Ok(()) => println!("Logged in as {user}; restored remote progress."),
            Err(e) => {
                tracing::warn!("remote state unreadable, keeping local: {e}");
                println!("Logged in as {user}.");
            }
        },
        Ok(None) => {
            client
                .push(&store.shareable_snapshot())
                .context("could not create the sync gist")?;
            println!("Logged in as {user}; local progress uploaded.");
        }
        Err(e) => {
            tracing::warn!("could not fetch remote state: {e}");
            println!("Logged in as {user}.");
        }
    }
    store.mark_synced();
    Ok(())
}
