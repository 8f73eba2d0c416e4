use crate::context::Ctx;
use crate::output::print_json;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum TokensSubcommand {
    /// Top up the token balance
    Add {
        /// Tokens to add
        amount: u32,
    },
}

pub fn run(ctx: &Ctx, subcmd: Option<TokensSubcommand>) -> anyhow::Result<()> {
    let mut store = ctx.open_store();
    let balance = match subcmd {
        None => store.state().token_balance,
        Some(TokensSubcommand::Add { amount }) => {
            if amount == 0 {
                anyhow::bail!("amount must be greater than 0");
            }
            store.add_tokens(amount)
        }
    };

    if ctx.json {
        print_json(&serde_json::json!({ "token_balance": balance }))
    } else {
        println!("tokens: {balance}");
        Ok(())
    }
}
