use crate::context::{Ctx, RelayTranslator};
use crate::output::print_json;
use spoon_core::classifier::Intent;
use spoon_core::router::{RouteOutcome, Router};
use spoon_core::runner::StepState;
use spoon_core::store::ProgressStore;

pub fn run(ctx: &Ctx, text: &str) -> anyhow::Result<()> {
    let mut store = ctx.open_store();
    route(ctx, &mut store, text)
}

/// Classify and run `text` against an already-open store.
pub fn route(ctx: &Ctx, store: &mut ProgressStore, text: &str) -> anyhow::Result<()> {
    let translator = translator(ctx, store);
    let mut router = Router::new(ctx.runner());
    if let Some(t) = &translator {
        router = router.with_translator(t);
    }
    let outcome = router.route(store, text)?;
    drop(router);
    report(ctx, store, outcome)
}

/// Plan and run an intent built by the caller instead of the classifier.
pub fn execute(ctx: &Ctx, intent: Intent) -> anyhow::Result<()> {
    let mut store = ctx.open_store();
    let translator = translator(ctx, &store);
    let mut router = Router::new(ctx.runner());
    if let Some(t) = &translator {
        router = router.with_translator(t);
    }
    let outcome = router.execute(&mut store, intent)?;
    drop(router);
    report(ctx, &mut store, outcome)
}

fn translator(ctx: &Ctx, store: &ProgressStore) -> Option<RelayTranslator> {
    match ctx.chat_client(store.state()) {
        Ok(client) => Some(RelayTranslator(client)),
        Err(e) => {
            tracing::debug!("no command translation: {e}");
            None
        }
    }
}

fn report(ctx: &Ctx, store: &mut ProgressStore, outcome: RouteOutcome) -> anyhow::Result<()> {
    if let RouteOutcome::Conversation { intent } = &outcome {
        return super::ask::converse(ctx, store, &intent.text);
    }

    if ctx.json {
        print_json(&outcome)?;
    } else {
        print_outcome(&outcome, store);
    }

    match &outcome {
        RouteOutcome::Ran { outcome: plan, .. } if !plan.success() => {
            anyhow::bail!("plan {}", plan.status.as_str())
        }
        _ => Ok(()),
    }
}

fn print_outcome(outcome: &RouteOutcome, store: &ProgressStore) {
    let intent = outcome.intent();
    match outcome {
        RouteOutcome::NoOperation { .. } => {
            println!("Nothing to run for that request.");
            println!(
                "Try: {}",
                store.state().current_stage().next_step()
            );
        }
        RouteOutcome::Conversation { .. } => {}
        RouteOutcome::Ran {
            outcome: plan,
            translated,
            remedy,
            steps,
            ..
        } => {
            println!("{} → {}", intent.category, intent.target);
            if *translated {
                if let Some(step) = steps.first() {
                    println!("translated: {}", step.command);
                }
            }
            for step in &plan.steps {
                let mark = match &step.state {
                    StepState::Succeeded => "ok  ",
                    StepState::Failed { .. } => "FAIL",
                    StepState::Skipped => "skip",
                    StepState::Pending | StepState::Running => "    ",
                };
                match step.failure_text() {
                    Some(why) => println!("  [{mark}] {} ({why})", step.label),
                    None => println!("  [{mark}] {}", step.label),
                }
            }
            println!("status: {}", plan.status.as_str());
            if let Some(remedy) = remedy {
                println!("hint: {remedy}");
            }
            let state = store.state();
            println!(
                "progress: {:.0}% ({})",
                state.progress_value * 100.0,
                state.current_stage()
            );
        }
    }
}
