use crate::context::Ctx;
use crate::output::{print_fields, print_json};
use spoon_core::classifier::classify;
use spoon_core::planner;

/// Show how `text` would be routed. Touches neither disk nor state.
pub fn run(ctx: &Ctx, text: &str) -> anyhow::Result<()> {
    let intent = classify(text);
    let steps = planner::plan(&intent);

    if ctx.json {
        return print_json(&serde_json::json!({
            "intent": intent,
            "steps": steps,
        }));
    }

    let mut fields = vec![
        ("category", intent.category.name().to_string()),
        ("target", intent.target.clone()),
        ("rule", intent.rule.unwrap_or("-").to_string()),
    ];
    if let Some(detail) = intent.category.detail() {
        fields.push(("detail", detail));
    }
    print_fields(&fields);

    if steps.is_empty() {
        println!("plan: (nothing to run)");
    } else {
        println!("plan:");
        for (i, step) in steps.iter().enumerate() {
            println!("  {}. {}", i + 1, step.command);
        }
    }
    Ok(())
}
