use crate::context::Ctx;
use crate::output::{print_json, print_table};
use serde::Serialize;
use spoon_core::state::HistoryEntry;
use spoon_core::types::HistoryKind;

#[derive(Serialize)]
struct Row<'a> {
    kind: &'static str,
    #[serde(flatten)]
    entry: &'a HistoryEntry,
}

/// Newest `limit` entries of one history list, or of every list.
pub fn run(ctx: &Ctx, kind: Option<&str>, limit: usize) -> anyhow::Result<()> {
    let kinds: Vec<HistoryKind> = match kind {
        Some(k) => vec![k.parse()?],
        None => HistoryKind::all().to_vec(),
    };

    let store = ctx.open_store();
    let history = &store.state().history;
    let rows: Vec<Row> = kinds
        .iter()
        .flat_map(move |&kind| {
            let list = history.list(kind);
            list[list.len().saturating_sub(limit)..]
                .iter()
                .map(move |entry| Row {
                    kind: kind.as_str(),
                    entry,
                })
        })
        .collect();

    if ctx.json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No history yet.");
        return Ok(());
    }
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.kind.to_string(),
                r.entry.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                r.entry.subject.clone(),
                r.entry.note.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["KIND", "WHEN", "SUBJECT", "NOTE"], &table);
    Ok(())
}
