use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn width(s: &str) -> usize {
    s.chars().count()
}

fn pad(s: &str, w: usize) -> String {
    format!("{s}{}", " ".repeat(w.saturating_sub(width(s))))
}

/// Aligned columns with a dashed rule under the header.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| width(h)).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(width(cell));
        }
    }

    let line = |cells: Vec<String>| println!("{}", cells.join("  ").trim_end());
    line(
        headers
            .iter()
            .zip(&widths)
            .map(|(h, &w)| pad(h, w))
            .collect(),
    );
    line(widths.iter().map(|&w| "-".repeat(w)).collect());
    for row in rows {
        line(row.iter().zip(&widths).map(|(c, &w)| pad(c, w)).collect());
    }
}

/// `label: value` pairs with the values aligned.
pub fn print_fields(fields: &[(&str, String)]) {
    let w = fields.iter().map(|(k, _)| width(k)).max().unwrap_or(0);
    for (key, value) in fields {
        println!("{}  {value}", pad(&format!("{key}:"), w + 1));
    }
}
