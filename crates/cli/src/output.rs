use colored::Colorize;
use comfy_table::{presets::NOTHING, ContentArrangement, Table};
use serde_json::{Map, Value};

/// Print a decorated section header.
pub fn print_header(title: &str) {
    let line = "─".repeat(36);
    println!();
    println!("  {}", title.bold());
    println!("  {}", line.dimmed());
}

/// Create a styled spinner with a message.
pub fn spinner(msg: &str) -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new_spinner();
    pb.set_style(
        indicatif::ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("  {spinner} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Print a two-column Field/Value table.
pub fn print_kv_table(rows: &[(String, String)]) {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        format!("  {}", "Field".bold()),
        "Value".bold().to_string(),
    ]);
    for (label, value) in rows {
        table.add_row(vec![format!("  {label}"), value.clone()]);
    }
    println!("{table}");
}

/// Print records as a table. The response schema may omit fields, so the
/// column set is the static field list filtered against the keys actually
/// present on the first row.
pub fn print_record_table(fields: &[(&str, &str)], rows: &[Map<String, Value>]) {
    let fields = present_fields(fields, rows.first());

    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        fields
            .iter()
            .enumerate()
            .map(|(i, (label, _))| {
                if i == 0 {
                    format!("  {}", label.bold())
                } else {
                    label.bold().to_string()
                }
            })
            .collect::<Vec<_>>(),
    );
    for row in rows {
        table.add_row(
            fields
                .iter()
                .enumerate()
                .map(|(i, (_, key))| {
                    let value = cell(row.get(*key));
                    if i == 0 {
                        format!("  {value}")
                    } else {
                        value
                    }
                })
                .collect::<Vec<_>>(),
        );
    }
    println!("{table}");
}

/// Filter a static field list down to the keys present on the first row.
pub fn present_fields<'a>(
    fields: &[(&'a str, &'a str)],
    first: Option<&Map<String, Value>>,
) -> Vec<(&'a str, &'a str)> {
    match first {
        Some(row) => fields
            .iter()
            .copied()
            .filter(|(_, key)| row.contains_key(*key))
            .collect(),
        None => fields.to_vec(),
    }
}

/// Render a JSON scalar for table display.
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
    }
}

/// Bytes to mebibytes, rounded to one decimal.
pub fn to_mib(bytes: f64) -> f64 {
    (bytes / (1 << 20) as f64 * 10.0).round() / 10.0
}

/// Render a byte-count field as a MiB figure with one decimal.
pub fn mib_cell(value: Option<&Value>) -> String {
    match value.and_then(Value::as_f64) {
        Some(bytes) => format!("{:.1}", to_mib(bytes)),
        None => "-".to_string(),
    }
}
