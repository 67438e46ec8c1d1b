use anyhow::Result;
use colored::Colorize;
use serde_json::{json, Map, Value};
use strato_client::ApiSession;

use crate::cli::SessionStatus;
use crate::output;

const SESSION_LIST_FIELDS: &[(&str, &str)] = &[
    ("Session ID", "sess_id"),
    ("Lang/runtime", "lang"),
    ("Tag", "tag"),
    ("Created At", "created_at"),
    ("Terminated At", "terminated_at"),
    ("Status", "status"),
    ("CPU Cores", "cpu_slot"),
    ("CPU Used (ns)", "cpu_used"),
    ("Total Memory (MiB)", "mem_slot"),
    ("Used Memory (MiB)", "mem_cur_bytes"),
    ("GPU Cores", "gpu_slot"),
];

const SESSION_DETAIL_FIELDS: &[(&str, &str)] = &[
    ("Session ID", "sess_id"),
    ("Role", "role"),
    ("Lang/runtime", "lang"),
    ("Tag", "tag"),
    ("Created At", "created_at"),
    ("Terminated At", "terminated_at"),
    ("Agent", "agent"),
    ("Status", "status"),
    ("Status Info", "status_info"),
    ("CPU Cores", "cpu_slot"),
    ("CPU Used (ns)", "cpu_used"),
    ("Total Memory (MiB)", "mem_slot"),
    ("Used Memory (MiB)", "mem_cur_bytes"),
    ("Max Used Memory (MiB)", "mem_max_bytes"),
    ("GPU Cores", "gpu_slot"),
    ("Number of Queries", "num_queries"),
    ("Network RX Bytes", "net_rx_bytes"),
    ("Network TX Bytes", "net_tx_bytes"),
    ("IO Read Bytes", "io_read_bytes"),
    ("IO Write Bytes", "io_write_bytes"),
    ("IO Max Scratch Size", "io_max_scratch_size"),
    ("IO Current Scratch Size", "io_cur_scratch_size"),
];

/// Byte-count fields rendered as MiB figures.
const MIB_FIELDS: &[&str] = &["mem_cur_bytes", "mem_max_bytes"];

fn join_keys(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(_, key)| *key)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Query string for the session list; the access-key variant adds the
/// `$ak` parameter (requires super-admin privilege server-side).
fn list_query(with_access_key: bool) -> String {
    let fields = join_keys(SESSION_LIST_FIELDS);
    if with_access_key {
        format!(
            "query($ak:String, $status:String) {{ \
             compute_sessions(access_key:$ak, status:$status) {{ {fields} }} }}"
        )
    } else {
        format!(
            "query($status:String) {{ \
             compute_sessions(status:$status) {{ {fields} }} }}"
        )
    }
}

fn list_variables(status: SessionStatus, access_key: Option<&str>) -> Value {
    json!({
        "status": status.as_filter(),
        "ak": access_key,
    })
}

fn detail_query() -> String {
    let fields = join_keys(SESSION_DETAIL_FIELDS);
    format!(
        "query($sess_id:String) {{ \
         compute_session(sess_id:$sess_id) {{ {fields} }} }}"
    )
}

pub async fn list(
    session: &ApiSession,
    status: SessionStatus,
    access_key: Option<&str>,
    json: bool,
) -> Result<()> {
    let query = list_query(access_key.is_some());
    let variables = list_variables(status, access_key);

    let sp = if !json {
        Some(output::spinner("Loading compute sessions..."))
    } else {
        None
    };
    let resp = session.admin().query(&query, &variables).await?;
    if let Some(sp) = sp {
        sp.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&resp)?);
        return Ok(());
    }

    let rows: Vec<Map<String, Value>> = resp
        .get("compute_sessions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    if rows.is_empty() {
        println!(
            "  {}",
            "There are no compute sessions currently running.".dimmed()
        );
        return Ok(());
    }

    let rows: Vec<Map<String, Value>> = rows.into_iter().map(convert_mib_fields).collect();

    output::print_header("Compute Sessions");
    output::print_record_table(SESSION_LIST_FIELDS, &rows);
    println!();
    Ok(())
}

pub async fn show(session: &ApiSession, sess_id_or_alias: &str, json: bool) -> Result<()> {
    let variables = json!({ "sess_id": sess_id_or_alias });

    let sp = if !json {
        Some(output::spinner("Fetching session detail..."))
    } else {
        None
    };
    let resp = session.admin().query(&detail_query(), &variables).await?;
    if let Some(sp) = sp {
        sp.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&resp)?);
        return Ok(());
    }

    let detail = resp
        .get("compute_session")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let missing = detail
        .get("sess_id")
        .map(Value::is_null)
        .unwrap_or(true);
    if missing {
        println!(
            "  {}",
            "There is no such running compute session.".dimmed()
        );
        return Ok(());
    }

    output::print_header("Session Detail");
    for (label, key) in SESSION_DETAIL_FIELDS {
        if let Some(value) = detail.get(*key) {
            let rendered = if MIB_FIELDS.contains(key) {
                output::mib_cell(Some(value))
            } else {
                output::cell(Some(value))
            };
            println!("  {}: {}", label.dimmed(), rendered);
        }
    }
    println!();
    Ok(())
}

/// Replace raw byte counts with their MiB rendering before display.
fn convert_mib_fields(mut row: Map<String, Value>) -> Map<String, Value> {
    for key in MIB_FIELDS {
        if let Some(value) = row.get(*key) {
            let rendered = output::mib_cell(Some(value));
            row.insert(key.to_string(), Value::String(rendered));
        }
    }
    row
}
