use anyhow::Result;
use colored::Colorize;
use serde_json::Value;
use strato_client::ApiSession;

use crate::output;

pub async fn run(
    session: &ApiSession,
    scaling_group: &str,
    group: &str,
    all: bool,
    json: bool,
) -> Result<()> {
    if session.endpoint_type() != "session" {
        anyhow::bail!("To use get-resources, your endpoint type must be \"session\".");
    }

    let sp = if !json {
        Some(output::spinner("Fetching available resources..."))
    } else {
        None
    };
    let ret = session
        .resource()
        .get_available_resources(scaling_group, group)
        .await?;
    if let Some(sp) = sp {
        sp.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&ret)?);
        return Ok(());
    }

    output::print_header("Available Resources");
    println!("  Total remaining resources of scaling group [{scaling_group}]:");
    print_cpu_mem("    ", ret.get("scaling_group_remaining"));

    println!("  Resources per scaling group:");
    if all {
        if let Some(groups) = ret.get("scaling_groups").and_then(Value::as_object) {
            for (name, usage) in groups {
                print_scaling_group(name, usage);
            }
        }
    } else {
        let usage = ret
            .get("scaling_groups")
            .and_then(|g| g.get(scaling_group))
            .cloned()
            .unwrap_or(Value::Null);
        print_scaling_group(scaling_group, &usage);
    }

    println!("  Group limits:");
    print_cpu_mem("    ", ret.get("group_limits"));
    println!("  Group using:");
    print_cpu_mem("    ", ret.get("group_using"));
    println!("  Group remaining:");
    print_cpu_mem("    ", ret.get("group_remaining"));
    println!();
    Ok(())
}

fn print_scaling_group(name: &str, usage: &Value) {
    println!("    [{}]", name.bold());
    println!("      Using:");
    print_cpu_mem("        ", usage.get("using"));
    println!("      Remaining:");
    print_cpu_mem("        ", usage.get("remaining"));
}

fn print_cpu_mem(indent: &str, node: Option<&Value>) {
    let cpu = output::cell(node.and_then(|n| n.get("cpu")));
    let mem = output::cell(node.and_then(|n| n.get("mem")));
    println!("{indent}{} {cpu}", "CPU:".dimmed());
    println!("{indent}{} {mem}", "Memory:".dimmed());
}
