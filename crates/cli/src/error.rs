use colored::Colorize;

/// Format an error for CLI display with contextual help messages.
pub fn display_error(err: &anyhow::Error) {
    let msg = format!("{err}");

    if msg.contains("Connection refused")
        || msg.contains("error sending request")
        || msg.contains("tcp connect error")
    {
        eprintln!("  {} Cannot connect to the manager", "ERROR".red().bold());
        eprintln!(
            "        Is the manager reachable? Check the endpoint: {}",
            "strato config show".dimmed()
        );
    } else if msg.contains("403") || msg.contains("Forbidden") {
        eprintln!("  {} Authentication failed", "ERROR".red().bold());
        eprintln!(
            "        Set your access key: {}",
            "strato config set access_key <key>".dimmed()
        );
    } else {
        eprintln!("  {} {}", "ERROR".red().bold(), msg);
        for cause in err.chain().skip(1) {
            eprintln!("        {} {cause}", "caused by:".dimmed());
        }
    }
}
