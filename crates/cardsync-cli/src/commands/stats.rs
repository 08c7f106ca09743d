use std::path::Path;

use crate::commands::common::{format_stats_lines, load_stats};
use crate::error::CliError;

pub async fn run_stats(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let stats = load_stats(db_path).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        for line in format_stats_lines(&stats) {
            println!("{line}");
        }
    }
    Ok(())
}
