use std::path::Path;

use crate::commands::common::{format_item_lines, item_to_list_item, list_pending, QueueListItem};
use crate::error::CliError;

pub async fn run_list(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let items = list_pending(db_path).await?;

    if as_json {
        let json_items = items
            .iter()
            .map(item_to_list_item)
            .collect::<Vec<QueueListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("Sync queue is empty.");
        return Ok(());
    }

    for line in format_item_lines(&items) {
        println!("{line}");
    }
    Ok(())
}
