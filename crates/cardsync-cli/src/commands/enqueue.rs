use std::path::Path;

use cardsync_core::QueueItemDraft;

use crate::commands::common::{enqueue_item, normalize_item_type, resolve_item_data};
use crate::error::CliError;

pub async fn run_enqueue(
    item_type: &str,
    data: Option<String>,
    id: Option<String>,
    priority: i32,
    db_path: &Path,
) -> Result<(), CliError> {
    let item_type = normalize_item_type(item_type)?;
    let data = resolve_item_data(data)?;

    let mut draft = QueueItemDraft::new(item_type, data).with_priority(priority);
    if let Some(id) = id {
        draft = draft.with_id(id);
    }

    let id = enqueue_item(db_path, draft).await?;
    println!("{id}");
    Ok(())
}
