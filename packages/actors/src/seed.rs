use db::DbError;
use db::repositories::FetchQueueRepository;
use queue_core::{FetchItem, FetchKind};

/// Enqueue each account as an `IDENTITY_ID` item unless one already exists.
///
/// Returns how many items were added.
pub async fn seed_accounts(
    queue: &FetchQueueRepository,
    accounts: &[String],
    priority: i32,
) -> Result<usize, DbError> {
    let mut added = 0;
    for account in accounts {
        if queue.exists_with_kind(account, FetchKind::IdentityId).await? {
            tracing::debug!("Seed account {} already queued", account);
            continue;
        }
        queue
            .enqueue(&FetchItem::new(account.as_str(), FetchKind::IdentityId, priority))
            .await?;
        added += 1;
    }
    if added > 0 {
        tracing::info!("Seeded {} accounts at priority {}", added, priority);
    }
    Ok(added)
}
