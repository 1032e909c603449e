//! Lists a player's matches and merges them into the queue.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use queue_core::{ApiError, FetchEvent, FetchItem, FetchKind, FetchStatus, PlayerKey};

use crate::CrawlerContext;
use crate::error::FetchError;
use crate::handler::{FetchHandler, HandlerFuture};

/// Queue writes derived from one match listing.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExpansionPlan {
    /// Rows to upsert, new and changed alike.
    pub writes: Vec<FetchItem>,
    /// Distinct ids in the listing.
    pub listed: usize,
    pub skipped_saved: usize,
    pub inserted: usize,
    pub revived: usize,
    pub raised: usize,
}

/// Decide what a listing changes in the queue.
///
/// For every distinct id of `discovered`, in listing order:
/// - already in `saved`: nothing
/// - queued: every queued row for it is raised to the parent's child
///   priority if below it, and revived to READY with `now` if FAIL; DONE
///   rows are left alone
/// - otherwise: a new READY `MATCH` item at the child priority
///
/// `queued` holds the existing `MATCH` rows for the discovered ids.
pub fn plan_expansion(
    parent: &FetchItem,
    discovered: &[String],
    saved: &HashSet<String>,
    queued: &[FetchItem],
    now: DateTime<Utc>,
) -> ExpansionPlan {
    let child_priority = parent.child_priority();

    let mut by_external: HashMap<&str, Vec<&FetchItem>> = HashMap::new();
    for item in queued {
        by_external.entry(item.external_id.as_str()).or_default().push(item);
    }

    let mut plan = ExpansionPlan::default();
    let mut seen = HashSet::new();

    for match_id in discovered {
        if !seen.insert(match_id.as_str()) {
            continue;
        }
        plan.listed += 1;

        if saved.contains(match_id) {
            plan.skipped_saved += 1;
            continue;
        }

        let Some(existing) = by_external.get(match_id.as_str()) else {
            plan.writes.push(parent.child(match_id.clone(), FetchKind::Match));
            plan.inserted += 1;
            continue;
        };

        for row in existing {
            if row.status.is_terminal() {
                continue;
            }

            let mut changed = (*row).clone();
            let mut dirty = false;

            if changed.status == FetchStatus::Fail {
                changed.status = FetchStatus::Ready;
                changed.updated_at = now;
                plan.revived += 1;
                dirty = true;
            }
            if changed.priority < child_priority {
                changed.priority = child_priority;
                plan.raised += 1;
                dirty = true;
            }
            if dirty {
                plan.writes.push(changed);
            }
        }
    }

    plan
}

/// Handles `IDENTITY` items.
pub struct IdentityHandler {
    ctx: CrawlerContext,
}

impl IdentityHandler {
    pub fn new(ctx: CrawlerContext) -> Self {
        Self { ctx }
    }

    /// Page through every match id since the season start.
    async fn list_all(&self, player: &PlayerKey) -> Result<Vec<String>, ApiError> {
        let page_size = self.ctx.config.page_size.max(1);
        let since = self.ctx.config.season_start_epoch;

        let mut ids = Vec::new();
        let mut offset = 0u32;
        loop {
            let page = self
                .ctx
                .api
                .list_match_ids(player, offset, page_size, since)
                .await?;
            let short = page.len() < page_size as usize;
            ids.extend(page);
            if short {
                break;
            }
            offset = offset.saturating_add(page_size);
        }

        Ok(ids)
    }

    async fn expand(&self, item: &FetchItem) -> Result<(), FetchError> {
        let player = PlayerKey::new(item.external_id.clone());
        let discovered = self.list_all(&player).await?;
        tracing::info!("Listed {} matches for {}", discovered.len(), player);

        let saved: HashSet<String> = self
            .ctx
            .matches
            .existing_ids(&discovered)
            .await?
            .into_iter()
            .collect();
        let queued = self.ctx.queue.find_many(&discovered, FetchKind::Match).await?;

        let plan = plan_expansion(item, &discovered, &saved, &queued, Utc::now());
        self.ctx.queue.bulk_upsert(&plan.writes).await?;

        tracing::info!(
            "Expanded {}: {} listed, {} saved, {} new, {} revived, {} raised",
            player,
            plan.listed,
            plan.skipped_saved,
            plan.inserted,
            plan.revived,
            plan.raised
        );
        self.ctx.emit(FetchEvent::MatchesExpanded {
            player: player.0,
            listed: plan.listed,
            inserted: plan.inserted,
            revived: plan.revived,
            raised: plan.raised,
            timestamp: Utc::now(),
        });

        Ok(())
    }
}

impl FetchHandler for IdentityHandler {
    fn kind(&self) -> FetchKind {
        FetchKind::Identity
    }

    fn handle<'a>(&'a self, item: &'a FetchItem) -> HandlerFuture<'a> {
        Box::pin(self.expand(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn queued(id: &str, status: FetchStatus, priority: i32) -> FetchItem {
        FetchItem::new(id, FetchKind::Match, priority)
            .with_status(status)
            .with_updated_at(Utc::now() - Duration::hours(1))
    }

    #[test]
    fn unseen_ids_become_ready_children() {
        let parent = FetchItem::new("puuid", FetchKind::Identity, 5);
        let plan = plan_expansion(&parent, &ids(&["m1", "m2"]), &HashSet::new(), &[], Utc::now());

        assert_eq!(plan.inserted, 2);
        assert_eq!(plan.writes.len(), 2);
        for item in &plan.writes {
            assert_eq!(item.kind, FetchKind::Match);
            assert_eq!(item.status, FetchStatus::Ready);
            assert_eq!(item.priority, 4);
        }
        assert_eq!(plan.writes[0].external_id, "m1");
        assert!(plan.writes[0].id < plan.writes[1].id);
    }

    #[test]
    fn saved_ids_are_skipped() {
        let parent = FetchItem::new("puuid", FetchKind::Identity, 5);
        let saved: HashSet<String> = ids(&["m1"]).into_iter().collect();
        // Even a queued FAIL row is left alone once the match is saved.
        let rows = vec![queued("m1", FetchStatus::Fail, 0)];

        let plan = plan_expansion(&parent, &ids(&["m1"]), &saved, &rows, Utc::now());
        assert_eq!(plan.skipped_saved, 1);
        assert!(plan.writes.is_empty());
    }

    #[test]
    fn failed_rows_are_revived() {
        let parent = FetchItem::new("puuid", FetchKind::Identity, 5);
        let row = queued("m1", FetchStatus::Fail, 4);
        let now = Utc::now();

        let plan = plan_expansion(&parent, &ids(&["m1"]), &HashSet::new(), &[row.clone()], now);
        assert_eq!(plan.revived, 1);
        assert_eq!(plan.raised, 0);
        assert_eq!(plan.writes.len(), 1);

        let revived = &plan.writes[0];
        assert_eq!(revived.id, row.id);
        assert_eq!(revived.status, FetchStatus::Ready);
        assert_eq!(revived.updated_at, now);
        assert_eq!(revived.priority, 4);
    }

    #[test]
    fn low_priority_rows_are_raised_without_touching_status() {
        let parent = FetchItem::new("puuid", FetchKind::Identity, 9);
        let ready = queued("m1", FetchStatus::Ready, 2);
        let fetching = queued("m2", FetchStatus::Fetching, 2);
        let level = queued("m3", FetchStatus::Ready, 8);
        let higher = queued("m4", FetchStatus::Ready, 50);
        let rows = vec![ready.clone(), fetching.clone(), level, higher];

        let plan = plan_expansion(
            &parent,
            &ids(&["m1", "m2", "m3", "m4"]),
            &HashSet::new(),
            &rows,
            Utc::now(),
        );
        assert_eq!(plan.raised, 2);
        assert_eq!(plan.writes.len(), 2);

        assert_eq!(plan.writes[0].id, ready.id);
        assert_eq!(plan.writes[0].priority, 8);
        assert_eq!(plan.writes[0].status, FetchStatus::Ready);
        assert_eq!(plan.writes[0].updated_at, ready.updated_at);

        assert_eq!(plan.writes[1].status, FetchStatus::Fetching);
    }

    #[test]
    fn failed_low_priority_row_is_written_once() {
        let parent = FetchItem::new("puuid", FetchKind::Identity, 9);
        let rows = vec![queued("m1", FetchStatus::Fail, 0)];

        let plan = plan_expansion(&parent, &ids(&["m1"]), &HashSet::new(), &rows, Utc::now());
        assert_eq!((plan.revived, plan.raised), (1, 1));
        assert_eq!(plan.writes.len(), 1);
        assert_eq!(plan.writes[0].priority, 8);
        assert_eq!(plan.writes[0].status, FetchStatus::Ready);
    }

    #[test]
    fn done_rows_stay_done() {
        let parent = FetchItem::new("puuid", FetchKind::Identity, 9);
        let rows = vec![queued("m1", FetchStatus::Done, 0)];

        let plan = plan_expansion(&parent, &ids(&["m1"]), &HashSet::new(), &rows, Utc::now());
        assert!(plan.writes.is_empty());
        assert_eq!(plan.inserted, 0);
    }

    #[test]
    fn duplicate_listing_ids_count_once() {
        let parent = FetchItem::new("puuid", FetchKind::Identity, 1);
        let plan = plan_expansion(
            &parent,
            &ids(&["m1", "m2", "m1"]),
            &HashSet::new(),
            &[],
            Utc::now(),
        );
        assert_eq!(plan.listed, 2);
        assert_eq!(plan.inserted, 2);
    }

    #[test]
    fn every_queued_row_for_an_id_is_updated() {
        let parent = FetchItem::new("puuid", FetchKind::Identity, 3);
        let rows = vec![queued("m1", FetchStatus::Fail, 2), queued("m1", FetchStatus::Fail, 2)];

        let plan = plan_expansion(&parent, &ids(&["m1"]), &HashSet::new(), &rows, Utc::now());
        assert_eq!(plan.revived, 2);
        assert_eq!(plan.writes.len(), 2);
    }
}
