//! Shared fixtures: a fresh database and a scripted Riot API.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use actors::{CrawlerConfig, CrawlerContext};
use db::{Database, DbConfig, DbError};
use futures_util::future::BoxFuture;
use queue_core::{ApiError, MatchPayload, PlayerKey, RiotApi, Standing};

pub async fn setup_db() -> Result<Database, DbError> {
    db::open(&DbConfig::memory()).await
}

/// A context over a fresh database, plus the database for direct checks.
pub async fn setup_ctx(api: Arc<FakeRiot>, config: CrawlerConfig) -> Result<(CrawlerContext, Database), DbError> {
    let db = setup_db().await?;
    Ok((CrawlerContext::new(api, db.clone(), config), db))
}

pub fn standing(tier: &str, lp: i32) -> Standing {
    Standing {
        tier: tier.to_string(),
        rank: "I".to_string(),
        league_points: lp,
        wins: 1,
        losses: 1,
    }
}

#[derive(Default)]
struct Script {
    accounts: HashMap<String, String>,
    pages: HashMap<String, Vec<Vec<String>>>,
    matches: HashMap<String, serde_json::Value>,
    standings: HashMap<String, Standing>,
    /// Errors returned before any answer, keyed by call key.
    errors: HashMap<String, VecDeque<ApiError>>,
    calls: Vec<String>,
}

/// Scripted `RiotApi`.
///
/// Every call is logged as `<call>:<id>`, listing calls as
/// `list:<player>@<offset>`. Errors queued with `fail` for the same key are
/// returned first, one per call.
#[derive(Default)]
pub struct FakeRiot {
    script: Mutex<Script>,
}

impl FakeRiot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, account: &str, player: &str) -> Self {
        self.edit(|s| {
            s.accounts.insert(account.into(), player.into());
        })
    }

    /// Serve `pages` for consecutive listing offsets of `player`.
    pub fn with_pages(self, player: &str, pages: Vec<Vec<&str>>) -> Self {
        self.edit(|s| {
            s.pages.insert(
                player.into(),
                pages
                    .into_iter()
                    .map(|p| p.into_iter().map(String::from).collect())
                    .collect(),
            );
        })
    }

    pub fn with_match(self, match_id: &str) -> Self {
        self.edit(|s| {
            s.matches.insert(
                match_id.into(),
                serde_json::json!({ "metadata": { "match_id": match_id }, "info": {} }),
            );
        })
    }

    pub fn with_standing(self, player: &str, standing: Standing) -> Self {
        self.set_standing(player, standing);
        self
    }

    pub fn set_standing(&self, player: &str, standing: Standing) {
        self.lock().standings.insert(player.into(), standing);
    }

    /// Queue an error for the next call with `key`, e.g. `match:KR_1`.
    pub fn fail(self, key: &str, error: ApiError) -> Self {
        self.edit(|s| s.errors.entry(key.into()).or_default().push_back(error))
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls().into_iter().filter(|c| c.starts_with(prefix)).collect()
    }

    fn edit(self, f: impl FnOnce(&mut Script)) -> Self {
        f(&mut self.lock());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().expect("fake script lock")
    }

    /// Log the call and pop a scripted error for it.
    fn enter(&self, log: String, key: &str) -> Result<(), ApiError> {
        let mut script = self.lock();
        script.calls.push(log);
        match script.errors.get_mut(key).and_then(|q| q.pop_front()) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl RiotApi for FakeRiot {
    fn resolve_account<'a>(
        &'a self,
        account_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<PlayerKey>, ApiError>> {
        Box::pin(async move {
            let key = format!("resolve:{}", account_id);
            self.enter(key.clone(), &key)?;
            Ok(self.lock().accounts.get(account_id).cloned().map(PlayerKey))
        })
    }

    fn list_match_ids<'a>(
        &'a self,
        player: &'a PlayerKey,
        offset: u32,
        limit: u32,
        _since_epoch_secs: i64,
    ) -> BoxFuture<'a, Result<Vec<String>, ApiError>> {
        Box::pin(async move {
            let key = format!("list:{}", player);
            self.enter(format!("{}@{}", key, offset), &key)?;
            let page = (offset / limit.max(1)) as usize;
            Ok(self
                .lock()
                .pages
                .get(player.as_str())
                .and_then(|pages| pages.get(page))
                .cloned()
                .unwrap_or_default())
        })
    }

    fn fetch_match_detail<'a>(
        &'a self,
        match_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<MatchPayload>, ApiError>> {
        Box::pin(async move {
            let key = format!("match:{}", match_id);
            self.enter(key.clone(), &key)?;
            Ok(self
                .lock()
                .matches
                .get(match_id)
                .cloned()
                .and_then(MatchPayload::from_body))
        })
    }

    fn fetch_standing<'a>(
        &'a self,
        player: &'a PlayerKey,
    ) -> BoxFuture<'a, Result<Option<Standing>, ApiError>> {
        Box::pin(async move {
            let key = format!("standing:{}", player);
            self.enter(key.clone(), &key)?;
            Ok(self.lock().standings.get(player.as_str()).cloned())
        })
    }
}
