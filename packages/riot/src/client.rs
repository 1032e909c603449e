//! HTTP client for the Riot TFT API.

use futures_util::future::BoxFuture;
use queue_core::{ApiError, MatchPayload, PlayerKey, RiotApi, Standing};
use reqwest::Url;
use reqwest::header::RETRY_AFTER;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::RiotConfig;

const TOKEN_HEADER: &str = "X-Riot-Token";
const RANKED_QUEUE: &str = "RANKED_TFT";

/// What a response status means for the caller.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Body,
    NotFound,
}

/// Map a response status to an outcome or an error.
fn classify(status: u16, retry_after: Option<&str>, url: &str) -> Result<Outcome, ApiError> {
    match status {
        200..=299 => Ok(Outcome::Body),
        404 => Ok(Outcome::NotFound),
        429 => Err(ApiError::RateLimited {
            retry_after_secs: retry_after.and_then(|v| v.trim().parse().ok()),
        }),
        _ => Err(ApiError::Status {
            status,
            url: url.to_string(),
        }),
    }
}

/// Append `segments` to `base`, percent-encoding each one.
///
/// A `/` inside a segment is encoded too, so ids can never change the route.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url =
        Url::parse(base).map_err(|e| ApiError::Transport(format!("bad base URL {}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|()| ApiError::Transport(format!("base URL {} cannot take a path", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct SummonerDto {
    puuid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeagueEntryDto {
    queue_type: String,
    tier: Option<String>,
    rank: Option<String>,
    #[serde(default)]
    league_points: i32,
    #[serde(default)]
    wins: u32,
    #[serde(default)]
    losses: u32,
}

impl LeagueEntryDto {
    fn into_standing(self) -> Option<Standing> {
        Some(Standing {
            tier: self.tier?,
            rank: self.rank.unwrap_or_default(),
            league_points: self.league_points,
            wins: self.wins,
            losses: self.losses,
        })
    }
}

/// Riot API client.
///
/// Rate limits are not enforced client-side; a 429 is surfaced as
/// `ApiError::RateLimited` with the `Retry-After` delay when one is sent.
#[derive(Clone)]
pub struct RiotClient {
    http: reqwest::Client,
    config: RiotConfig,
}

impl RiotClient {
    pub fn new(config: RiotConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    fn platform_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        endpoint(&self.config.platform_base_url, segments)
    }

    fn regional_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        endpoint(&self.config.regional_base_url, segments)
    }

    /// GET `url` and decode the body; `None` on 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<Option<T>, ApiError> {
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(url.clone())
            .header(TOKEN_HEADER, &self.config.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match classify(response.status().as_u16(), retry_after.as_deref(), url.as_str())? {
            Outcome::NotFound => Ok(None),
            Outcome::Body => response
                .json::<T>()
                .await
                .map(Some)
                .map_err(|e| ApiError::Decode(format!("{}: {}", url, e))),
        }
    }
}

impl RiotApi for RiotClient {
    fn resolve_account<'a>(
        &'a self,
        account_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<PlayerKey>, ApiError>> {
        Box::pin(async move {
            let url = self.platform_url(&["tft", "summoner", "v1", "summoners", account_id])?;
            let summoner: Option<SummonerDto> = self.get_json(url, &[]).await?;
            Ok(summoner.map(|s| PlayerKey(s.puuid)))
        })
    }

    fn list_match_ids<'a>(
        &'a self,
        player: &'a PlayerKey,
        offset: u32,
        limit: u32,
        since_epoch_secs: i64,
    ) -> BoxFuture<'a, Result<Vec<String>, ApiError>> {
        Box::pin(async move {
            let url = self.regional_url(&["tft", "match", "v1", "matches", "by-puuid", player.as_str(), "ids"])?;
            let query = [
                ("start", offset.to_string()),
                ("count", limit.to_string()),
                ("startTime", since_epoch_secs.to_string()),
            ];
            let ids: Option<Vec<String>> = self.get_json(url, &query).await?;
            Ok(ids.unwrap_or_default())
        })
    }

    fn fetch_match_detail<'a>(
        &'a self,
        match_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<MatchPayload>, ApiError>> {
        Box::pin(async move {
            let url = self.regional_url(&["tft", "match", "v1", "matches", match_id])?;
            let body: Option<serde_json::Value> = self.get_json(url, &[]).await?;
            match body {
                None => Ok(None),
                Some(body) => MatchPayload::from_body(body)
                    .map(Some)
                    .ok_or_else(|| ApiError::Decode(format!("match {} has no metadata.match_id", match_id))),
            }
        })
    }

    fn fetch_standing<'a>(
        &'a self,
        player: &'a PlayerKey,
    ) -> BoxFuture<'a, Result<Option<Standing>, ApiError>> {
        Box::pin(async move {
            let url = self.platform_url(&["tft", "league", "v1", "by-puuid", player.as_str()])?;
            let entries: Option<Vec<LeagueEntryDto>> = self.get_json(url, &[]).await?;
            Ok(entries
                .unwrap_or_default()
                .into_iter()
                .find(|e| e.queue_type == RANKED_QUEUE)
                .and_then(LeagueEntryDto::into_standing))
        })
    }
}
