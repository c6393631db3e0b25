//! The client: public request surface, authenticated transport wrapper,
//! and the batch search driving loop.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::pin_mut;
use futures::stream::{Stream, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use tracing::debug;

use crate::auth::{Credentials, TokenManager};
use crate::batch::{self, BatchPlan, QueryEntry, DEFAULT_SEARCH_QUERY_LIMIT};
use crate::breakdown::TierBreakdown;
use crate::enums::{Platform, PlaylistKey, Stat};
use crate::error::{Result, RlError};
use crate::http::{ApiResponse, Transport};
use crate::identity::IdentityResolver;
use crate::leaderboard::{SkillLeaderboard, StatLeaderboard};
use crate::player::{Player, PlayerRecord};
use crate::player_titles::{PlayerTitle, TitleRecord};
use crate::population::Population;

/// Production statistics API base.
pub const RLAPI_BASE: &str = "https://api.rocketleague.com/api/v1";
/// Production OAuth2 token endpoint.
pub const TOKEN_URL: &str = "https://api.rocketleague.com/auth/v2/token";
/// Steam community base, for the legacy profile pages.
pub const STEAM_BASE: &str = "https://steamcommunity.com";

const USER_AGENT: &str = concat!("rl-stats/", env!("CARGO_PKG_VERSION"));

/// Builds a [`Client`], optionally overriding the tier breakdown table and
/// the upstream base URLs (the latter mainly for tests).
pub struct ClientBuilder {
    client_id: String,
    client_secret: String,
    tier_breakdown: Option<TierBreakdown>,
    api_base: String,
    token_url: String,
    steam_base: String,
}

impl ClientBuilder {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            tier_breakdown: None,
            api_base: RLAPI_BASE.to_owned(),
            token_url: TOKEN_URL.to_owned(),
            steam_base: STEAM_BASE.to_owned(),
        }
    }

    /// Breakdown table used for tier estimation; without one, unranked
    /// playlists keep their raw (0, 0) position and no distances.
    pub fn tier_breakdown(mut self, table: TierBreakdown) -> Self {
        self.tier_breakdown = Some(table);
        self
    }

    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn steam_base(mut self, url: impl Into<String>) -> Self {
        self.steam_base = url.into();
        self
    }

    pub fn build(self) -> Result<Client> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let credentials = Credentials {
            client_id: self.client_id,
            client_secret: self.client_secret,
        };
        Ok(Client {
            transport: Transport::new(http.clone()),
            tokens: TokenManager::new(http.clone(), self.token_url, credentials),
            identity: IdentityResolver::new(http, self.steam_base),
            api_base: self.api_base,
            search_limit: AtomicUsize::new(DEFAULT_SEARCH_QUERY_LIMIT),
            tier_breakdown: self.tier_breakdown.unwrap_or_default(),
        })
    }
}

/// Rocket League API client.
///
/// One client wraps one connection pool; calls borrow `&self` and may be
/// issued concurrently. Token refresh is not single-flighted: two calls
/// that both see an expired token may both perform a grant (harmless on
/// the server side), and the last written token wins.
#[derive(Debug)]
pub struct Client {
    transport: Transport,
    tokens: TokenManager,
    identity: IdentityResolver,
    api_base: String,
    /// Per-instance search query limit, corrected from response headers.
    search_limit: AtomicUsize,
    tier_breakdown: TierBreakdown,
}

struct SearchState<'a> {
    client: &'a Client,
    platform: Platform,
    plan: BatchPlan,
    pending: VecDeque<Player>,
    replanned: bool,
}

impl Client {
    /// Client with the production endpoints and no tier breakdown.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Self::builder(client_id, client_secret).build()
    }

    pub fn builder(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder::new(client_id, client_secret)
    }

    /// Replace the OAuth client credentials; the cached token is dropped.
    pub fn update_credentials(
        &self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) {
        self.tokens
            .update_credentials(client_id.into(), client_secret.into());
    }

    /// Consumes the client, releasing its connection pool. Dropping the
    /// client without calling this does the same.
    pub fn close(self) {}

    /// Authenticated GET with the refresh-once rule: a 401 forces a token
    /// refresh and retries the same logical call exactly one time.
    async fn rlapi_get(&self, endpoint: &str, params: &[(String, String)]) -> Result<ApiResponse> {
        match self.authed_request(endpoint, params, false).await {
            Err(RlError::Unauthorized { message }) => {
                debug!(error = %message, "access token rejected, refreshing and retrying");
                self.authed_request(endpoint, params, true).await
            }
            other => other,
        }
    }

    async fn authed_request(
        &self,
        endpoint: &str,
        params: &[(String, String)],
        force_refresh_token: bool,
    ) -> Result<ApiResponse> {
        let token = self.tokens.get_access_token(force_refresh_token).await?;
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))?,
        );
        let url = format!("{}{}", self.api_base, endpoint);
        self.transport.request(&url, headers, params).await
    }

    /// Look up one player by platform id.
    pub async fn get_player_by_id(
        &self,
        platform: Platform,
        player_id: impl Into<String>,
    ) -> Result<Player> {
        let player_id = player_id.into();
        let players = self.get_players(platform, [player_id.clone()], Vec::<String>::new())?;
        pin_mut!(players);
        match players.try_next().await? {
            Some(player) => Ok(player),
            None => Err(RlError::PlayerNotFound(format!(
                "Player with ID {player_id:?} could not be found on platform {platform}"
            ))),
        }
    }

    /// Look up one player by display name.
    pub async fn get_player_by_name(
        &self,
        platform: Platform,
        name: impl Into<String>,
    ) -> Result<Player> {
        let name = name.into();
        let players = self.get_players(platform, Vec::<String>::new(), [name.clone()])?;
        pin_mut!(players);
        match players.try_next().await? {
            Some(player) => Ok(player),
            None => Err(RlError::PlayerNotFound(format!(
                "Player with name {name:?} could not be found on platform {platform}"
            ))),
        }
    }

    /// Stream players for many IDs and names on one platform.
    ///
    /// Lookups are packed into as few requests as the server's query limit
    /// allows. Players arrive in response order, which need not match the
    /// input order, and entries the server cannot find are silently
    /// omitted; callers must not assume input↔output correspondence. Fails
    /// up front with [`RlError::EmptyQuery`] when both inputs are empty.
    pub fn get_players(
        &self,
        platform: Platform,
        ids: impl IntoIterator<Item = impl Into<String>>,
        names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<impl Stream<Item = Result<Player>> + '_> {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let plan = BatchPlan::new(ids, names, self.search_limit.load(Ordering::Relaxed))?;
        let state = SearchState {
            client: self,
            platform,
            plan,
            pending: VecDeque::new(),
            replanned: false,
        };

        Ok(futures::stream::try_unfold(state, |mut state| async move {
            loop {
                if let Some(player) = state.pending.pop_front() {
                    return Ok(Some((player, state)));
                }
                let Some(chunk) = state.plan.next_chunk() else {
                    return Ok(None);
                };
                match state.client.search_chunk(state.platform, &chunk).await {
                    Ok(players) => state.pending.extend(players),
                    Err(RlError::Http {
                        status,
                        headers,
                        message,
                    }) if status == StatusCode::BAD_REQUEST && !state.replanned => {
                        // Re-plan only when the headers confirm the request
                        // overflowed the server's limit, and only once per
                        // top-level call.
                        match batch::violated_limit(&headers) {
                            Some(limit) => {
                                debug!(limit, "query limit exceeded, re-planning remaining");
                                state.client.search_limit.store(limit, Ordering::Relaxed);
                                state.replanned = true;
                                state.plan.requeue(chunk, limit);
                            }
                            None => {
                                return Err(RlError::Http {
                                    status,
                                    headers,
                                    message,
                                })
                            }
                        }
                    }
                    Err(err) => return Err(err),
                }
            }
        }))
    }

    async fn search_chunk(&self, platform: Platform, chunk: &[QueryEntry]) -> Result<Vec<Player>> {
        let params = batch::chunk_params(platform, chunk);
        let resp = self.rlapi_get("/player/search", &params).await?;
        if let Some(limit) = batch::advertised_limit(&resp.headers) {
            // the server may allow more per request than the default assumes
            self.search_limit.fetch_max(limit, Ordering::Relaxed);
        }
        let records: Vec<PlayerRecord> = serde_json::from_value(resp.body)?;
        Ok(records
            .into_iter()
            .map(|record| Player::from_record(platform, record, &self.tier_breakdown))
            .collect())
    }

    /// Search for a raw identifier on every platform.
    ///
    /// A platform where the identifier matches no pattern is skipped;
    /// [`RlError::PlayerNotFound`] is returned only when no platform
    /// yielded a profile.
    pub async fn find_player(&self, identifier: &str) -> Result<Vec<Player>> {
        let mut players: Vec<Player> = Vec::new();
        for platform in Platform::ALL {
            let lookup = match self.identity.classify(platform, identifier).await {
                Ok(lookup) => lookup,
                Err(RlError::IllegalUsername { platform, username }) => {
                    debug!(%platform, %username, "identifier matches no pattern, skipping");
                    continue;
                }
                Err(err) => return Err(err),
            };
            if lookup.is_empty() {
                continue;
            }
            let found = self.get_players(platform, lookup.ids, lookup.names)?;
            pin_mut!(found);
            while let Some(player) = found.try_next().await? {
                if !players.contains(&player) {
                    players.push(player);
                }
            }
        }
        if players.is_empty() {
            return Err(RlError::PlayerNotFound(
                "Player with the provided identifier could not be found on any platform."
                    .to_owned(),
            ));
        }
        Ok(players)
    }

    /// Titles the player has unlocked, as raw title ids.
    pub async fn get_player_titles(
        &self,
        platform: Platform,
        player_id: &str,
    ) -> Result<Vec<PlayerTitle>> {
        let endpoint = format!("/player/titles/{}/{}", platform.as_str(), player_id);
        let resp = self.rlapi_get(&endpoint, &[]).await?;
        let records: Vec<TitleRecord> = serde_json::from_value(resp.body)?;
        Ok(records.into_iter().map(PlayerTitle::from).collect())
    }

    /// Current player population across platforms and playlists.
    pub async fn get_population(&self) -> Result<Population> {
        let resp = self.rlapi_get("/population", &[]).await?;
        Population::from_raw(&resp.body)
    }

    /// Top 100 players of a playlist on one platform.
    pub async fn get_skill_leaderboard(
        &self,
        platform: Platform,
        playlist_key: PlaylistKey,
    ) -> Result<SkillLeaderboard> {
        let endpoint = format!(
            "/leaderboard/skills/{}/{}",
            platform.as_str(),
            playlist_key.id()
        );
        let resp = self.rlapi_get(&endpoint, &[]).await?;
        SkillLeaderboard::from_raw(platform, playlist_key, resp.body)
    }

    /// Top 100 players for a lifetime stat on one platform.
    pub async fn get_stat_leaderboard(
        &self,
        platform: Platform,
        stat: Stat,
    ) -> Result<StatLeaderboard> {
        let endpoint = format!("/leaderboard/stat/{}/{}", platform.as_str(), stat.as_str());
        let resp = self.rlapi_get(&endpoint, &[]).await?;
        StatLeaderboard::from_raw(platform, stat, resp.body)
    }
}
