use kaguya_core::config::BackendConfig;
use kaguya_core::models::{Anime, RemoteWatched, Source, WatchedUpdate};
use reqwest::{Client, Method, RequestBuilder};
use url::Url;

use super::error::ApiError;
use super::types::{SourceResponse, WatchedRow, ANIME_CARD, ANIME_WITH_EPISODES};
use crate::traits::CatalogService;

/// Client for the hosted catalog database (PostgREST over HTTP) and the
/// episode source endpoint.
pub struct BackendClient {
    base_url: Url,
    source_url: Url,
    anon_key: String,
    access_token: Option<String>,
    http: Client,
}

impl BackendClient {
    pub fn new(base_url: &str, anon_key: &str, source_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: Url::parse(&with_trailing_slash(base_url))?,
            source_url: Url::parse(&with_trailing_slash(source_url))?,
            anon_key: anon_key.to_string(),
            access_token: None,
            http: Client::new(),
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, ApiError> {
        let client = Self::new(&config.url, &config.anon_key, &config.source_url)?;
        Ok(match &config.access_token {
            Some(token) => client.with_access_token(token.clone()),
            None => client,
        })
    }

    /// Act as a signed-in user; watched rows are scoped to this token.
    pub fn with_access_token(mut self, token: String) -> Self {
        self.access_token = Some(token);
        self
    }

    fn bearer(&self) -> String {
        format!(
            "Bearer {}",
            self.access_token.as_deref().unwrap_or(&self.anon_key)
        )
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header("Authorization", self.bearer())
    }

    fn table_url(&self, table: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join("rest/v1/")?.join(table)?)
    }

    pub(crate) fn anime_url(&self, ani_id: i64) -> Result<Url, ApiError> {
        let mut url = self.table_url("anime")?;
        url.query_pairs_mut()
            .append_pair("select", ANIME_WITH_EPISODES)
            .append_pair("ani_id", &format!("eq.{ani_id}"))
            .append_pair("limit", "1");
        Ok(url)
    }

    pub(crate) fn recent_url(&self, limit: u32) -> Result<Url, ApiError> {
        let mut url = self.table_url("anime")?;
        url.query_pairs_mut()
            .append_pair("select", ANIME_CARD)
            .append_pair("order", "updated_at.desc")
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }

    pub(crate) fn watched_url(&self, ani_id: Option<i64>) -> Result<Url, ApiError> {
        let mut url = self.table_url("watched")?;
        if let Some(id) = ani_id {
            url.query_pairs_mut()
                .append_pair("select", "anime_id,episode_id,watched_time")
                .append_pair("anime_id", &format!("eq.{id}"))
                .append_pair("limit", "1");
        }
        Ok(url)
    }

    pub(crate) fn sources_url(&self, episode_id: i64) -> Result<Url, ApiError> {
        Ok(self.source_url.join(&episode_id.to_string())?)
    }

    /// Check the HTTP response for errors and return the body text on failure.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "backend API error");
            Err(ApiError::Api {
                status,
                message: body,
            })
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let resp = self.request(Method::GET, url).send().await?;
        let resp = Self::check_response(resp).await?;
        resp.json().await.map_err(|e| ApiError::Parse(e.to_string()))
    }
}

impl CatalogService for BackendClient {
    type Error = ApiError;

    async fn get_anime(&self, ani_id: i64) -> Result<Anime, ApiError> {
        let rows: Vec<Anime> = self.get_json(self.anime_url(ani_id)?).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("anime {ani_id}")))
    }

    async fn get_sources(&self, episode_id: i64) -> Result<Vec<Source>, ApiError> {
        let resp: SourceResponse = self.get_json(self.sources_url(episode_id)?).await?;
        Ok(resp.sources)
    }

    async fn get_watched(&self, ani_id: i64) -> Result<Option<RemoteWatched>, ApiError> {
        let rows: Vec<RemoteWatched> = self.get_json(self.watched_url(Some(ani_id))?).await?;
        Ok(rows.into_iter().next())
    }

    async fn save_watched(&self, update: &WatchedUpdate) -> Result<(), ApiError> {
        let mut url = self.watched_url(None)?;
        url.query_pairs_mut().append_pair("on_conflict", "user_id,anime_id");

        let row = WatchedRow {
            anime_id: update.anime_id,
            episode_id: update.episode_id,
            watched_time: update.watched_time,
        };
        let resp = self
            .request(Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&row)
            .send()
            .await?;

        Self::check_response(resp).await?;
        Ok(())
    }

    async fn recent_anime(&self, limit: u32) -> Result<Vec<Anime>, ApiError> {
        self.get_json(self.recent_url(limit)?).await
    }
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}
