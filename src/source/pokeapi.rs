use super::wire::{ListingResponse, PokemonWire};
use super::{CatalogSource, DetailRef};
use crate::error::CatalogError;
use crate::model::CatalogConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// HTTP client for the PokeAPI v2 REST service.
#[derive(Clone)]
pub struct PokeApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl PokeApiClient {
    pub fn new(cfg: &CatalogConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.request_timeout)
            .build()
            .context("build http client")?;
        let base_url = cfg.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).with_context(|| format!("invalid base url {base_url}"))?;
        Ok(Self { http, base_url })
    }

    pub fn listing_url(&self, limit: usize, offset: usize) -> Result<Url, CatalogError> {
        let mut url = self.endpoint("pokemon")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        Ok(url)
    }

    pub fn pokemon_url(&self, target: &DetailRef) -> Result<Url, CatalogError> {
        match target {
            DetailRef::Url(u) => Url::parse(u)
                .map_err(|e| CatalogError::fetch_failed(format!("bad detail url {u}: {e}"))),
            DetailRef::Key(k) => self.endpoint(&format!("pokemon/{k}")),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|e| CatalogError::fetch_failed(format!("bad endpoint {path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T, CatalogError> {
        debug!(%url, "GET");
        let resp = self.http.get(url.clone()).send().await.map_err(|e| {
            warn!(%url, error = %e, "request failed");
            CatalogError::from(e)
        })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::not_found(what));
        }
        if !status.is_success() {
            warn!(%url, %status, "non-success response");
            return Err(CatalogError::fetch_failed(format!(
                "HTTP {} while loading {what}",
                status.as_u16()
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| CatalogError::fetch_failed(format!("undecodable {what}: {e}")))
    }
}

#[async_trait]
impl CatalogSource for PokeApiClient {
    async fn listing(&self, limit: usize, offset: usize) -> Result<ListingResponse, CatalogError> {
        let url = self.listing_url(limit, offset)?;
        self.get_json(url, "Pokémon list").await
    }

    async fn pokemon(&self, target: &DetailRef) -> Result<PokemonWire, CatalogError> {
        let url = self.pokemon_url(target)?;
        let what = match target {
            DetailRef::Key(k) => format!("Pokémon {k}"),
            DetailRef::Url(_) => "Pokémon details".to_string(),
        };
        self.get_json(url, &what).await
    }
}
