mod pokeapi;
pub mod wire;

#[cfg(test)]
pub(crate) mod fake;

pub use pokeapi::PokeApiClient;

use crate::error::CatalogError;
use crate::model::{BasicEntry, CatalogEntry, PageWindow, PokemonDetail};
use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::debug;
use wire::{ListingResponse, PokemonWire};

/// Where a detail record lives: either the `url` handed out by a listing, or
/// an id/name typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailRef {
    Url(String),
    Key(String),
}

/// Read-only access to the upstream catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn listing(&self, limit: usize, offset: usize) -> Result<ListingResponse, CatalogError>;

    async fn pokemon(&self, target: &DetailRef) -> Result<PokemonWire, CatalogError>;
}

/// One browse page plus the upstream total used for page counting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage {
    pub entries: Vec<CatalogEntry>,
    pub total_count: usize,
}

/// Fetch a browse page: one listing call, then every detail concurrently.
/// Any failing detail fails the page; no partial pages are returned.
pub async fn fetch_page(
    source: &dyn CatalogSource,
    window: PageWindow,
) -> Result<CatalogPage, CatalogError> {
    let listing = source.listing(window.limit, window.offset).await?;
    debug!(
        offset = window.offset,
        limit = window.limit,
        results = listing.results.len(),
        "listing fetched"
    );

    let details = try_join_all(
        listing
            .results
            .iter()
            .map(|r| async move { source.pokemon(&DetailRef::Url(r.url.clone())).await }),
    )
    .await?;

    Ok(CatalogPage {
        entries: details.iter().map(wire::entry_from_wire).collect(),
        total_count: listing.count,
    })
}

/// Fetch the full name index in a single bulk call.
pub async fn fetch_name_index(
    source: &dyn CatalogSource,
    limit: usize,
) -> Result<Vec<BasicEntry>, CatalogError> {
    let listing = source.listing(limit, 0).await?;
    debug!(entries = listing.results.len(), "name index fetched");
    Ok(wire::basic_index(&listing))
}

/// Fetch and format one detail record by id or name.
pub async fn fetch_detail(
    source: &dyn CatalogSource,
    id_or_name: &str,
) -> Result<PokemonDetail, CatalogError> {
    let key = id_or_name.trim().to_lowercase();
    let wire = source.pokemon(&DetailRef::Key(key)).await?;
    Ok(wire::detail_from_wire(&wire))
}
