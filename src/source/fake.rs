//! In-memory catalog used by unit tests.

use super::wire::{ListingResponse, Named, NamedResource, PokemonWire, Sprites, TypeSlot};
use super::{CatalogSource, DetailRef};
use crate::error::CatalogError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Pokémon `n` is named `pokemon-n`; names listed in `names` override that.
#[derive(Clone, Default)]
pub(crate) struct FakeSource {
    count: usize,
    names: Vec<(u32, String)>,
    failing: HashSet<u32>,
    delay: Option<Duration>,
    fail_listing: Arc<AtomicBool>,
    listing_calls: Arc<AtomicUsize>,
    detail_calls: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn with_count(count: usize) -> Self {
        Self {
            count,
            ..Default::default()
        }
    }

    pub fn named(mut self, id: u32, name: &str) -> Self {
        self.names.push((id, name.to_string()));
        self
    }

    pub fn failing_id(mut self, id: u32) -> Self {
        self.failing.insert(id);
        self
    }

    pub fn delay(mut self, d: Duration) -> Self {
        self.delay = Some(d);
        self
    }

    /// Make every subsequent listing call fail (shared across clones).
    pub fn set_listing_failure(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    fn name_of(&self, id: u32) -> String {
        self.names
            .iter()
            .find(|(i, _)| *i == id)
            .map(|(_, n)| n.clone())
            .unwrap_or_else(|| format!("pokemon-{id}"))
    }

    fn resolve(&self, target: &DetailRef) -> Option<u32> {
        let key = match target {
            DetailRef::Url(u) => u.rsplit('/').next().unwrap_or_default().to_string(),
            DetailRef::Key(k) => k.clone(),
        };
        if let Ok(id) = key.parse::<u32>() {
            return (id >= 1 && id as usize <= self.count).then_some(id);
        }
        (1..=self.count as u32).find(|id| self.name_of(*id) == key)
    }

    async fn pause(&self) {
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
    }
}

#[async_trait]
impl CatalogSource for FakeSource {
    async fn listing(&self, limit: usize, offset: usize) -> Result<ListingResponse, CatalogError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(CatalogError::fetch_failed("HTTP 503"));
        }
        let end = offset.saturating_add(limit).min(self.count);
        let results = (offset..end)
            .map(|i| {
                let id = i as u32 + 1;
                NamedResource {
                    name: self.name_of(id),
                    url: format!("fake://pokemon/{id}"),
                }
            })
            .collect();
        Ok(ListingResponse {
            count: self.count,
            results,
        })
    }

    async fn pokemon(&self, target: &DetailRef) -> Result<PokemonWire, CatalogError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let Some(id) = self.resolve(target) else {
            return Err(CatalogError::not_found(format!("{target:?}")));
        };
        if self.failing.contains(&id) {
            return Err(CatalogError::fetch_failed(format!("HTTP 500 for {id}")));
        }
        Ok(PokemonWire {
            id,
            name: self.name_of(id),
            height: 7,
            weight: 69,
            sprites: Sprites::default(),
            types: vec![TypeSlot {
                kind: Named {
                    name: if id % 2 == 0 { "water" } else { "grass" }.into(),
                },
            }],
            stats: Vec::new(),
            abilities: Vec::new(),
        })
    }
}
