use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Artwork is addressed by id alone, so the URL never needs a fetch.
const ARTWORK_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/dream-world";

/// Deterministic artwork URL for a Pokémon id.
pub fn image_url(id: u32) -> String {
    format!("{ARTWORK_BASE}/{id}.svg")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    pub page_size: usize,
    #[serde(with = "humantime_serde")]
    pub debounce: Duration,
    #[serde(with = "humantime_serde")]
    pub stale_time: Duration,
    #[serde(with = "humantime_serde")]
    pub gc_time: Duration,
    pub index_limit: usize,
    #[serde(with = "humantime_serde")]
    pub login_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub user_agent: String,
    pub state_file: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pokeapi.co/api/v2".into(),
            page_size: 20,
            debounce: Duration::from_millis(300),
            stale_time: Duration::from_secs(5 * 60),
            gc_time: Duration::from_secs(10 * 60),
            index_limit: 1302,
            login_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(15),
            user_agent: format!("pokedex-cli/{}", env!("CARGO_PKG_VERSION")),
            state_file: None,
        }
    }
}

/// A display-ready card. `types` is empty when it has not been resolved
/// (search results).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: u32,
    pub name: String,
    pub image_url: String,
    pub types: Vec<String>,
}

impl CatalogEntry {
    pub fn new(id: u32, name: impl Into<String>, types: Vec<String>) -> Self {
        Self {
            id,
            name: name.into(),
            image_url: image_url(id),
            types,
        }
    }
}

/// Name-index row. Ids are positional (index + 1) in the bulk listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicEntry {
    pub id: u32,
    pub name: String,
}

impl BasicEntry {
    /// Project into a card without type information.
    pub fn to_entry(&self) -> CatalogEntry {
        CatalogEntry::new(self.id, self.name.clone(), Vec::new())
    }
}

/// One row of the persisted capture list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedEntity {
    pub id: u32,
    pub name: String,
    #[serde(rename = "image", alias = "imageUrl")]
    pub image_url: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl From<&CatalogEntry> for CapturedEntity {
    fn from(e: &CatalogEntry) -> Self {
        Self {
            id: e.id,
            name: e.name.clone(),
            image_url: e.image_url.clone(),
            types: e.types.clone(),
        }
    }
}

impl From<&PokemonDetail> for CapturedEntity {
    fn from(d: &PokemonDetail) -> Self {
        Self {
            id: d.id,
            name: d.name.clone(),
            image_url: d.image_url.clone(),
            types: d.types.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

impl BaseStats {
    /// Stats in display order, with their short labels.
    pub fn labelled(&self) -> [(&'static str, u32); 6] {
        [
            ("HP", self.hp),
            ("Attack", self.attack),
            ("Defense", self.defense),
            ("Sp. Atk", self.special_attack),
            ("Sp. Def", self.special_defense),
            ("Speed", self.speed),
        ]
    }
}

/// Formatted detail view. Height is centimetres, weight kilograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonDetail {
    pub id: u32,
    pub name: String,
    pub image_url: String,
    pub types: Vec<String>,
    pub height_cm: u32,
    pub weight_kg: f64,
    pub abilities: Vec<String>,
    pub stats: BaseStats,
    #[serde(default)]
    pub official_artwork: Option<String>,
}

impl PokemonDetail {
    pub fn height_display(&self) -> String {
        if self.height_cm >= 100 {
            format!("{:.1} m", self.height_cm as f64 / 100.0)
        } else {
            format!("{} cm", self.height_cm)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageWindow {
    pub limit: usize,
    pub offset: usize,
}

impl PageWindow {
    pub fn for_page(page: usize, limit: usize) -> Self {
        Self {
            limit,
            offset: page.saturating_mul(limit),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Browse,
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageStatus {
    Loading,
    Ready,
    Empty,
    Failed(String),
}

/// Everything a presentation layer needs to draw the catalog list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView {
    pub mode: Mode,
    /// Committed term the items were derived from.
    pub term: String,
    /// What the user has typed so far.
    pub raw_term: String,
    /// A typed term is waiting out the debounce.
    pub search_pending: bool,
    /// Some list fetch is outstanding, possibly for another page.
    pub fetching: bool,
    pub page: usize,
    pub total_pages: Option<usize>,
    pub items: Vec<CatalogEntry>,
    pub status: PageStatus,
}

/// Events emitted by the catalog controller and consumed by the TUI.
#[derive(Debug, Clone)]
pub enum CatalogEvent {
    View(PageView),
    Detail {
        id: u32,
        // Box to keep the enum small next to the View variant.
        result: Box<Result<PokemonDetail, String>>,
    },
    Info(InfoEvent),
}

/// Structured info events emitted by the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InfoEvent {
    TermCommitted { term: String },
    FetchFailed { what: String, message: String },
}

impl InfoEvent {
    /// Render a human-readable message for UI/CLI layers.
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::TermCommitted { term } if term.trim().is_empty() => {
                "Browsing all Pokémon".to_string()
            }
            InfoEvent::TermCommitted { term } => format!("Searching for \"{}\"", term.trim()),
            InfoEvent::FetchFailed { what, message } => {
                format!("Could not load {what}: {message}")
            }
        }
    }
}
