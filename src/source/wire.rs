//! Serde shapes for the subset of PokeAPI responses we read, and their
//! conversion into catalog types. Everything not listed here is ignored.

use crate::model::{image_url, BaseStats, BasicEntry, CatalogEntry, PokemonDetail};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ListingResponse {
    pub count: usize,
    pub results: Vec<NamedResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PokemonWire {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub sprites: Sprites,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub stats: Vec<StatSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<Artwork>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Artwork {
    #[serde(default)]
    pub front_default: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: Named,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatSlot {
    pub base_stat: u32,
    pub stat: Named,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbilitySlot {
    pub ability: Named,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Named {
    pub name: String,
}

impl PokemonWire {
    fn type_names(&self) -> Vec<String> {
        self.types.iter().map(|t| t.kind.name.clone()).collect()
    }

    fn stat(&self, name: &str) -> u32 {
        self.stats
            .iter()
            .find(|s| s.stat.name == name)
            .map(|s| s.base_stat)
            .unwrap_or(0)
    }
}

pub fn entry_from_wire(p: &PokemonWire) -> CatalogEntry {
    CatalogEntry::new(p.id, p.name.clone(), p.type_names())
}

pub fn detail_from_wire(p: &PokemonWire) -> PokemonDetail {
    PokemonDetail {
        id: p.id,
        name: p.name.clone(),
        image_url: image_url(p.id),
        types: p.type_names(),
        // Upstream reports decimetres and hectograms.
        height_cm: p.height * 10,
        weight_kg: p.weight as f64 / 10.0,
        abilities: p.abilities.iter().map(|a| a.ability.name.clone()).collect(),
        stats: BaseStats {
            hp: p.stat("hp"),
            attack: p.stat("attack"),
            defense: p.stat("defense"),
            special_attack: p.stat("special-attack"),
            special_defense: p.stat("special-defense"),
            speed: p.stat("speed"),
        },
        official_artwork: p
            .sprites
            .other
            .as_ref()
            .and_then(|o| o.official_artwork.as_ref())
            .and_then(|a| a.front_default.clone())
            .or_else(|| p.sprites.front_default.clone()),
    }
}

/// Sequential ids: the bulk listing is ordered by national dex number.
pub fn basic_index(listing: &ListingResponse) -> Vec<BasicEntry> {
    listing
        .results
        .iter()
        .enumerate()
        .map(|(i, r)| BasicEntry {
            id: (i + 1) as u32,
            name: r.name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIKACHU: &str = r#"{
        "id": 25,
        "name": "pikachu",
        "height": 4,
        "weight": 60,
        "base_experience": 112,
        "sprites": {
            "front_default": "https://example.test/25.png",
            "front_shiny": null,
            "other": {"official-artwork": {"front_default": "https://example.test/art/25.png"}}
        },
        "types": [{"slot": 1, "type": {"name": "electric", "url": "x"}}],
        "stats": [
            {"base_stat": 35, "effort": 0, "stat": {"name": "hp", "url": "x"}},
            {"base_stat": 55, "effort": 0, "stat": {"name": "attack", "url": "x"}},
            {"base_stat": 40, "effort": 0, "stat": {"name": "defense", "url": "x"}},
            {"base_stat": 50, "effort": 0, "stat": {"name": "special-attack", "url": "x"}},
            {"base_stat": 50, "effort": 0, "stat": {"name": "special-defense", "url": "x"}},
            {"base_stat": 90, "effort": 2, "stat": {"name": "speed", "url": "x"}}
        ],
        "abilities": [
            {"ability": {"name": "static", "url": "x"}, "is_hidden": false, "slot": 1},
            {"ability": {"name": "lightning-rod", "url": "x"}, "is_hidden": true, "slot": 3}
        ]
    }"#;

    #[test]
    fn detail_converts_units_and_stats() {
        let wire: PokemonWire = serde_json::from_str(PIKACHU).unwrap();
        let d = detail_from_wire(&wire);
        assert_eq!(d.height_cm, 40);
        assert!((d.weight_kg - 6.0).abs() < f64::EPSILON);
        assert_eq!(d.types, vec!["electric".to_string()]);
        assert_eq!(d.abilities, vec!["static", "lightning-rod"]);
        assert_eq!(d.stats.speed, 90);
        assert_eq!(d.stats.special_attack, 50);
        assert_eq!(
            d.official_artwork.as_deref(),
            Some("https://example.test/art/25.png")
        );
    }

    #[test]
    fn missing_stats_default_to_zero() {
        let wire: PokemonWire =
            serde_json::from_str(r#"{"id": 7, "name": "squirtle", "types": []}"#).unwrap();
        let d = detail_from_wire(&wire);
        assert_eq!(d.stats, BaseStats::default());
        assert!(entry_from_wire(&wire).types.is_empty());
    }

    #[test]
    fn basic_index_assigns_positional_ids() {
        let listing: ListingResponse = serde_json::from_str(
            r#"{"count": 3, "next": null, "previous": null, "results": [
                {"name": "bulbasaur", "url": "u1"},
                {"name": "ivysaur", "url": "u2"},
                {"name": "venusaur", "url": "u3"}
            ]}"#,
        )
        .unwrap();
        let idx = basic_index(&listing);
        assert_eq!(idx.len(), 3);
        assert_eq!(
            idx[2],
            BasicEntry {
                id: 3,
                name: "venusaur".into()
            }
        );
    }
}
