use crate::model::{BaseStats, CapturedEntity};
use std::collections::BTreeSet;

/// Size of the original regional dex; completion is measured against it.
pub const KANTO_DEX_SIZE: usize = 151;

/// A base stat at or above this counts as a strong stat.
pub const STRONG_STAT: u32 = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSummary {
    pub captured: usize,
    pub completion_pct: u32,
    pub unique_types: BTreeSet<String>,
}

/// Compute collection metrics (count, completion percentage, distinct types)
pub fn collection_summary(captured: &[CapturedEntity]) -> CollectionSummary {
    let completion_pct = if captured.is_empty() {
        0
    } else {
        ((captured.len() as f64 / KANTO_DEX_SIZE as f64) * 100.0).round() as u32
    };
    CollectionSummary {
        captured: captured.len(),
        completion_pct,
        unique_types: captured
            .iter()
            .flat_map(|p| p.types.iter().cloned())
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatSummary {
    pub total: u32,
    pub strong: usize,
    pub max: u32,
}

/// Compute base stat metrics (total, number of strong stats, highest stat)
pub fn stat_summary(stats: &BaseStats) -> StatSummary {
    let values = stats.labelled().map(|(_, v)| v);
    StatSummary {
        total: values.iter().sum(),
        strong: values.iter().filter(|v| **v >= STRONG_STAT).count(),
        max: values.iter().copied().max().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::image_url;

    #[test]
    fn collection_counts_types_once() {
        let mk = |id: u32, types: &[&str]| CapturedEntity {
            id,
            name: format!("m{id}"),
            image_url: image_url(id),
            types: types.iter().map(|t| t.to_string()).collect(),
        };
        let s = collection_summary(&[
            mk(1, &["grass", "poison"]),
            mk(4, &["fire"]),
            mk(6, &["fire", "flying"]),
        ]);
        assert_eq!(s.captured, 3);
        assert_eq!(s.completion_pct, 2);
        assert_eq!(s.unique_types.len(), 4);
    }

    #[test]
    fn empty_collection_is_zero_percent() {
        assert_eq!(collection_summary(&[]).completion_pct, 0);
    }

    #[test]
    fn stat_summary_for_pikachu() {
        let s = stat_summary(&BaseStats {
            hp: 35,
            attack: 55,
            defense: 40,
            special_attack: 50,
            special_defense: 50,
            speed: 90,
        });
        assert_eq!(s.total, 320);
        assert_eq!(s.strong, 1);
        assert_eq!(s.max, 90);
    }
}
