//! Pure view derivation: filtering, page counting and slicing.

use crate::model::{BasicEntry, CatalogEntry};

/// ceil(count / limit); zero when `limit` is zero.
pub fn total_pages(count: usize, limit: usize) -> usize {
    if limit == 0 {
        return 0;
    }
    count.div_ceil(limit)
}

/// Case-insensitive substring match on the trimmed term.
pub fn filter_by_name<'a>(index: &'a [BasicEntry], term: &str) -> Vec<&'a BasicEntry> {
    let needle = term.trim().to_lowercase();
    index
        .iter()
        .filter(|e| e.name.to_lowercase().contains(&needle))
        .collect()
}

/// Items of `page` under a `limit`-sized window. Past the end is empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, limit: usize) -> Vec<T> {
    let start = page.saturating_mul(limit);
    if start >= items.len() {
        return Vec::new();
    }
    let end = start.saturating_add(limit).min(items.len());
    items[start..end].to_vec()
}

/// Search-mode page: filtered cards (no types) plus the filtered page count.
pub fn search_page(
    index: &[BasicEntry],
    term: &str,
    page: usize,
    limit: usize,
) -> (Vec<CatalogEntry>, usize) {
    let matches = filter_by_name(index, term);
    let pages = total_pages(matches.len(), limit);
    let items = paginate(&matches, page, limit)
        .into_iter()
        .map(BasicEntry::to_entry)
        .collect();
    (items, pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(names: &[&str]) -> Vec<BasicEntry> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| BasicEntry {
                id: i as u32 + 1,
                name: n.to_string(),
            })
            .collect()
    }

    #[test]
    fn forty_five_results_make_three_pages() {
        let items: Vec<u32> = (1..=45).collect();
        assert_eq!(total_pages(items.len(), 20), 3);
        let last = paginate(&items, 2, 20);
        assert_eq!(last.len(), 5);
        assert_eq!(last[0], 41);
        assert!(paginate(&items, 3, 20).is_empty());
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        assert_eq!(total_pages(40, 20), 2);
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let idx = index(&["pikachu", "raichu", "Pichu", "bulbasaur"]);
        let names: Vec<_> = filter_by_name(&idx, "CHU").iter().map(|e| e.id).collect();
        assert_eq!(names, vec![1, 2, 3]);
        assert_eq!(filter_by_name(&idx, " pi ").len(), 2);
    }

    #[test]
    fn search_results_have_no_types() {
        let idx = index(&["pikachu", "raichu"]);
        let (items, pages) = search_page(&idx, "chu", 0, 20);
        assert_eq!(pages, 1);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|e| e.types.is_empty()));
        assert!(items[1].image_url.ends_with("/2.svg"));
    }
}
