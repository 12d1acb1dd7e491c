use std::{cmp::Ordering, collections::BTreeMap, ops::Range};

use crate::{
    schema::EntitySchema,
    types::{Entity, ListParams, SortOrder},
};

/// Filter value that disables a filter.
pub const ALL: &str = "all";

/// Search, filter, sort and page state of one entity listing, and the
/// derivation of the visible view from a cached collection.
#[derive(Debug, Clone)]
pub struct QueryController {
    search_fields: Vec<String>,
    search: String,
    filters: BTreeMap<String, String>,
    sort: Option<SortOrder>,
    page: usize,
    page_size: usize,
}

impl QueryController {
    pub fn new(search_fields: &[&str], page_size: usize) -> Self {
        Self {
            search_fields: search_fields.iter().map(|f| f.to_string()).collect(),
            search: String::new(),
            filters: BTreeMap::new(),
            sort: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn for_schema(schema: &EntitySchema, page_size: usize) -> Self {
        Self::new(schema.search_fields, page_size)
    }

    pub fn set_search_term(&mut self, text: &str) {
        self.search = text.to_string();
        self.page = 1;
    }

    /// Sets an equality filter. [`ALL`] or an empty value removes it.
    pub fn set_filter(&mut self, key: &str, value: &str) {
        if value.is_empty() || value == ALL {
            self.filters.remove(key);
        } else {
            self.filters.insert(key.to_string(), value.to_string());
        }
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: Option<SortOrder>) {
        self.sort = sort;
        self.page = 1;
    }

    /// Pages are 1-based; 0 is treated as 1.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn sort(&self) -> Option<&SortOrder> {
        self.sort.as_ref()
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        matches_search(entity, &self.search_fields, &self.search)
            && matches_filters(entity, &self.filters)
    }

    /// Every cached entity passing search and filters, sorted, not paged.
    pub fn matching<'a>(&self, cache: &'a [Entity]) -> Vec<&'a Entity> {
        let mut matching: Vec<&Entity> = cache.iter().filter(|e| self.matches(e)).collect();
        if let Some(sort) = &self.sort {
            matching.sort_by(|a, b| compare_entities(a, b, sort));
        }
        matching
    }

    /// The current page of [`QueryController::matching`].
    pub fn view<'a>(&self, cache: &'a [Entity]) -> Vec<&'a Entity> {
        let matching = self.matching(cache);
        let window = page_window(matching.len(), self.page, self.page_size);
        matching[window].to_vec()
    }

    pub fn total_pages(&self, cache: &[Entity]) -> u32 {
        total_pages(self.matching(cache).len(), self.page_size)
    }

    /// The same query expressed as request parameters for server-side paging.
    pub fn to_params(&self) -> ListParams {
        ListParams {
            page: Some(self.page as u32),
            limit: Some(self.page_size as u32),
            search: Some(self.search.clone()).filter(|s| !s.is_empty()),
            filters: self.filters.clone(),
            sort: self.sort.clone(),
        }
    }
}

/// Case-insensitive substring match over the given fields. An empty term
/// matches everything.
pub fn matches_search(entity: &Entity, fields: &[impl AsRef<str>], term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let term = term.to_lowercase();
    fields.iter().any(|field| {
        entity
            .field_text(field.as_ref())
            .is_some_and(|text| text.to_lowercase().contains(&term))
    })
}

/// Exact equality on every filter, skipping [`ALL`].
pub fn matches_filters(entity: &Entity, filters: &BTreeMap<String, String>) -> bool {
    filters.iter().all(|(key, expected)| {
        expected == ALL || entity.field_text(key).as_deref() == Some(expected.as_str())
    })
}

#[derive(Debug)]
enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(entity: &Entity, field: &str) -> Option<SortKey> {
    let text = entity.field_text(field)?;
    Some(match text.parse::<f64>() {
        Ok(n) if n.is_finite() => SortKey::Number(n),
        _ => SortKey::Text(text.to_lowercase()),
    })
}

/// Orders two entities by the sort field. Entities without the field sort
/// last in either direction.
pub fn compare_entities(a: &Entity, b: &Entity, sort: &SortOrder) -> Ordering {
    match (sort_key(a, &sort.field), sort_key(b, &sort.field)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ord = match (&x, &y) {
                (SortKey::Number(x), SortKey::Number(y)) => {
                    x.partial_cmp(y).unwrap_or(Ordering::Equal)
                }
                // numbers before text
                (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
                (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
                (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
            };
            if sort.descending { ord.reverse() } else { ord }
        }
    }
}

/// Index range of a 1-based page. Pages past the end are empty.
pub fn page_window(len: usize, page: usize, page_size: usize) -> Range<usize> {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    start..end
}

/// Number of pages for `len` items; an empty collection still has one page.
pub fn total_pages(len: usize, page_size: usize) -> u32 {
    len.div_ceil(page_size.max(1)).max(1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_clamps_to_collection() {
        assert_eq!(page_window(25, 1, 10), 0..10);
        assert_eq!(page_window(25, 3, 10), 20..25);
        assert_eq!(page_window(25, 4, 10), 25..25);
        assert_eq!(page_window(0, 1, 10), 0..0);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn missing_sort_field_sorts_last_both_ways() {
        let with = Entity::new("1").with_field("price", 5);
        let without = Entity::new("2");
        for descending in [false, true] {
            let sort = SortOrder {
                field: "price".to_string(),
                descending,
            };
            assert_eq!(compare_entities(&with, &without, &sort), Ordering::Less);
        }
    }
}
