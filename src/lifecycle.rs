use crate::models::{Locale, Store, Story};

/// Stories of `locale` with exactly one item: first reports with no linked
/// follow-up yet. Most recent first; equal dates break by ascending id so
/// "take the first result" is reproducible across runs.
pub fn first_reports(store: &Store, locale: Locale) -> Vec<&Story> {
    let mut out: Vec<&Story> = store
        .stories_for(locale)
        .filter(|s| s.items.len() == 1)
        .collect();
    out.sort_by(|a, b| {
        b.items[0]
            .published
            .cmp(&a.items[0].published)
            .then(a.id.cmp(&b.id))
    });
    out
}

/// Stories of `locale` with two or more items: follow-ups exist, eligible
/// for long-form rendering. Ordered by most recent item date descending,
/// ties by ascending id, truncated to `limit`.
pub fn longform_targets(store: &Store, locale: Locale, limit: usize) -> Vec<&Story> {
    let mut out: Vec<&Story> = store
        .stories_for(locale)
        .filter(|s| s.items.len() >= 2)
        .collect();
    out.sort_by(|a, b| b.last_updated().cmp(&a.last_updated()).then(a.id.cmp(&b.id)));
    out.truncate(limit);
    out
}
