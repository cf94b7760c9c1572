use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::Profile;

/// Tie-break between equally scored profiles: name, then employee id, then store id.
/// Comparisons are byte-wise and case-sensitive.
pub fn profile_order(a: &Profile, b: &Profile) -> Ordering {
    a.name
        .cmp(&b.name)
        .then_with(|| a.employee_id.cmp(&b.employee_id))
        .then_with(|| a.id.cmp(&b.id))
}

/// Final ranking order: score descending, then [`profile_order`].
pub fn rank_order(a: (u32, &Profile), b: (u32, &Profile)) -> Ordering {
    b.0.cmp(&a.0).then_with(|| profile_order(a.1, b.1))
}

pub fn sort_ranked<T>(items: &mut [T], key: impl Fn(&T) -> (u32, &Profile)) {
    items.sort_by(|a, b| rank_order(key(a), key(b)));
}

/// Resolved 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    /// Missing or zero values fall back to page 1 and `default_size`.
    pub fn resolve(page: Option<usize>, size: Option<usize>, default_size: usize) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(1),
            size: size
                .filter(|s| *s > 0)
                .unwrap_or_else(|| default_size.max(1)),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
}

impl PaginationInfo {
    pub fn for_page(page: PageRequest, total_items: usize) -> Self {
        Self {
            current_page: page.page,
            total_pages: total_items.div_ceil(page.size),
            total_items,
            items_per_page: page.size,
        }
    }

    /// The combined mode's single synthetic page holding every survivor.
    pub fn single_page(total_items: usize) -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_items,
            items_per_page: total_items.max(1),
        }
    }
}
