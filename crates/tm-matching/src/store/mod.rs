mod memory;

use std::future::Future;

use crate::{Profile, matching::prefilter::CoarseFilter};

pub use memory::InMemoryProfileStore;

/// One window of coarse-filtered profiles plus the total number that passed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredPage {
    /// Sorted by provisional count descending, then name ascending.
    pub profiles: Vec<Profile>,
    pub total: usize,
}

/// Read access to the canonical profile set.
///
/// `fetch_filtered` must honour the [`CoarseFilter`] contract exactly: the
/// same location, experience-floor and skill-presence semantics and the same
/// provisional ordering as `CoarseFilter::select`. A backing may push
/// everything down (SQL) or evaluate in memory; the engine cannot tell.
pub trait ProfileStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send;

    fn fetch_filtered(
        &self,
        filter: &CoarseFilter,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<FilteredPage, Self::Error>> + Send;
}
