use std::{convert::Infallible, sync::Arc};

use super::{FilteredPage, ProfileStore};
use crate::{Profile, matching::prefilter::CoarseFilter};

/// Immutable snapshot of a profile pool. Cloning shares the snapshot.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<[Profile]>,
}

impl InMemoryProfileStore {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self {
            profiles: profiles.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl FromIterator<Profile> for InMemoryProfileStore {
    fn from_iter<I: IntoIterator<Item = Profile>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl ProfileStore for InMemoryProfileStore {
    type Error = Infallible;

    async fn fetch_all(&self) -> Result<Vec<Profile>, Self::Error> {
        Ok(self.profiles.to_vec())
    }

    async fn fetch_filtered(
        &self,
        filter: &CoarseFilter,
        offset: usize,
        limit: usize,
    ) -> Result<FilteredPage, Self::Error> {
        Ok(filter.select(&self.profiles, offset, limit))
    }
}
