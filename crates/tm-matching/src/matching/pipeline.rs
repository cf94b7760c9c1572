use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::{
    experience::SkillExperienceFilter,
    prefilter::CoarseFilter,
    query::{MatchQuery, QueryError},
    ranking::{PageRequest, PaginationInfo, sort_ranked},
    scoring::{MatchScore, calculate_match_score},
};
use crate::{
    Profile,
    store::{FilteredPage, ProfileStore},
};

pub const DEFAULT_PREFETCH_CEILING: usize = 1000;
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Most coarse-filtered candidates fetched before fine filtering in combined mode.
    pub prefetch_ceiling: usize,
    /// Page size for any-skill queries that do not give one.
    pub default_page_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            prefetch_ceiling: DEFAULT_PREFETCH_CEILING,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl EngineConfig {
    /// `TM_PREFETCH_CEILING` / `TM_DEFAULT_PAGE_SIZE`; unparsable or zero values use the defaults.
    pub fn from_env() -> Self {
        Self {
            prefetch_ceiling: positive_env("TM_PREFETCH_CEILING")
                .unwrap_or(DEFAULT_PREFETCH_CEILING),
            default_page_size: positive_env("TM_DEFAULT_PAGE_SIZE").unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

fn positive_env(name: &str) -> Option<usize> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
}

#[derive(Debug, Error)]
pub enum MatchError<E>
where
    E: std::error::Error + 'static,
{
    #[error(transparent)]
    InvalidQuery(#[from] QueryError),
    #[error("profile store error: {0}")]
    Store(#[source] E),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub profile: Profile,
    pub score: MatchScore,
    /// 1-based position in the full ranking (not just this page).
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPage {
    pub results: Vec<MatchResult>,
    pub pagination: PaginationInfo,
    /// Combined mode only: more candidates passed the coarse filter than the
    /// prefetch ceiling admitted, so qualifying profiles may be missing.
    pub prefetch_truncated: bool,
}

/// Stateless matching engine. Every call is `(pool snapshot, query) -> ranked page`.
///
/// Emits `tracing` events only; hosts install a subscriber with [`crate::logging::init`].
#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    config: EngineConfig,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(EngineConfig::from_env())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Push the coarse filter and window down to the store, then score, fine
    /// filter and rank what comes back.
    #[instrument(skip(self, store, query), fields(mode = query.mode()))]
    pub async fn search<S: ProfileStore>(
        &self,
        store: &S,
        query: &MatchQuery,
    ) -> Result<MatchPage, MatchError<S::Error>> {
        query.validate()?;

        let filter = query.coarse_filter();
        let window = self.window(query);
        let fetched = store
            .fetch_filtered(&filter, window.offset(), window.limit())
            .await
            .map_err(MatchError::Store)?;

        Ok(self.finish(query, &filter, window, fetched))
    }

    /// For stores that can only hand over everything: fetch the full pool and
    /// run the coarse filter in memory. Same results as [`Self::search`].
    #[instrument(skip(self, store, query), fields(mode = query.mode()))]
    pub async fn search_snapshot<S: ProfileStore>(
        &self,
        store: &S,
        query: &MatchQuery,
    ) -> Result<MatchPage, MatchError<S::Error>> {
        query.validate()?;

        let pool = store.fetch_all().await.map_err(MatchError::Store)?;
        Ok(self.rank_pool(&pool, query)?)
    }

    /// Synchronous core over a pool already in hand.
    pub fn rank_pool(&self, pool: &[Profile], query: &MatchQuery) -> Result<MatchPage, QueryError> {
        query.validate()?;

        let filter = query.coarse_filter();
        let window = self.window(query);
        let fetched = filter.select(pool, window.offset(), window.limit());

        Ok(self.finish(query, &filter, window, fetched))
    }

    fn window<'q>(&self, query: &'q MatchQuery) -> Window<'q> {
        match query {
            MatchQuery::AnySkill(q) => Window::Page(PageRequest::resolve(
                q.page,
                q.page_size,
                self.config.default_page_size,
            )),
            MatchQuery::PrimarySecondary(q) => Window::Prefetch {
                ceiling: self.config.prefetch_ceiling,
                skill_experience: &q.skill_experience,
            },
        }
    }

    fn finish(
        &self,
        query: &MatchQuery,
        filter: &CoarseFilter,
        window: Window<'_>,
        fetched: FilteredPage,
    ) -> MatchPage {
        let fetched_count = fetched.profiles.len();
        let coarse_total = fetched.total;
        let scored: Vec<(MatchScore, Profile)> = fetched
            .profiles
            .into_iter()
            .map(|profile| (calculate_match_score(filter, &profile), profile))
            .collect();

        let (mut survivors, pagination, prefetch_truncated) = match window {
            Window::Page(page) => (scored, PaginationInfo::for_page(page, coarse_total), false),
            Window::Prefetch {
                ceiling,
                skill_experience,
            } => {
                let survivors =
                    SkillExperienceFilter::new(skill_experience).retain(scored, |(_, p)| p);
                let pagination = PaginationInfo::single_page(survivors.len());
                (survivors, pagination, coarse_total > ceiling)
            }
        };

        sort_ranked(&mut survivors, |(score, profile)| (score.total, profile));

        if prefetch_truncated {
            warn!(
                ceiling = window.limit(),
                coarse_total, "prefetch_ceiling_truncated_candidates"
            );
        }
        info!(
            mode = query.mode(),
            fetched = fetched_count,
            coarse_total,
            survivors = survivors.len(),
            truncated = prefetch_truncated,
            "match_search_completed"
        );

        let offset = window.offset();
        let results = survivors
            .into_iter()
            .enumerate()
            .map(|(index, (score, profile))| MatchResult {
                profile,
                score,
                rank: offset + index + 1,
            })
            .collect();

        MatchPage {
            results,
            pagination,
            prefetch_truncated,
        }
    }
}

/// How much of the coarse ranking to fetch, and what to do with it.
#[derive(Debug, Clone, Copy)]
enum Window<'q> {
    /// Any-skill mode: the caller's page is a true window of the full ranking.
    Page(PageRequest),
    /// Combined mode: a bounded prefetch, fine filtered and returned as one page.
    Prefetch {
        ceiling: usize,
        skill_experience: &'q BTreeMap<String, i32>,
    },
}

impl Window<'_> {
    fn offset(&self) -> usize {
        match self {
            Window::Page(page) => page.offset(),
            Window::Prefetch { .. } => 0,
        }
    }

    fn limit(&self) -> usize {
        match self {
            Window::Page(page) => page.size,
            Window::Prefetch { ceiling, .. } => *ceiling,
        }
    }
}
