use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use tm_matching::{
    AnySkillQuery, InMemoryProfileStore, MatchQuery, MatchingEngine, PrimarySecondaryQuery,
    Profile, Skill,
};

const VOCAB: &[&str] = &["Java", "Go", "Rust", "Docker", "SQL", "Kafka", "java"];

fn skill_name() -> impl Strategy<Value = String> {
    prop::sample::select(VOCAB).prop_map(str::to_string)
}

fn skill() -> impl Strategy<Value = Skill> {
    (skill_name(), prop::option::of(0..12i32), any::<bool>()).prop_map(|(name, years, primary)| {
        if primary {
            Skill::primary(name, years)
        } else {
            Skill::secondary(name, years)
        }
    })
}

fn pool() -> impl Strategy<Value = Vec<Profile>> {
    prop::collection::vec(
        (
            prop::sample::select(&["Asha", "Bilal", "Chen", "asha"][..]),
            prop::option::of(prop::sample::select(&["Pune", "Delhi"][..])),
            prop::option::of(0..20i32),
            prop::collection::vec(skill(), 0..5),
        ),
        0..14,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(index, (name, location, total, skills))| Profile {
                id: Some(index as i64),
                employee_id: format!("E{index:03}"),
                name: name.to_string(),
                location: location.map(str::to_string),
                total_experience: total,
                skills,
                ..Profile::default()
            })
            .collect()
    })
}

fn any_skill_query() -> impl Strategy<Value = AnySkillQuery> {
    (
        prop::collection::vec(skill_name(), 0..4),
        prop::option::of(prop::sample::select(&["Pune", "Delhi", ""][..])),
        prop::option::of(0..16i32),
        prop::option::of(0..4usize),
        prop::option::of(0..6usize),
    )
        .prop_map(|(skill_names, location, floor, page, page_size)| AnySkillQuery {
            skill_names,
            location: location.map(str::to_string),
            min_total_experience: floor,
            page,
            page_size,
        })
}

fn combined_query() -> impl Strategy<Value = PrimarySecondaryQuery> {
    (
        prop::collection::vec(skill_name(), 1..3),
        prop::collection::vec(skill_name(), 0..3),
        prop::collection::btree_map(skill_name(), 0..8i32, 0..3),
        prop::option::of(0..16i32),
    )
        .prop_map(|(primary_skills, secondary_skills, skill_experience, floor)| {
            PrimarySecondaryQuery {
                primary_skills,
                secondary_skills,
                skill_experience,
                location: None,
                min_total_experience: floor,
            }
        })
}

fn distinct(names: &[String]) -> BTreeSet<&str> {
    names.iter().map(String::as_str).collect()
}

fn assert_ranked(page: &tm_matching::MatchPage) -> Result<(), TestCaseError> {
    for pair in page.results.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        prop_assert!(a.score.total >= b.score.total);
        if a.score.total == b.score.total {
            prop_assert!(
                (&a.profile.name, &a.profile.employee_id) < (&b.profile.name, &b.profile.employee_id)
            );
        }
        prop_assert_eq!(a.rank + 1, b.rank);
    }
    Ok(())
}

proptest! {
    #[test]
    fn any_skill_results_share_a_requested_name(pool in pool(), query in any_skill_query()) {
        let requested = distinct(&query.skill_names);
        let page = MatchingEngine::default()
            .rank_pool(&pool, &MatchQuery::AnySkill(query.clone()))
            .unwrap();

        for result in &page.results {
            prop_assert!(result.score.total as usize <= requested.len());
            if !requested.is_empty() {
                prop_assert!(result.score.total >= 1);
                prop_assert!(result.profile.skills.iter().any(|s| requested.contains(s.name.as_str())));
            }
        }
        prop_assert!(page.results.len() <= page.pagination.items_per_page);
        assert_ranked(&page)?;
    }

    #[test]
    fn combined_results_hold_every_primary_name(pool in pool(), query in combined_query()) {
        let primary = distinct(&query.primary_skills);
        let secondary = distinct(&query.secondary_skills);
        let page = MatchingEngine::default()
            .rank_pool(&pool, &MatchQuery::PrimarySecondary(query.clone()))
            .unwrap();

        for result in &page.results {
            let names = result.profile.skill_names();
            prop_assert!(primary.iter().all(|name| names.contains(name)));
            prop_assert!(result.score.total as usize <= primary.len() + secondary.len());
            for (skill, required) in &query.skill_experience {
                let years = result.profile.years_for_skill(skill);
                prop_assert!(years.is_some_and(|y| y >= *required));
            }
        }
        prop_assert_eq!(page.pagination.total_items, page.results.len());
        prop_assert_eq!(page.pagination.total_pages, 1);
        assert_ranked(&page)?;
    }

    #[test]
    fn ranking_ignores_pool_order(pool in pool(), query in any_skill_query()) {
        let engine = MatchingEngine::default();
        let query = MatchQuery::AnySkill(query);
        let mut reversed = pool.clone();
        reversed.reverse();

        let first = engine.rank_pool(&pool, &query).unwrap();
        prop_assert_eq!(&first, &engine.rank_pool(&pool, &query).unwrap());
        prop_assert_eq!(&first, &engine.rank_pool(&reversed, &query).unwrap());
    }

    #[test]
    fn pushdown_matches_snapshot(
        pool in pool(),
        any_skill in any_skill_query(),
        combined in combined_query(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let store = InMemoryProfileStore::new(pool);
        let engine = MatchingEngine::default();

        for query in [MatchQuery::from(any_skill), MatchQuery::from(combined)] {
            let (pushed, snapshot) = runtime.block_on(async {
                (
                    engine.search(&store, &query).await.unwrap(),
                    engine.search_snapshot(&store, &query).await.unwrap(),
                )
            });
            prop_assert_eq!(pushed, snapshot);
        }
    }

    #[test]
    fn skill_requirements_only_remove_results(pool in pool(), query in combined_query()) {
        let engine = MatchingEngine::default();
        let mut relaxed = query.clone();
        relaxed.skill_experience = BTreeMap::new();

        let strict = engine.rank_pool(&pool, &MatchQuery::from(query)).unwrap();
        let loose = engine.rank_pool(&pool, &MatchQuery::from(relaxed)).unwrap();
        prop_assert!(strict.results.len() <= loose.results.len());
    }
}
