use std::{collections::HashMap, str::FromStr};

use chrono::NaiveDate;
use deadpool_postgres::PoolError;
use tokio_postgres::{Error as PgError, Row, types::ToSql};
use tracing::{debug, instrument};

use super::{PgPool, util::TimedClientExt};
use crate::{
    Profile, ProfileStatus, Skill, SkillCategory, SkillLevel,
    matching::prefilter::{CoarseFilter, SkillConstraint, experience_threshold},
    store::{FilteredPage, ProfileStore},
};

#[derive(Debug, thiserror::Error)]
pub enum ProfileStoreError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("failed to map profile row: {0}")]
    Mapping(String),
}

const PROFILE_COLUMNS: &str = "r.id, r.employee_id, r.name, r.email, r.designation, r.location, \
     r.status, r.availability_date, r.release_date, r.total_experience";

/// Profile store backed by the `resources` / `resource_skills` tables. The
/// coarse filter, ordering and window are all evaluated in SQL.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Positional parameter collector for dynamically assembled statements.
#[derive(Default)]
struct SqlParams {
    values: Vec<Box<dyn ToSql + Send + Sync>>,
}

impl SqlParams {
    fn bind(&mut self, value: impl ToSql + Send + Sync + 'static) -> String {
        self.values.push(Box::new(value));
        format!("${}", self.values.len())
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|value| &**value as &(dyn ToSql + Sync))
            .collect()
    }
}

fn distinct_match_count(placeholder: &str) -> String {
    format!(
        "(SELECT COUNT(DISTINCT rs.skill_name) FROM resource_skills rs \
         WHERE rs.resource_id = r.id AND rs.skill_name = ANY({placeholder}))"
    )
}

/// `WHERE` body for the coarse filter. Absent constraints are simply not emitted.
fn where_clause(filter: &CoarseFilter, params: &mut SqlParams) -> String {
    let mut conditions = Vec::new();

    if let Some(location) = &filter.location {
        conditions.push(format!("r.location = {}", params.bind(location.clone())));
    }

    if let Some(floor) = filter.experience_floor {
        conditions.push(format!(
            "r.total_experience IS NOT NULL AND r.total_experience >= {}::int4",
            params.bind(experience_threshold(floor))
        ));
    }

    match &filter.skills {
        SkillConstraint::Unconstrained => {}
        SkillConstraint::AnyOf(names) if names.is_empty() => {}
        SkillConstraint::AnyOf(names) => conditions.push(format!(
            "EXISTS (SELECT 1 FROM resource_skills rs \
             WHERE rs.resource_id = r.id AND rs.skill_name = ANY({}))",
            params.bind(names.clone())
        )),
        SkillConstraint::AllOf(names) => {
            let placeholder = params.bind(names.clone());
            conditions.push(format!(
                "{} = cardinality({placeholder}::text[])",
                distinct_match_count(&placeholder)
            ));
        }
    }

    if conditions.is_empty() {
        "TRUE".to_string()
    } else {
        conditions.join(" AND ")
    }
}

/// Provisional count descending, then byte-wise name / employee id / id.
fn order_clause(filter: &CoarseFilter, params: &mut SqlParams) -> String {
    let mut terms = Vec::new();
    match &filter.skills {
        SkillConstraint::AnyOf(names) | SkillConstraint::AllOf(names) if !names.is_empty() => {
            terms.push(distinct_match_count(&params.bind(names.clone())));
        }
        _ => {}
    }
    if !filter.secondary.is_empty() {
        terms.push(distinct_match_count(&params.bind(filter.secondary.clone())));
    }

    let provisional = if terms.is_empty() {
        "0".to_string()
    } else {
        terms.join(" + ")
    };

    format!(
        "{provisional} DESC, r.name COLLATE \"C\" ASC, r.employee_id COLLATE \"C\" ASC, r.id ASC"
    )
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn parse_enum<T: FromStr>(column: &str, raw: &str) -> Result<T, ProfileStoreError> {
    raw.parse::<T>()
        .map_err(|_| ProfileStoreError::Mapping(format!("unknown {column} value: {raw}")))
}

fn map_profile_row(row: &Row) -> Result<Profile, ProfileStoreError> {
    let status: String = row.try_get("status")?;

    Ok(Profile {
        id: Some(row.try_get::<_, i64>("id")?),
        employee_id: row.try_get("employee_id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        designation: row.try_get("designation")?,
        location: row.try_get("location")?,
        status: parse_enum::<ProfileStatus>("status", &status)?,
        availability_date: row.try_get::<_, Option<NaiveDate>>("availability_date")?,
        release_date: row.try_get::<_, Option<NaiveDate>>("release_date")?,
        total_experience: row.try_get::<_, Option<i32>>("total_experience")?,
        skills: Vec::new(),
        soft_block_account_ids: Vec::new(),
    })
}

fn map_skill_row(row: &Row) -> Result<(i64, Skill), ProfileStoreError> {
    let level: String = row.try_get("skill_level")?;
    let category: String = row.try_get("skill_type")?;

    Ok((
        row.try_get("resource_id")?,
        Skill {
            name: row.try_get("skill_name")?,
            category: parse_enum::<SkillCategory>("skill_type", &category)?,
            level: parse_enum::<SkillLevel>("skill_level", &level)?,
            years_of_experience: row.try_get("years_of_experience")?,
        },
    ))
}

impl PgProfileStore {
    /// Attach skill records and soft-block account ids to already loaded profiles.
    async fn hydrate(
        &self,
        client: &deadpool_postgres::Object,
        mut profiles: Vec<Profile>,
    ) -> Result<Vec<Profile>, ProfileStoreError> {
        let ids: Vec<i64> = profiles.iter().filter_map(|p| p.id).collect();
        if ids.is_empty() {
            return Ok(profiles);
        }

        let skill_rows = client
            .timed_query_cached(
                "SELECT resource_id, skill_name, skill_level, skill_type, years_of_experience \
                 FROM resource_skills WHERE resource_id = ANY($1)",
                &[&ids],
                "fetch_profile_skills",
            )
            .await?;

        let mut skills: HashMap<i64, Vec<Skill>> = HashMap::new();
        for row in &skill_rows {
            let (resource_id, skill) = map_skill_row(row)?;
            skills.entry(resource_id).or_default().push(skill);
        }

        let block_rows = client
            .timed_query_cached(
                "SELECT resource_id, account_id FROM resource_soft_blocks \
                 WHERE resource_id = ANY($1) ORDER BY account_id",
                &[&ids],
                "fetch_profile_soft_blocks",
            )
            .await?;

        let mut blocks: HashMap<i64, Vec<i64>> = HashMap::new();
        for row in &block_rows {
            blocks
                .entry(row.try_get("resource_id")?)
                .or_default()
                .push(row.try_get("account_id")?);
        }

        for profile in &mut profiles {
            if let Some(id) = profile.id {
                profile.skills = skills.remove(&id).unwrap_or_default();
                profile.soft_block_account_ids = blocks.remove(&id).unwrap_or_default();
            }
        }

        Ok(profiles)
    }
}

impl ProfileStore for PgProfileStore {
    type Error = ProfileStoreError;

    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<Profile>, ProfileStoreError> {
        let client = self.pool.get().await?;

        let query = format!(
            "SELECT {PROFILE_COLUMNS} FROM resources r \
             ORDER BY r.name COLLATE \"C\" ASC, r.employee_id COLLATE \"C\" ASC, r.id ASC"
        );
        let rows = client
            .timed_query_cached(&query, &[], "fetch_all_profiles")
            .await?;

        let profiles = rows
            .iter()
            .map(map_profile_row)
            .collect::<Result<Vec<_>, _>>()?;
        self.hydrate(&client, profiles).await
    }

    #[instrument(skip(self, filter), fields(constraint = ?filter.skills))]
    async fn fetch_filtered(
        &self,
        filter: &CoarseFilter,
        offset: usize,
        limit: usize,
    ) -> Result<FilteredPage, ProfileStoreError> {
        let client = self.pool.get().await?;

        let mut count_params = SqlParams::default();
        let count_where = where_clause(filter, &mut count_params);
        let count_sql = format!("SELECT COUNT(r.id) FROM resources r WHERE {count_where}");
        let total: i64 = client
            .timed_query_one_cached(&count_sql, &count_params.as_refs(), "count_filtered_profiles")
            .await?
            .try_get(0)?;

        let mut params = SqlParams::default();
        let where_sql = where_clause(filter, &mut params);
        let order_sql = order_clause(filter, &mut params);
        let limit_ph = params.bind(to_i64(limit));
        let offset_ph = params.bind(to_i64(offset));
        let page_sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM resources r WHERE {where_sql} \
             ORDER BY {order_sql} LIMIT {limit_ph} OFFSET {offset_ph}"
        );

        let rows = client
            .timed_query_cached(&page_sql, &params.as_refs(), "fetch_filtered_profiles")
            .await?;
        debug!(rows = rows.len(), total, param_count = params.len(), "filtered_profiles_loaded");

        let profiles = rows
            .iter()
            .map(map_profile_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FilteredPage {
            profiles: self.hydrate(&client, profiles).await?,
            total: usize::try_from(total).unwrap_or(0),
        })
    }
}
