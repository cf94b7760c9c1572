use serde::Serialize;

use crate::{
    Profile,
    matching::{pipeline::MatchPage, ranking::PaginationInfo},
};

#[derive(Debug, Clone, Serialize)]
pub struct PaginationResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationInfo,
}

/// A ranked profile as returned to the directory UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMatchDto {
    #[serde(flatten)]
    pub profile: Profile,
    pub match_score: u32,
    pub matched_skills: Vec<String>,
    pub matched_secondary_skills: Vec<String>,
    pub rank: usize,
}

impl From<MatchPage> for PaginationResponse<ResourceMatchDto> {
    fn from(page: MatchPage) -> Self {
        Self {
            data: page
                .results
                .into_iter()
                .map(|result| ResourceMatchDto {
                    profile: result.profile,
                    match_score: result.score.total,
                    matched_skills: result.score.matched_skills,
                    matched_secondary_skills: result.score.matched_secondary,
                    rank: result.rank,
                })
                .collect(),
            pagination: page.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        MatchResult, Skill,
        matching::scoring::MatchScore,
    };

    #[test]
    fn serialises_flat_camel_case_payload() {
        let page = MatchPage {
            results: vec![MatchResult {
                profile: Profile {
                    id: Some(7),
                    employee_id: "XI-0007".into(),
                    name: "Meera".into(),
                    total_experience: Some(9),
                    skills: vec![Skill::primary("Java", Some(5))],
                    ..Profile::default()
                },
                score: MatchScore {
                    total: 1,
                    matched_skills: vec!["Java".into()],
                    matched_secondary: vec![],
                },
                rank: 1,
            }],
            pagination: PaginationInfo::single_page(1),
            prefetch_truncated: false,
        };

        let json = serde_json::to_value(PaginationResponse::from(page)).unwrap();
        let row = &json["data"][0];
        assert_eq!(row["employeeId"], "XI-0007");
        assert_eq!(row["totalExperience"], 9);
        assert_eq!(row["status"], "ATP");
        assert_eq!(row["matchScore"], 1);
        assert_eq!(row["skills"][0]["type"], "PRIMARY");
        assert_eq!(json["pagination"]["itemsPerPage"], 1);
        assert_eq!(json["pagination"]["currentPage"], 1);
    }
}
