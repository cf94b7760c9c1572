pub mod search_request;
pub mod search_response;

pub use search_request::{SearchRequest, SkillBasedSearchRequest};
pub use search_response::{PaginationResponse, ResourceMatchDto};
