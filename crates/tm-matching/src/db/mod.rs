pub mod pool;
pub mod profiles;
pub mod util;

pub use pool::{DbPoolError, PgPool, create_pool_from_url};
pub use profiles::{PgProfileStore, ProfileStoreError};
