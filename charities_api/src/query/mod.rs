mod common;
pub use self::common::{ParamValue, QueryParams};

mod search;
pub use self::search::{SearchQuery, DEFAULT_PAGE_SIZE};
