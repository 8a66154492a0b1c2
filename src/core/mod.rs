//! Core helpers - pure functions shared by the dispatcher and drivers.

mod clock;
mod url;

pub use clock::now_millis;
pub use url::{matches_resource, reference_path, strip_query_fragment, with_cache_bust};
