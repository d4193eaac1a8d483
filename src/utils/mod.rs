pub mod table;
pub mod errors;
pub mod ratelimit;

pub use table::Table;
pub use errors::{FetchContext, ViewerError};
pub use ratelimit::check_cooldown;
