pub mod params;
pub mod sql;
pub mod target;

pub use params::PgBindValue;
pub use sql::{QueryBuf, SqlSelect};
pub use target::{Call, ConditionTarget, QueryTarget, RecordedQuery};
