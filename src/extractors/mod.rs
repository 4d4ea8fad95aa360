pub mod criteria;

pub use criteria::CriteriaQuery;
