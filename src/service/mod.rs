//! CriteriaService: criteria-driven reads and writes using the safe SQL builder.

mod crud;
mod validation;
pub use crud::CriteriaService;
pub use validation::RequestValidator;
