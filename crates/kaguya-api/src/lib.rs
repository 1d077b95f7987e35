pub mod backend;
pub mod traits;

pub use backend::{ApiError, BackendClient};
pub use traits::CatalogService;
