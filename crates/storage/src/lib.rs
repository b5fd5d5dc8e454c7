pub mod error;
pub mod pool;
pub mod postgres;
pub mod store;

pub use error::StoreError;
pub use pool::{connect_pool, run_migrations};
pub use postgres::PgImageStore;
pub use store::ImageStore;
