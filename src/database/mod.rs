pub mod pool;

pub use pool::{connect_options, create_pool, run_migrations, DatabaseError};
