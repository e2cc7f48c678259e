/// Database plumbing
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: Embedded schema migrations
/// - `seed`: Idempotent demo data
///
/// Models live in [`crate::models`].

pub mod migrations;
pub mod pool;
pub mod seed;
