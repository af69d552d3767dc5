/// Database access layer
///
/// Thin per-entity repositories over the PostgreSQL pool. No caching;
/// every call hits the database. Relation-aware reads batch their
/// lookups (`id = ANY($1)`) so serialization never triggers extra
/// fetches.
pub mod category_repo;
pub mod comment_repo;
pub mod post_repo;
pub mod user_repo;
