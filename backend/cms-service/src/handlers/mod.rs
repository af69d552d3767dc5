/// HTTP handlers for the CMS resources
///
/// One module per resource, each exposing the uniform CRUD set:
/// list / create / get / update / delete, plus the category-filtered
/// post listing. Handlers orchestrate payload parsing, validation,
/// file-store writes and repository calls, then serialize through the
/// resource shapes.
pub mod categories;
pub mod comments;
pub mod posts;

pub use categories::{
    create_category, delete_category, get_category, list_categories, update_category,
};
pub use comments::{create_comment, delete_comment, get_comment, list_comments, update_comment};
pub use posts::{
    create_post, delete_post, get_post, get_posts_by_category, list_posts, update_post,
};
