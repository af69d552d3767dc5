/// Category validation
use super::{check_image, check_max_chars, check_required, is_blank, messages, FieldErrors};
use crate::db::category_repo;
use crate::error::{AppError, Result};
use crate::requests::CategoryPayload;
use sqlx::PgPool;

/// The validated field set persisted for a category
#[derive(Debug, Clone)]
pub struct CategoryData {
    pub name: String,
    pub description: Option<String>,
    pub is_published: Option<bool>,
    pub parent_id: Option<i64>,
}

/// Field-local checks that need no database access
fn check_fields(payload: &CategoryPayload) -> FieldErrors {
    let mut errors = payload.type_errors.clone();

    check_required("name", payload.name.as_deref(), &mut errors);
    check_max_chars("name", payload.name.as_deref(), 255, &mut errors);

    if let Some(image) = &payload.image {
        check_image("image", image, &mut errors);
    }

    errors
}

/// Validate a create (`exclude_id: None`) or update (`Some(id)`)
/// payload. The uniqueness probe skips the row being updated; the
/// parent reference must exist and, on update, must not point at the
/// category itself or anything below it.
pub async fn validate_category(
    pool: &PgPool,
    payload: &CategoryPayload,
    exclude_id: Option<i64>,
) -> Result<CategoryData> {
    let mut errors = check_fields(payload);

    if !is_blank(payload.name.as_deref()) {
        let name = payload.name.as_deref().unwrap_or_default();
        let taken = category_repo::name_exists(pool, name, exclude_id)
            .await
            .map_err(|e| AppError::database("validating", "category", e))?;
        if taken {
            errors.add("name", messages::taken("name"));
        }
    }

    if let Some(parent_id) = payload.parent_id {
        let parent_exists = category_repo::exists(pool, parent_id)
            .await
            .map_err(|e| AppError::database("validating", "category", e))?;
        if !parent_exists {
            errors.add("parent_id", messages::invalid_selection("parent_id"));
        } else if let Some(current_id) = exclude_id {
            let cycles = parent_id == current_id
                || category_repo::is_descendant(pool, parent_id, current_id)
                    .await
                    .map_err(|e| AppError::database("validating", "category", e))?;
            if cycles {
                errors.add("parent_id", messages::category_cycle("parent_id"));
            }
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(CategoryData {
        name: payload.name.clone().unwrap_or_default(),
        description: payload.description.clone(),
        is_published: payload.is_published,
        parent_id: payload.parent_id,
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn missing_name_is_required() {
        let payload = CategoryPayload::default();
        let errors = check_fields(&payload);

        assert_eq!(
            errors.messages("name"),
            &["The name field is required."]
        );
    }

    #[test]
    fn long_name_and_bad_image_are_collected_together() {
        let payload = CategoryPayload {
            name: Some("x".repeat(256)),
            image: Some(upload("notes.txt", b"not an image")),
            ..CategoryPayload::default()
        };

        let errors = check_fields(&payload);
        assert_eq!(
            errors.messages("name"),
            &["The name field must not be greater than 255 characters."]
        );
        assert_eq!(
            errors.messages("image"),
            &["The image field must be an image."]
        );
    }

    #[test]
    fn type_errors_from_the_payload_carry_through() {
        let mut type_errors = FieldErrors::new();
        type_errors.add("is_published", messages::boolean("is_published"));

        let payload = CategoryPayload {
            name: Some("Tech".to_string()),
            type_errors,
            ..CategoryPayload::default()
        };

        let errors = check_fields(&payload);
        assert_eq!(
            errors.messages("is_published"),
            &["The is published field must be true or false."]
        );
        assert!(errors.messages("name").is_empty());
    }

    #[test]
    fn valid_fields_produce_no_errors() {
        let payload = CategoryPayload {
            name: Some("Tech".to_string()),
            description: Some("All things tech".to_string()),
            is_published: Some(true),
            image: Some(upload("cover.png", PNG_MAGIC)),
            ..CategoryPayload::default()
        };

        assert!(check_fields(&payload).is_empty());
    }
}
