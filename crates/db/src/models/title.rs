//! Title entity model, read shape and write DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::de::{double_option, empty_as_none};
use yamdb_core::error::CoreError;
use yamdb_core::types::DbId;
use yamdb_core::validators::{
    validate_max_length, validate_not_blank, validate_year_not_in_future, BASE_FIELD_SIZE,
};

use super::taxonomy::NameSlug;

/// A title joined with its category and aggregate rating.
///
/// `rating` is `AVG(reviews.score)` computed by the query; `None` when the
/// title has no reviews.
#[derive(Debug, Clone, FromRow)]
pub struct TitleRow {
    pub id: DbId,
    pub name: String,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub rating: Option<f64>,
}

/// One genre attached to a title.
#[derive(Debug, Clone, FromRow)]
pub struct TitleGenre {
    pub title_id: DbId,
    #[sqlx(flatten)]
    pub genre: NameSlug,
}

/// Read shape returned by every title endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TitleResponse {
    pub id: DbId,
    pub name: String,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub genre: Vec<NameSlug>,
    pub category: Option<NameSlug>,
}

impl TitleResponse {
    pub fn new(row: TitleRow, genre: Vec<NameSlug>) -> Self {
        let category = match (row.category_name, row.category_slug) {
            (Some(name), Some(slug)) => Some(NameSlug { name, slug }),
            _ => None,
        };
        Self {
            id: row.id,
            name: row.name,
            year: row.year,
            rating: row.rating,
            description: row.description,
            genre,
            category,
        }
    }
}

/// DTO for `POST /titles`. Category and genres are referenced by slug.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTitle {
    pub name: String,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub genre: Vec<String>,
}

impl CreateTitle {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        if let Some(year) = self.year {
            validate_year(year)?;
        }
        Ok(())
    }
}

/// DTO for `PATCH /titles/{id}`. A present `genre` list replaces the set.
///
/// `year` and `description` may be sent as `null` to clear them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTitle {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub category: Option<String>,
    pub genre: Option<Vec<String>>,
}

impl UpdateTitle {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(Some(year)) = self.year {
            validate_year(year)?;
        }
        Ok(())
    }
}

/// Resolved write input: slugs already turned into ids.
///
/// On update an outer `None` keeps the stored value; `Some(None)` on the
/// nullable fields stores NULL.
#[derive(Debug, Clone, Default)]
pub struct TitleWrite {
    pub name: Option<String>,
    pub year: Option<Option<i32>>,
    pub description: Option<Option<String>>,
    pub category_id: Option<DbId>,
    pub genre_ids: Option<Vec<DbId>>,
}

fn validate_name(name: &str) -> Result<(), CoreError> {
    validate_not_blank(name).map_err(|e| CoreError::field("name", e))?;
    validate_max_length(name, BASE_FIELD_SIZE).map_err(|e| CoreError::field("name", e))
}

fn validate_year(year: i32) -> Result<(), CoreError> {
    if year < 0 {
        return Err(CoreError::Validation(
            "year must be a positive number".to_string(),
        ));
    }
    validate_year_not_in_future(year)
        .map(|_| ())
        .map_err(|e| CoreError::field("year", e))
}

/// Ordering keys accepted by `?ordering=` (prefix with `-` for descending).
pub const TITLE_ORDERING_FIELDS: &[&str] = &["id", "name", "year", "rating"];

/// Query parameters for `GET /titles`.
///
/// Empty values (`?category=`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleFilter {
    /// Case-insensitive partial match.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    /// Exact match.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub year: Option<i32>,
    /// Exact category slug.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,
    /// Exact genre slug.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub ordering: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
}

impl TitleFilter {
    /// SQL `ORDER BY` body for the requested ordering; defaults to name.
    pub fn order_by(&self) -> Result<String, CoreError> {
        let raw = self.ordering.as_deref().unwrap_or("name");
        let (field, direction) = match raw.strip_prefix('-') {
            Some(field) => (field, "DESC"),
            None => (raw, "ASC"),
        };

        let column = match field {
            "id" => "t.id",
            "name" => "t.name",
            "year" => "t.year",
            "rating" => "rating",
            _ => {
                return Err(CoreError::Validation(format!(
                    "Cannot order by '{field}'. Must be one of: {}",
                    TITLE_ORDERING_FIELDS.join(", ")
                )))
            }
        };

        Ok(format!("{column} {direction} NULLS LAST, t.id ASC"))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Datelike;

    use super::*;

    fn row(category: Option<(&str, &str)>) -> TitleRow {
        TitleRow {
            id: 3,
            name: "Solaris".into(),
            year: Some(1972),
            description: None,
            category_id: category.map(|_| 1),
            category_name: category.map(|(n, _)| n.to_string()),
            category_slug: category.map(|(_, s)| s.to_string()),
            rating: Some(8.5),
        }
    }

    #[test]
    fn response_nests_category() {
        let resp = TitleResponse::new(row(Some(("Film", "film"))), vec![]);
        assert_eq!(
            resp.category,
            Some(NameSlug {
                name: "Film".into(),
                slug: "film".into()
            })
        );
    }

    #[test]
    fn response_without_category_is_null() {
        let resp = TitleResponse::new(row(None), vec![]);
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["category"].is_null());
        assert_eq!(json["rating"], 8.5);
    }

    #[test]
    fn future_year_is_rejected() {
        let input = CreateTitle {
            name: "Later".into(),
            year: Some(chrono::Local::now().year() + 1),
            description: None,
            category: "film".into(),
            genre: vec![],
        };
        assert_matches!(input.validate(), Err(CoreError::InvalidField { field: "year", .. }));
    }

    #[test]
    fn default_ordering_is_by_name() {
        let filter = TitleFilter::default();
        assert_eq!(filter.order_by().unwrap(), "t.name ASC NULLS LAST, t.id ASC");
    }

    #[test]
    fn descending_rating_ordering() {
        let filter = TitleFilter {
            ordering: Some("-rating".into()),
            ..Default::default()
        };
        assert_eq!(filter.order_by().unwrap(), "rating DESC NULLS LAST, t.id ASC");
    }

    #[test]
    fn unknown_ordering_is_rejected() {
        let filter = TitleFilter {
            ordering: Some("description".into()),
            ..Default::default()
        };
        assert_matches!(filter.order_by(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn patch_null_clears_nullable_fields() {
        let patch: UpdateTitle =
            serde_json::from_str(r#"{"year": null, "description": null}"#).unwrap();
        assert_eq!(patch.year, Some(None));
        assert_eq!(patch.description, Some(None));
        assert!(patch.validate().is_ok());

        let patch: UpdateTitle = serde_json::from_str(r#"{"name": "Solaris"}"#).unwrap();
        assert_eq!(patch.year, None);
        assert_eq!(patch.description, None);
    }

    #[test]
    fn patch_year_is_still_validated() {
        let patch: UpdateTitle = serde_json::from_str(r#"{"year": -1}"#).unwrap();
        assert_matches!(patch.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn empty_filter_values_are_ignored() {
        let filter: TitleFilter = serde_json::from_value(serde_json::json!({
            "name": "",
            "year": "",
            "category": "",
            "genre": "",
            "ordering": "",
            "page": "",
        }))
        .unwrap();
        assert!(filter.name.is_none());
        assert!(filter.year.is_none());
        assert!(filter.category.is_none());
        assert!(filter.genre.is_none());
        assert!(filter.page.is_none());
        assert_eq!(filter.order_by().unwrap(), "t.name ASC NULLS LAST, t.id ASC");
    }
}
