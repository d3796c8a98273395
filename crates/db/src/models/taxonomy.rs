//! Categories and genres.
//!
//! Both tables share the same shape (`name` + unique `slug`), so they share
//! one row type, [`Taxon`], and one repository parameterised by [`Taxonomy`].

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::de::empty_as_none;
use yamdb_core::error::CoreError;
use yamdb_core::types::{DbId, Timestamp};
use yamdb_core::validators::{
    validate_max_length, validate_not_blank, validate_slug, BASE_FIELD_SIZE,
};

/// Which classification table an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Taxonomy {
    Category,
    Genre,
}

impl Taxonomy {
    pub fn table(self) -> &'static str {
        match self {
            Taxonomy::Category => "categories",
            Taxonomy::Genre => "genres",
        }
    }

    /// Entity name used in error messages.
    pub fn entity(self) -> &'static str {
        match self {
            Taxonomy::Category => "Category",
            Taxonomy::Genre => "Genre",
        }
    }
}

/// The `name` + `slug` field group. Doubles as the create DTO and the
/// public representation.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct NameSlug {
    pub name: String,
    pub slug: String,
}

impl NameSlug {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_not_blank(&self.name).map_err(|e| CoreError::field("name", e))?;
        validate_max_length(&self.name, BASE_FIELD_SIZE).map_err(|e| CoreError::field("name", e))?;
        validate_slug(&self.slug).map_err(|e| CoreError::field("slug", e))?;
        Ok(())
    }
}

/// A row from `categories` or `genres`.
#[derive(Debug, Clone, FromRow)]
pub struct Taxon {
    pub id: DbId,
    #[sqlx(flatten)]
    pub fields: NameSlug,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Query parameters for `GET /categories` and `GET /genres`.
#[derive(Debug, Default, Deserialize)]
pub struct TaxonListParams {
    /// Case-insensitive partial match on name.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn tables_match_migrations() {
        assert_eq!(Taxonomy::Category.table(), "categories");
        assert_eq!(Taxonomy::Genre.table(), "genres");
    }

    #[test]
    fn blank_name_is_rejected() {
        let input = NameSlug {
            name: "  ".into(),
            slug: "films".into(),
        };
        assert_matches!(input.validate(), Err(CoreError::InvalidField { field: "name", .. }));
    }

    #[test]
    fn bad_slug_is_rejected() {
        let input = NameSlug {
            name: "Films".into(),
            slug: "films & tv".into(),
        };
        assert_matches!(input.validate(), Err(CoreError::InvalidField { field: "slug", .. }));
    }
}
