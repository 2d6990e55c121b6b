//! Dimension registry adapter
//!
//! Resolves the reference identifiers embedded in orders, SKUs and
//! matrix requests: categories, models, sizes, colors, component
//! types, series codes, and the row/column labels of the matrix grid.
//! The rest of the platform treats dimensions as opaque labeled values;
//! they are immutable once referenced by inventory rows.

use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::models::{Dimension, DimensionKind, SeriesCode};

/// Registry service over the dimension tables
#[derive(Clone)]
pub struct DimensionRegistry {
    db: PgPool,
}

/// Database row for a plain dimension
#[derive(Debug, sqlx::FromRow)]
struct DimensionRow {
    id: i32,
    kind: String,
    name: String,
}

impl DimensionRow {
    fn into_dimension(self) -> AppResult<Dimension> {
        let kind = self
            .kind
            .parse::<DimensionKind>()
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
        Ok(Dimension {
            id: self.id,
            kind,
            name: self.name,
        })
    }
}

/// Database row for a series code
#[derive(Debug, sqlx::FromRow)]
struct SeriesCodeRow {
    id: i32,
    code: String,
    letter: String,
    sort_order: i32,
}

impl SeriesCodeRow {
    fn into_series_code(self) -> AppResult<SeriesCode> {
        let letter = self
            .letter
            .trim()
            .chars()
            .next()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("series code with empty letter")))?;
        Ok(SeriesCode {
            id: self.id,
            code: self.code,
            letter,
            sort_order: self.sort_order,
        })
    }
}

impl DimensionRegistry {
    /// Create a new DimensionRegistry instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Resolve a dimension by kind and id
    pub async fn resolve(&self, kind: DimensionKind, id: i32) -> AppResult<Dimension> {
        let row = sqlx::query_as::<_, DimensionRow>(
            "SELECT id, kind, name FROM dimensions WHERE id = $1 AND kind = $2",
        )
        .bind(id)
        .bind(kind.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", kind, id)))?;

        row.into_dimension()
    }

    /// Check that a dimension id of the given kind exists
    pub async fn ensure(&self, kind: DimensionKind, id: i32) -> AppResult<()> {
        self.resolve(kind, id).await.map(|_| ())
    }

    /// Whether a dimension with this name exists under the given kind
    pub async fn exists(&self, kind: DimensionKind, name: &str) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM dimensions WHERE kind = $1 AND name = $2)",
        )
        .bind(kind.as_str())
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    /// Resolve a series code by id
    pub async fn resolve_series_code(&self, id: i32) -> AppResult<SeriesCode> {
        let row = sqlx::query_as::<_, SeriesCodeRow>(
            "SELECT id, code, letter, sort_order FROM series_codes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("series code {}", id)))?;

        row.into_series_code()
    }

    /// Resolve a component-type dimension by its configured name, used
    /// to turn the bill-of-materials configuration (strap/sole names)
    /// into dimension ids.
    pub async fn resolve_component_type(&self, name: &str) -> AppResult<Dimension> {
        let row = sqlx::query_as::<_, DimensionRow>(
            "SELECT id, kind, name FROM dimensions WHERE kind = $1 AND name = $2",
        )
        .bind(DimensionKind::ComponentType.as_str())
        .bind(name)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("component type '{}'", name)))?;

        row.into_dimension()
    }

    /// Create a dimension, rejecting duplicate names within a kind
    pub async fn create(&self, kind: DimensionKind, name: &str) -> AppResult<Dimension> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name", "Dimension name must not be empty"));
        }
        if name.len() > 20 {
            return Err(AppError::validation(
                "name",
                "Dimension name must be at most 20 characters",
            ));
        }

        let row = sqlx::query_as::<_, DimensionRow>(
            r#"
            INSERT INTO dimensions (kind, name)
            VALUES ($1, $2)
            RETURNING id, kind, name
            "#,
        )
        .bind(kind.as_str())
        .bind(name)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::Conflict(format!("{} '{}' already exists", kind, name))
            }
            _ => AppError::DatabaseError(e),
        })?;

        row.into_dimension()
    }

    /// List all dimensions of one kind, ordered by name
    pub async fn list(&self, kind: DimensionKind) -> AppResult<Vec<Dimension>> {
        let rows = sqlx::query_as::<_, DimensionRow>(
            "SELECT id, kind, name FROM dimensions WHERE kind = $1 ORDER BY name",
        )
        .bind(kind.as_str())
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(DimensionRow::into_dimension).collect()
    }

    /// List series codes in display order
    pub async fn list_series_codes(&self) -> AppResult<Vec<SeriesCode>> {
        let rows = sqlx::query_as::<_, SeriesCodeRow>(
            "SELECT id, code, letter, sort_order FROM series_codes ORDER BY sort_order",
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(SeriesCodeRow::into_series_code).collect()
    }
}
