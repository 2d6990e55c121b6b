//! Series/kit matrix generator
//!
//! Builds the combinatorial table mapping (model, category, series
//! code, size, component type) to a color. Generation is a set
//! reconciliation, not an append-only log: for every requested (size,
//! strap color, sole color) combination the strap and sole variants are
//! checked against the exact 6-key and only the missing ones are
//! inserted, so re-running an overlapping request creates nothing new.
//!
//! The row/column matrix cells edited by the frontend live alongside
//! the flattened kit rows; cells support single-cell color correction
//! and a bulk reset used before a full matrix reload.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::config::BomConfig;
use crate::error::{AppError, AppResult};
use crate::services::dimension::DimensionRegistry;
use shared::models::{
    expand_combinations, missing_keys, CellKey, DimensionKind, KitKey, MatrixCell,
    SeriesCombination,
};
use shared::validation::validate_combinations;

/// Series matrix service over the kit-row and matrix-cell tables
#[derive(Clone)]
pub struct SeriesMatrixService {
    db: PgPool,
    registry: DimensionRegistry,
    bom: BomConfig,
}

/// One flattened kit row: for this series, model, category and size,
/// this component type uses this color
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SeriesKitRow {
    pub id: i32,
    pub series_code_id: i32,
    pub model_id: i32,
    pub size_id: i32,
    pub color_id: i32,
    pub category_id: i32,
    pub component_type_id: i32,
}

impl SeriesKitRow {
    pub fn key(&self) -> KitKey {
        KitKey {
            series_code_id: self.series_code_id,
            model_id: self.model_id,
            size_id: self.size_id,
            color_id: self.color_id,
            category_id: self.category_id,
            component_type_id: self.component_type_id,
        }
    }
}

/// Database row for a matrix cell
#[derive(Debug, sqlx::FromRow)]
struct MatrixCellRow {
    id: i32,
    row_id: i32,
    column_id: i32,
    model_id: i32,
    category_id: i32,
    component_type_id: i32,
    color_id: i32,
}

impl From<MatrixCellRow> for MatrixCell {
    fn from(row: MatrixCellRow) -> Self {
        MatrixCell {
            id: row.id,
            row_id: row.row_id,
            column_id: row.column_id,
            model_id: row.model_id,
            category_id: row.category_id,
            component_type_id: row.component_type_id,
            color_id: row.color_id,
        }
    }
}

/// Input for generating series kit rows
#[derive(Debug, Deserialize)]
pub struct GenerateSeriesInput {
    pub model_id: i32,
    pub category_id: i32,
    pub series_code_id: i32,
    pub combinations: Vec<SeriesCombination>,
}

/// One cell in a matrix save request
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct MatrixCellInput {
    pub row_id: i32,
    pub column_id: i32,
    pub color_id: i32,
}

/// Input for saving a batch of matrix cells
#[derive(Debug, Deserialize, Validate)]
pub struct SaveMatrixCellsInput {
    pub model_id: i32,
    pub category_id: i32,
    pub component_type_id: i32,
    #[validate(length(min = 1, message = "no cells to register"))]
    pub cells: Vec<MatrixCellInput>,
}

const KIT_COLUMNS: &str =
    "id, series_code_id, model_id, size_id, color_id, category_id, component_type_id";
const CELL_COLUMNS: &str =
    "id, row_id, column_id, model_id, category_id, component_type_id, color_id";

impl SeriesMatrixService {
    /// Create a new SeriesMatrixService instance
    pub fn new(db: PgPool, bom: BomConfig) -> Self {
        let registry = DimensionRegistry::new(db.clone());
        Self { db, registry, bom }
    }

    /// Generate the kit rows for a series: per requested combination, a
    /// strap variant and a sole variant for that size. Returns only the
    /// rows created by this call; already-present variants are skipped,
    /// so the operation is idempotent over overlapping requests.
    pub async fn generate(&self, input: GenerateSeriesInput) -> AppResult<Vec<SeriesKitRow>> {
        validate_combinations(&input.combinations)
            .map_err(|msg| AppError::validation("combinations", msg))?;

        self.registry.ensure(DimensionKind::Model, input.model_id).await?;
        self.registry
            .ensure(DimensionKind::Category, input.category_id)
            .await?;
        self.registry.resolve_series_code(input.series_code_id).await?;

        for combo in &input.combinations {
            self.registry.ensure(DimensionKind::Size, combo.size_id).await?;
            self.registry
                .ensure(DimensionKind::Color, combo.color_strap_id)
                .await?;
            self.registry
                .ensure(DimensionKind::Color, combo.color_sole_id)
                .await?;
        }

        let strap_type = self
            .registry
            .resolve_component_type(&self.bom.strap_component_type)
            .await?;
        let sole_type = self
            .registry
            .resolve_component_type(&self.bom.sole_component_type)
            .await?;

        let requested = expand_combinations(
            input.series_code_id,
            input.model_id,
            input.category_id,
            strap_type.id,
            sole_type.id,
            &input.combinations,
        );

        let mut tx = self.db.begin().await?;

        let existing_rows = sqlx::query_as::<_, SeriesKitRow>(&format!(
            r#"
            SELECT {KIT_COLUMNS}
            FROM series_kits
            WHERE series_code_id = $1 AND model_id = $2 AND category_id = $3
            "#
        ))
        .bind(input.series_code_id)
        .bind(input.model_id)
        .bind(input.category_id)
        .fetch_all(&mut *tx)
        .await?;

        let existing: HashSet<KitKey> = existing_rows.iter().map(SeriesKitRow::key).collect();
        let to_insert = missing_keys(&existing, &requested);

        let mut created = Vec::with_capacity(to_insert.len());
        for key in to_insert {
            let row = sqlx::query_as::<_, SeriesKitRow>(&format!(
                r#"
                INSERT INTO series_kits
                    (series_code_id, model_id, size_id, color_id, category_id, component_type_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {KIT_COLUMNS}
                "#
            ))
            .bind(key.series_code_id)
            .bind(key.model_id)
            .bind(key.size_id)
            .bind(key.color_id)
            .bind(key.category_id)
            .bind(key.component_type_id)
            .fetch_one(&mut *tx)
            .await?;
            created.push(row);
        }

        tx.commit().await?;

        tracing::info!(
            series_code_id = input.series_code_id,
            model_id = input.model_id,
            requested = requested.len(),
            created = created.len(),
            "series kit rows generated"
        );
        Ok(created)
    }

    /// The organized series table for display: rows for one (model,
    /// category, series code) ordered by size then component type, so
    /// each size band shows its strap/sole pair together.
    pub async fn organized_table(
        &self,
        model_id: i32,
        category_id: i32,
        series_code_id: i32,
    ) -> AppResult<Vec<SeriesKitRow>> {
        let rows = sqlx::query_as::<_, SeriesKitRow>(&format!(
            r#"
            SELECT {KIT_COLUMNS}
            FROM series_kits
            WHERE model_id = $1 AND category_id = $2 AND series_code_id = $3
            ORDER BY size_id, component_type_id
            "#
        ))
        .bind(model_id)
        .bind(category_id)
        .bind(series_code_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// List every kit row in the system
    pub async fn list_all(&self) -> AppResult<Vec<SeriesKitRow>> {
        let rows = sqlx::query_as::<_, SeriesKitRow>(&format!(
            "SELECT {KIT_COLUMNS} FROM series_kits ORDER BY series_code_id, size_id, component_type_id"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// List kit rows for a model and category across all series
    pub async fn list_by_model_category(
        &self,
        model_id: i32,
        category_id: i32,
    ) -> AppResult<Vec<SeriesKitRow>> {
        let rows = sqlx::query_as::<_, SeriesKitRow>(&format!(
            r#"
            SELECT {KIT_COLUMNS}
            FROM series_kits
            WHERE model_id = $1 AND category_id = $2
            ORDER BY series_code_id, size_id, component_type_id
            "#
        ))
        .bind(model_id)
        .bind(category_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Update the color of one kit row without touching its identity
    pub async fn update_kit_color(&self, kit_id: i32, new_color_id: i32) -> AppResult<SeriesKitRow> {
        self.registry.ensure(DimensionKind::Color, new_color_id).await?;

        sqlx::query_as::<_, SeriesKitRow>(&format!(
            "UPDATE series_kits SET color_id = $1 WHERE id = $2 RETURNING {KIT_COLUMNS}"
        ))
        .bind(new_color_id)
        .bind(kit_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("series kit row {}", kit_id)))
    }

    /// Delete one kit row
    pub async fn delete_kit_row(&self, kit_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM series_kits WHERE id = $1")
            .bind(kit_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("series kit row {}", kit_id)));
        }

        Ok(())
    }

    /// Save a batch of matrix cells for one (model, category, component
    /// type) scope. The cell table carries no unique index, so the save
    /// path drops cells whose (row, column) position already exists in
    /// the scope, duplicates within the batch included. A full reload
    /// goes through [`reset_matrix`](Self::reset_matrix) first.
    pub async fn save_cells(&self, input: SaveMatrixCellsInput) -> AppResult<Vec<MatrixCell>> {
        input.validate()?;

        self.registry.ensure(DimensionKind::Model, input.model_id).await?;
        self.registry
            .ensure(DimensionKind::Category, input.category_id)
            .await?;
        self.registry
            .ensure(DimensionKind::ComponentType, input.component_type_id)
            .await?;
        for cell in &input.cells {
            self.registry.ensure(DimensionKind::Row, cell.row_id).await?;
            self.registry.ensure(DimensionKind::Column, cell.column_id).await?;
            self.registry.ensure(DimensionKind::Color, cell.color_id).await?;
        }

        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_as::<_, MatrixCellRow>(&format!(
            r#"
            SELECT {CELL_COLUMNS}
            FROM series_matrix_cells
            WHERE model_id = $1 AND category_id = $2 AND component_type_id = $3
            "#
        ))
        .bind(input.model_id)
        .bind(input.category_id)
        .bind(input.component_type_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut seen: HashSet<CellKey> = existing
            .into_iter()
            .map(|row| MatrixCell::from(row).position())
            .collect();

        let mut created = Vec::new();
        for cell in &input.cells {
            let position = CellKey {
                row_id: cell.row_id,
                column_id: cell.column_id,
                model_id: input.model_id,
                category_id: input.category_id,
                component_type_id: input.component_type_id,
            };
            if !seen.insert(position) {
                continue;
            }
            let row = sqlx::query_as::<_, MatrixCellRow>(&format!(
                r#"
                INSERT INTO series_matrix_cells
                    (row_id, column_id, model_id, category_id, component_type_id, color_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {CELL_COLUMNS}
                "#
            ))
            .bind(cell.row_id)
            .bind(cell.column_id)
            .bind(input.model_id)
            .bind(input.category_id)
            .bind(input.component_type_id)
            .bind(cell.color_id)
            .fetch_one(&mut *tx)
            .await?;
            created.push(row.into());
        }

        tx.commit().await?;

        tracing::info!(
            model_id = input.model_id,
            category_id = input.category_id,
            created = created.len(),
            "matrix cells saved"
        );
        Ok(created)
    }

    /// Get a single matrix cell
    pub async fn get_cell(&self, cell_id: i32) -> AppResult<MatrixCell> {
        let row = sqlx::query_as::<_, MatrixCellRow>(&format!(
            "SELECT {CELL_COLUMNS} FROM series_matrix_cells WHERE id = $1"
        ))
        .bind(cell_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("matrix cell {}", cell_id)))?;

        Ok(row.into())
    }

    /// List the matrix cells for one scope, in grid order
    pub async fn list_cells(
        &self,
        model_id: i32,
        category_id: i32,
        component_type_id: i32,
    ) -> AppResult<Vec<MatrixCell>> {
        let rows = sqlx::query_as::<_, MatrixCellRow>(&format!(
            r#"
            SELECT {CELL_COLUMNS}
            FROM series_matrix_cells
            WHERE model_id = $1 AND category_id = $2 AND component_type_id = $3
            ORDER BY row_id, column_id
            "#
        ))
        .bind(model_id)
        .bind(category_id)
        .bind(component_type_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(MatrixCell::from).collect())
    }

    /// Correct the color of a single cell without touching its
    /// row/column identity
    pub async fn update_cell_color(
        &self,
        cell_id: i32,
        new_color_id: i32,
    ) -> AppResult<MatrixCell> {
        self.registry.ensure(DimensionKind::Color, new_color_id).await?;

        let row = sqlx::query_as::<_, MatrixCellRow>(&format!(
            "UPDATE series_matrix_cells SET color_id = $1 WHERE id = $2 RETURNING {CELL_COLUMNS}"
        ))
        .bind(new_color_id)
        .bind(cell_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("matrix cell {}", cell_id)))?;

        Ok(row.into())
    }

    /// Bulk reset of one scope before a full matrix reload. Returns the
    /// number of deleted cells.
    pub async fn reset_matrix(
        &self,
        model_id: i32,
        category_id: i32,
        component_type_id: i32,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM series_matrix_cells
            WHERE model_id = $1 AND category_id = $2 AND component_type_id = $3
            "#,
        )
        .bind(model_id)
        .bind(category_id)
        .bind(component_type_id)
        .execute(&self.db)
        .await?;

        tracing::info!(
            model_id,
            category_id,
            component_type_id,
            deleted = result.rows_affected(),
            "matrix reset"
        );
        Ok(result.rows_affected())
    }
}
