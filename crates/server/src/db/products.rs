//! Product repository.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use kasir_core::{ProductId, UserId};

use super::{RepositoryError, map_write_error};
use crate::models::{NewProduct, Product, ProductChanges};

const PRODUCT_COLUMNS: &str =
    "id, name, description, category, in_stock, price, user_uid, created_at, updated_at";

/// Repository for the product catalogue.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name ASC, id ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Insert a product, optionally recording the user who created it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::CheckViolation` if a column constraint rejects
    /// the values, `RepositoryError::Database` for other failures.
    pub async fn create(
        &self,
        product: &NewProduct,
        owner: Option<UserId>,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r"
            INSERT INTO products (name, description, category, in_stock, price, user_uid)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category)
        .bind(product.in_stock)
        .bind(product.price)
        .bind(owner)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "product already exists"))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r"
            UPDATE products SET
                name        = COALESCE($2, name),
                description = COALESCE($3, description),
                category    = COALESCE($4, category),
                in_stock    = COALESCE($5, in_stock),
                price       = COALESCE($6, price),
                updated_at  = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.category)
        .bind(changes.in_stock)
        .bind(changes.price)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, "product already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete the product with this ID and nothing else.
    ///
    /// Order lines keep their history with the product reference cleared.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Catalogue prices for a set of products, used to price order lines.
///
/// Unknown IDs are simply absent from the result.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn prices(
    conn: &mut PgConnection,
    ids: &[ProductId],
) -> Result<Vec<(ProductId, Decimal)>, RepositoryError> {
    let uuids: Vec<uuid::Uuid> = ids.iter().map(ProductId::as_uuid).collect();
    let rows = sqlx::query_as::<_, (ProductId, Decimal)>(
        "SELECT id, price FROM products WHERE id = ANY($1)",
    )
    .bind(uuids)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}
