//! Database operations for the `produtos` table.

use sqlx::PgPool;

use crate::{contains_pattern, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `produtos` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProductRow {
    pub gtin: String,
    pub descricao: String,
    pub imagem_url: Option<String>,
}

/// Input record for registering a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub gtin: String,
    pub descricao: String,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Lists products, optionally filtered by a case-insensitive substring of
/// `descricao` or `gtin`. Ordered by `descricao`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(
    pool: &PgPool,
    search: Option<&str>,
) -> Result<Vec<ProductRow>, DbError> {
    let rows = if let Some(term) = search {
        sqlx::query_as::<_, ProductRow>(
            "SELECT gtin, descricao, imagem_url \
             FROM produtos \
             WHERE descricao ILIKE $1 OR gtin ILIKE $1 \
             ORDER BY descricao, gtin",
        )
        .bind(contains_pattern(term))
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, ProductRow>(
            "SELECT gtin, descricao, imagem_url \
             FROM produtos \
             ORDER BY descricao, gtin",
        )
        .fetch_all(pool)
        .await?
    };

    Ok(rows)
}

/// Returns a single product by GTIN, or `None` if it is not registered.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_product(pool: &PgPool, gtin: &str) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT gtin, descricao, imagem_url FROM produtos WHERE gtin = $1",
    )
    .bind(gtin)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a product without an image.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including a unique
/// violation when the GTIN already exists.
pub async fn insert_product(pool: &PgPool, product: &NewProduct) -> Result<(), DbError> {
    sqlx::query("INSERT INTO produtos (gtin, descricao) VALUES ($1, $2)")
        .bind(&product.gtin)
        .bind(&product.descricao)
        .execute(pool)
        .await?;

    Ok(())
}
