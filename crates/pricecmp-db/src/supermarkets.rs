//! Database operations for the `supermercados` table.

use sqlx::PgPool;

use crate::{contains_pattern, DbError};

/// A row from the `supermercados` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SupermarketRow {
    pub cnpj: String,
    pub descricao: String,
    pub cidade: String,
    pub bairro: String,
    pub logradouro: String,
    pub uf: String,
    pub cep: String,
    pub latitude: f64,
    pub longitude: f64,
    pub imagem_url: Option<String>,
    pub numero: Option<String>,
}

/// Input record for registering a supermarket.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSupermarket {
    pub cnpj: String,
    pub descricao: String,
    pub cidade: String,
    pub bairro: String,
    pub logradouro: String,
    pub uf: String,
    pub cep: String,
    pub latitude: f64,
    pub longitude: f64,
    pub numero: Option<String>,
}

const SUPERMARKET_COLUMNS: &str = "cnpj, descricao, cidade, bairro, logradouro, uf, cep, \
     latitude, longitude, imagem_url, numero";

/// Lists supermarkets, optionally filtered by a case-insensitive substring of
/// `descricao` or `cnpj`. Ordered by `descricao`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_supermarkets(
    pool: &PgPool,
    search: Option<&str>,
) -> Result<Vec<SupermarketRow>, DbError> {
    let rows = if let Some(term) = search {
        let sql = format!(
            "SELECT {SUPERMARKET_COLUMNS} \
             FROM supermercados \
             WHERE descricao ILIKE $1 OR cnpj ILIKE $1 \
             ORDER BY descricao, cnpj"
        );
        sqlx::query_as::<_, SupermarketRow>(&sql)
            .bind(contains_pattern(term))
            .fetch_all(pool)
            .await?
    } else {
        let sql =
            format!("SELECT {SUPERMARKET_COLUMNS} FROM supermercados ORDER BY descricao, cnpj");
        sqlx::query_as::<_, SupermarketRow>(&sql)
            .fetch_all(pool)
            .await?
    };

    Ok(rows)
}

/// Returns every supermarket whose `cnpj` equals the argument (zero or one row).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_supermarkets(pool: &PgPool, cnpj: &str) -> Result<Vec<SupermarketRow>, DbError> {
    let sql = format!("SELECT {SUPERMARKET_COLUMNS} FROM supermercados WHERE cnpj = $1");
    let rows = sqlx::query_as::<_, SupermarketRow>(&sql)
        .bind(cnpj)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Counts supermarkets registered under `cnpj`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_supermarkets(pool: &PgPool, cnpj: &str) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM supermercados WHERE cnpj = $1")
        .bind(cnpj)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Inserts a supermarket.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including a unique
/// violation when the CNPJ already exists.
pub async fn insert_supermarket(pool: &PgPool, supermarket: &NewSupermarket) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO supermercados \
             (cnpj, descricao, cidade, bairro, logradouro, uf, cep, latitude, longitude, numero) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(&supermarket.cnpj)
    .bind(&supermarket.descricao)
    .bind(&supermarket.cidade)
    .bind(&supermarket.bairro)
    .bind(&supermarket.logradouro)
    .bind(&supermarket.uf)
    .bind(&supermarket.cep)
    .bind(supermarket.latitude)
    .bind(supermarket.longitude)
    .bind(&supermarket.numero)
    .execute(pool)
    .await?;

    Ok(())
}
