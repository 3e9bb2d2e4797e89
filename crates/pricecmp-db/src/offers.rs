//! Database operations for `produtos_supermercados`, the price of one product
//! at one supermarket.

use pricecmp_core::{Coordinate, PriceRecord};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// An offer of a known product, joined with the supermarket that sells it.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProductOfferRow {
    pub cnpj: String,
    pub supermercado_descricao: String,
    pub latitude: f64,
    pub longitude: f64,
    pub preco: Decimal,
    pub promocao: bool,
    pub disponivel: bool,
}

impl From<ProductOfferRow> for PriceRecord {
    fn from(row: ProductOfferRow) -> Self {
        Self {
            price: row.preco,
            supermarket_id: row.cnpj,
            supermarket_description: row.supermercado_descricao,
            supermarket_coordinate: Coordinate::new(row.latitude, row.longitude),
            on_promotion: row.promocao,
            available: row.disponivel,
        }
    }
}

/// One row of the product × supermarket × price scan.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OfferPageRow {
    pub gtin: String,
    pub descricao: String,
    pub preco: Decimal,
    pub latitude: f64,
    pub longitude: f64,
}

impl OfferPageRow {
    #[must_use]
    pub fn supermarket_coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Input record for registering an offer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOffer {
    pub gtin: String,
    pub cnpj: String,
    pub preco: Decimal,
    pub promocao: bool,
    pub disponivel: bool,
}

/// Inclusive row range `[from, to]` of a scan, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub from: i64,
    pub to: i64,
}

impl PageWindow {
    #[must_use]
    pub const fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    /// Number of rows covered; zero when `to < from`.
    #[must_use]
    pub fn len(&self) -> i64 {
        self.to.saturating_sub(self.from).saturating_add(1).max(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Lists the offers of one product together with each supermarket's
/// position. Ordered by price, then supermarket.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_product_offers(
    pool: &PgPool,
    gtin: &str,
) -> Result<Vec<ProductOfferRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductOfferRow>(
        "SELECT s.cnpj, \
                s.descricao AS supermercado_descricao, \
                s.latitude, s.longitude, \
                ps.preco, ps.promocao, ps.disponivel \
         FROM produtos_supermercados ps \
         JOIN supermercados s ON s.cnpj = ps.cnpj \
         WHERE ps.gtin = $1 \
         ORDER BY ps.preco, s.cnpj",
    )
    .bind(gtin)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetches one window of the full offer scan, ordered by insertion.
///
/// An empty result means the window starts past the last row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn fetch_offer_page(
    pool: &PgPool,
    window: PageWindow,
) -> Result<Vec<OfferPageRow>, DbError> {
    if window.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, OfferPageRow>(
        "SELECT p.gtin, p.descricao, ps.preco, s.latitude, s.longitude \
         FROM produtos_supermercados ps \
         JOIN produtos p ON p.gtin = ps.gtin \
         JOIN supermercados s ON s.cnpj = ps.cnpj \
         ORDER BY ps.id \
         OFFSET $1 LIMIT $2",
    )
    .bind(window.from.max(0))
    .bind(window.len())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Whether `gtin` already has a price at `cnpj`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn offer_exists(pool: &PgPool, gtin: &str, cnpj: &str) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM produtos_supermercados WHERE gtin = $1 AND cnpj = $2)",
    )
    .bind(gtin)
    .bind(cnpj)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Inserts an offer.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including a unique
/// violation when the pair already has a price.
pub async fn insert_offer(pool: &PgPool, offer: &NewOffer) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO produtos_supermercados (gtin, cnpj, preco, promocao, disponivel) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&offer.gtin)
    .bind(&offer.cnpj)
    .bind(offer.preco)
    .bind(offer.promocao)
    .bind(offer.disponivel)
    .execute(pool)
    .await?;

    Ok(())
}
