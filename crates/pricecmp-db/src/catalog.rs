//! The data-access seam used by the HTTP layer.
//!
//! Handlers only see `Arc<dyn Catalog>`, so tests can swap the Postgres
//! implementation for an in-memory one.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    offers, products, supermarkets, DbError, NewOffer, NewProduct, NewSupermarket, OfferPageRow,
    PageWindow, ProductOfferRow, ProductRow, SupermarketRow,
};

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_products(&self, search: Option<&str>) -> Result<Vec<ProductRow>, DbError>;

    async fn find_product(&self, gtin: &str) -> Result<Option<ProductRow>, DbError>;

    async fn insert_product(&self, product: &NewProduct) -> Result<(), DbError>;

    async fn list_product_offers(&self, gtin: &str) -> Result<Vec<ProductOfferRow>, DbError>;

    /// One window of the product × supermarket × price scan. Empty means
    /// there is nothing left to scan.
    async fn fetch_offer_page(&self, window: PageWindow) -> Result<Vec<OfferPageRow>, DbError>;

    async fn offer_exists(&self, gtin: &str, cnpj: &str) -> Result<bool, DbError>;

    async fn insert_offer(&self, offer: &NewOffer) -> Result<(), DbError>;

    async fn list_supermarkets(&self, search: Option<&str>)
        -> Result<Vec<SupermarketRow>, DbError>;

    async fn find_supermarkets(&self, cnpj: &str) -> Result<Vec<SupermarketRow>, DbError>;

    async fn count_supermarkets(&self, cnpj: &str) -> Result<i64, DbError>;

    async fn insert_supermarket(&self, supermarket: &NewSupermarket) -> Result<(), DbError>;
}

/// [`Catalog`] backed by a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn list_products(&self, search: Option<&str>) -> Result<Vec<ProductRow>, DbError> {
        products::list_products(&self.pool, search).await
    }

    async fn find_product(&self, gtin: &str) -> Result<Option<ProductRow>, DbError> {
        products::find_product(&self.pool, gtin).await
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<(), DbError> {
        products::insert_product(&self.pool, product).await
    }

    async fn list_product_offers(&self, gtin: &str) -> Result<Vec<ProductOfferRow>, DbError> {
        offers::list_product_offers(&self.pool, gtin).await
    }

    async fn fetch_offer_page(&self, window: PageWindow) -> Result<Vec<OfferPageRow>, DbError> {
        tracing::trace!(from = window.from, to = window.to, "fetching offer page");
        offers::fetch_offer_page(&self.pool, window).await
    }

    async fn offer_exists(&self, gtin: &str, cnpj: &str) -> Result<bool, DbError> {
        offers::offer_exists(&self.pool, gtin, cnpj).await
    }

    async fn insert_offer(&self, offer: &NewOffer) -> Result<(), DbError> {
        offers::insert_offer(&self.pool, offer).await
    }

    async fn list_supermarkets(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<SupermarketRow>, DbError> {
        supermarkets::list_supermarkets(&self.pool, search).await
    }

    async fn find_supermarkets(&self, cnpj: &str) -> Result<Vec<SupermarketRow>, DbError> {
        supermarkets::find_supermarkets(&self.pool, cnpj).await
    }

    async fn count_supermarkets(&self, cnpj: &str) -> Result<i64, DbError> {
        supermarkets::count_supermarkets(&self.pool, cnpj).await
    }

    async fn insert_supermarket(&self, supermarket: &NewSupermarket) -> Result<(), DbError> {
        supermarkets::insert_supermarket(&self.pool, supermarket).await
    }
}
