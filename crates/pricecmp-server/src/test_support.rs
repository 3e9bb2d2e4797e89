//! In-memory [`Catalog`] for handler and search tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pricecmp_core::Coordinate;
use pricecmp_db::{
    Catalog, DbError, NewOffer, NewProduct, NewSupermarket, OfferPageRow, PageWindow,
    ProductOfferRow, ProductRow, SupermarketRow,
};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

/// Query coordinate used across tests (Praça da Sé, São Paulo).
pub const ORIGIN: Coordinate = Coordinate::new(-23.5503, -46.6339);

/// Scripted page result; `Err(())` becomes a database error.
pub type ScriptedPage = Result<Vec<OfferPageRow>, ()>;

#[derive(Default)]
pub struct FakeCatalog {
    pub products: Mutex<Vec<ProductRow>>,
    pub supermarkets: Mutex<Vec<SupermarketRow>>,
    pub offers: Mutex<Vec<NewOffer>>,
    pages: Mutex<VecDeque<ScriptedPage>>,
    page_requests: Mutex<Vec<PageWindow>>,
    pub insert_supermarket_calls: AtomicUsize,
    pub insert_offer_calls: AtomicUsize,
    pub insert_product_calls: AtomicUsize,
    /// Every operation fails with a database error.
    pub failing: bool,
}

impl FakeCatalog {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Pages served in order by `fetch_offer_page`; once exhausted every
    /// further fetch returns an empty page.
    pub fn with_pages(self, pages: Vec<ScriptedPage>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..self
        }
    }

    pub fn with_product(mut self, gtin: &str, descricao: &str) -> Self {
        self.products.get_mut().push(ProductRow {
            gtin: gtin.to_string(),
            descricao: descricao.to_string(),
            imagem_url: None,
        });
        self
    }

    pub fn with_supermarket(mut self, cnpj: &str, descricao: &str, at: Coordinate) -> Self {
        self.supermarkets.get_mut().push(supermarket_row(cnpj, descricao, at));
        self
    }

    pub fn with_offer(mut self, gtin: &str, cnpj: &str, cents: i64) -> Self {
        self.offers.get_mut().push(NewOffer {
            gtin: gtin.to_string(),
            cnpj: cnpj.to_string(),
            preco: Decimal::new(cents, 2),
            promocao: false,
            disponivel: true,
        });
        self
    }

    pub async fn page_requests(&self) -> Vec<PageWindow> {
        self.page_requests.lock().await.clone()
    }

    fn check(&self) -> Result<(), DbError> {
        if self.failing {
            Err(db_error())
        } else {
            Ok(())
        }
    }
}

pub fn db_error() -> DbError {
    DbError::Sqlx(sqlx::Error::PoolTimedOut)
}

pub fn supermarket_row(cnpj: &str, descricao: &str, at: Coordinate) -> SupermarketRow {
    SupermarketRow {
        cnpj: cnpj.to_string(),
        descricao: descricao.to_string(),
        cidade: "São Paulo".to_string(),
        bairro: "Sé".to_string(),
        logradouro: "Praça da Sé".to_string(),
        uf: "SP".to_string(),
        cep: "01001000".to_string(),
        latitude: at.latitude,
        longitude: at.longitude,
        imagem_url: None,
        numero: None,
    }
}

fn page_row(gtin: String, at: Coordinate) -> OfferPageRow {
    OfferPageRow {
        descricao: format!("Produto {gtin}"),
        gtin,
        preco: Decimal::new(1000, 2),
        latitude: at.latitude,
        longitude: at.longitude,
    }
}

/// Rows located at [`ORIGIN`].
pub fn near_rows(count: usize) -> Vec<OfferPageRow> {
    (0..count)
        .map(|i| page_row(format!("near-{i}"), ORIGIN))
        .collect()
}

/// Rows roughly 70 km from [`ORIGIN`] (Campinas).
pub fn far_rows(count: usize) -> Vec<OfferPageRow> {
    (0..count)
        .map(|i| page_row(format!("far-{i}"), Coordinate::new(-22.9099, -47.0626)))
        .collect()
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_products(&self, search: Option<&str>) -> Result<Vec<ProductRow>, DbError> {
        self.check()?;
        let needle = search.map(str::to_lowercase);
        Ok(self
            .products
            .lock()
            .await
            .iter()
            .filter(|p| {
                needle.as_deref().map_or(true, |n| {
                    p.descricao.to_lowercase().contains(n) || p.gtin.contains(n)
                })
            })
            .cloned()
            .collect())
    }

    async fn find_product(&self, gtin: &str) -> Result<Option<ProductRow>, DbError> {
        self.check()?;
        Ok(self
            .products
            .lock()
            .await
            .iter()
            .find(|p| p.gtin == gtin)
            .cloned())
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<(), DbError> {
        self.check()?;
        self.insert_product_calls.fetch_add(1, Ordering::Relaxed);
        self.products.lock().await.push(ProductRow {
            gtin: product.gtin.clone(),
            descricao: product.descricao.clone(),
            imagem_url: None,
        });
        Ok(())
    }

    async fn list_product_offers(&self, gtin: &str) -> Result<Vec<ProductOfferRow>, DbError> {
        self.check()?;
        let supermarkets = self.supermarkets.lock().await;
        Ok(self
            .offers
            .lock()
            .await
            .iter()
            .filter(|o| o.gtin == gtin)
            .filter_map(|o| {
                let s = supermarkets.iter().find(|s| s.cnpj == o.cnpj)?;
                Some(ProductOfferRow {
                    cnpj: s.cnpj.clone(),
                    supermercado_descricao: s.descricao.clone(),
                    latitude: s.latitude,
                    longitude: s.longitude,
                    preco: o.preco,
                    promocao: o.promocao,
                    disponivel: o.disponivel,
                })
            })
            .collect())
    }

    async fn fetch_offer_page(&self, window: PageWindow) -> Result<Vec<OfferPageRow>, DbError> {
        self.check()?;
        self.page_requests.lock().await.push(window);
        match self.pages.lock().await.pop_front() {
            Some(Ok(rows)) => Ok(rows),
            Some(Err(())) => Err(db_error()),
            None => Ok(Vec::new()),
        }
    }

    async fn offer_exists(&self, gtin: &str, cnpj: &str) -> Result<bool, DbError> {
        self.check()?;
        Ok(self
            .offers
            .lock()
            .await
            .iter()
            .any(|o| o.gtin == gtin && o.cnpj == cnpj))
    }

    async fn insert_offer(&self, offer: &NewOffer) -> Result<(), DbError> {
        self.check()?;
        self.insert_offer_calls.fetch_add(1, Ordering::Relaxed);
        self.offers.lock().await.push(offer.clone());
        Ok(())
    }

    async fn list_supermarkets(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<SupermarketRow>, DbError> {
        self.check()?;
        let needle = search.map(str::to_lowercase);
        Ok(self
            .supermarkets
            .lock()
            .await
            .iter()
            .filter(|s| {
                needle.as_deref().map_or(true, |n| {
                    s.descricao.to_lowercase().contains(n) || s.cnpj.contains(n)
                })
            })
            .cloned()
            .collect())
    }

    async fn find_supermarkets(&self, cnpj: &str) -> Result<Vec<SupermarketRow>, DbError> {
        self.check()?;
        Ok(self
            .supermarkets
            .lock()
            .await
            .iter()
            .filter(|s| s.cnpj == cnpj)
            .cloned()
            .collect())
    }

    async fn count_supermarkets(&self, cnpj: &str) -> Result<i64, DbError> {
        Ok(i64::try_from(self.find_supermarkets(cnpj).await?.len()).unwrap_or(i64::MAX))
    }

    async fn insert_supermarket(&self, supermarket: &NewSupermarket) -> Result<(), DbError> {
        self.check()?;
        self.insert_supermarket_calls.fetch_add(1, Ordering::Relaxed);
        self.supermarkets.lock().await.push(SupermarketRow {
            cnpj: supermarket.cnpj.clone(),
            descricao: supermarket.descricao.clone(),
            cidade: supermarket.cidade.clone(),
            bairro: supermarket.bairro.clone(),
            logradouro: supermarket.logradouro.clone(),
            uf: supermarket.uf.clone(),
            cep: supermarket.cep.clone(),
            latitude: supermarket.latitude,
            longitude: supermarket.longitude,
            imagem_url: None,
            numero: supermarket.numero.clone(),
        });
        Ok(())
    }
}
