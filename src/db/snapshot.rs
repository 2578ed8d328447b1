use crate::data_models::Product;
use crate::db::errors::DBError;
use crate::db::file_store::{load_or_default, write_atomically};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::info;

/// Last successfully fetched catalog listing. Only the scheduler replaces it.
#[derive(Debug)]
pub struct SnapshotCache {
    path: PathBuf,
    max_products: usize,
    products: RwLock<Vec<Product>>,
}

impl SnapshotCache {
    pub fn load(path: impl AsRef<Path>, max_products: usize) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut products: Vec<Product> = load_or_default(&path);
        products.truncate(max_products);
        info!(path = %path.display(), products = products.len(), "loaded catalog snapshot");
        Self {
            path,
            max_products,
            products: RwLock::new(products),
        }
    }

    pub fn products(&self) -> Vec<Product> {
        self.products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn max_products(&self) -> usize {
        self.max_products
    }

    /// Swaps in a whole new listing; the in-memory copy is replaced even if the file write fails.
    pub(crate) fn replace(&self, mut products: Vec<Product>) -> Result<(), DBError> {
        products.truncate(self.max_products);
        let persisted = write_atomically(&self.path, &products);
        *self
            .products
            .write()
            .unwrap_or_else(PoisonError::into_inner) = products;
        persisted
    }
}
