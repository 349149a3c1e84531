//! In-memory product catalog and cart repository.
//!
//! Used by unit tests, API tests, and anyone embedding the cart without a
//! database. Both support failure injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CartItemId, ProductId, UserId};

use crate::cart::{Cart, CartItem, MAX_QUANTITY, Money, Product, quantity_in_range};
use crate::repository::{CartRepository, ProductLookup, RepositoryError, Result};

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: HashMap<ProductId, Product>,
    fail_on_next_call: bool,
}

/// In-memory product catalog.
///
/// Clones share the same state, so a test can keep a handle and change
/// prices after the service has been built.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryProductCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the given products.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let catalog = Self::new();
        for product in products {
            catalog.insert(product);
        }
        catalog
    }

    /// Inserts or replaces a product.
    pub fn insert(&self, product: Product) {
        self.state
            .write()
            .unwrap()
            .products
            .insert(product.id, product);
    }

    /// Changes the price of a product. Returns false if it is unknown.
    pub fn set_price(&self, product_id: ProductId, price: Money) -> bool {
        let mut state = self.state.write().unwrap();
        match state.products.get_mut(&product_id) {
            Some(product) => {
                product.price = price;
                product.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Deletes a product from the catalog.
    pub fn remove(&self, product_id: ProductId) -> bool {
        self.state
            .write()
            .unwrap()
            .products
            .remove(&product_id)
            .is_some()
    }

    /// Configures the catalog to fail on the next lookup.
    pub fn set_fail_on_next_call(&self, fail: bool) {
        self.state.write().unwrap().fail_on_next_call = fail;
    }

    /// Returns the number of products in the catalog.
    pub fn product_count(&self) -> usize {
        self.state.read().unwrap().products.len()
    }

    fn get(&self, product_id: ProductId) -> Option<Product> {
        self.state
            .read()
            .unwrap()
            .products
            .get(&product_id)
            .cloned()
    }
}

#[async_trait]
impl ProductLookup for InMemoryProductCatalog {
    async fn find_by_id(&self, product_id: ProductId) -> Result<Option<Product>> {
        let mut state = self.state.write().unwrap();
        if std::mem::take(&mut state.fail_on_next_call) {
            return Err(RepositoryError::backend("catalog unavailable"));
        }
        Ok(state.products.get(&product_id).cloned())
    }
}

/// A stored cart line. Product data is joined at read time.
#[derive(Debug, Clone)]
struct StoredItem {
    id: CartItemId,
    user_id: UserId,
    product_id: ProductId,
    quantity: u32,
    created_at: DateTime<Utc>,
}

impl StoredItem {
    fn with_product(self, product: Product) -> CartItem {
        CartItem::restore(
            self.id,
            self.user_id,
            product,
            self.quantity,
            self.created_at,
        )
    }
}

#[derive(Debug, Default)]
struct InMemoryCartState {
    items: Vec<StoredItem>,
    next_id: i64,
}

/// In-memory cart repository.
///
/// Rows reference products by id only; every read joins them with the
/// shared catalog, so price changes show up immediately. Rows whose product
/// has left the catalog are skipped by every read, counts included, like an
/// inner join would. `remove_item_by_user_and_product` and `clear_cart` still
/// delete them.
#[derive(Debug, Clone)]
pub struct InMemoryCartRepository {
    state: Arc<tokio::sync::RwLock<InMemoryCartState>>,
    catalog: InMemoryProductCatalog,
    fail_on_next_call: Arc<AtomicBool>,
}

impl InMemoryCartRepository {
    /// Creates an empty repository joined against `catalog`.
    pub fn new(catalog: InMemoryProductCatalog) -> Self {
        Self {
            state: Arc::default(),
            catalog,
            fail_on_next_call: Arc::default(),
        }
    }

    /// Configures the repository to fail on the next call.
    pub fn set_fail_on_next_call(&self, fail: bool) {
        self.fail_on_next_call.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored lines across all users.
    pub async fn item_count(&self) -> usize {
        self.state.read().await.items.len()
    }

    fn check_failure(&self) -> Result<()> {
        if self.fail_on_next_call.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::backend("cart storage unavailable"));
        }
        Ok(())
    }

    fn join(&self, row: &StoredItem) -> Option<CartItem> {
        let product = self.catalog.get(row.product_id)?;
        Some(row.clone().with_product(product))
    }

    /// Looks up the product a write refers to, before any row is touched.
    fn resolve(&self, product_id: ProductId) -> Result<Product> {
        self.catalog.get(product_id).ok_or_else(|| {
            RepositoryError::backend(format!("product {product_id} is not in the catalog"))
        })
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn get_by_user_id(&self, user_id: UserId) -> Result<Cart> {
        self.check_failure()?;
        let state = self.state.read().await;

        let mut rows: Vec<&StoredItem> = state
            .items
            .iter()
            .filter(|row| row.user_id == user_id)
            .collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.get().cmp(&a.id.get()))
        });

        let items: Vec<CartItem> = rows.into_iter().filter_map(|row| self.join(row)).collect();
        Cart::from_items(user_id, items).map_err(RepositoryError::backend)
    }

    async fn add_item(&self, item: CartItem) -> Result<CartItem> {
        self.check_failure()?;
        let product = self.resolve(item.product_id())?;
        let mut state = self.state.write().await;

        let existing = state
            .items
            .iter_mut()
            .find(|row| row.user_id == item.user_id() && row.product_id == item.product_id());

        let row = match existing {
            Some(row) => {
                let merged = row.quantity + item.quantity();
                if merged > MAX_QUANTITY {
                    return Err(RepositoryError::QuantityExceeded {
                        product_id: row.product_id,
                    });
                }
                row.quantity = merged;
                row.clone()
            }
            None => {
                state.next_id += 1;
                let row = StoredItem {
                    id: CartItemId::new(state.next_id),
                    user_id: item.user_id(),
                    product_id: item.product_id(),
                    quantity: item.quantity(),
                    created_at: item.created_at(),
                };
                state.items.push(row.clone());
                row
            }
        };

        Ok(row.with_product(product))
    }

    async fn update_item_quantity(
        &self,
        item_id: CartItemId,
        new_quantity: i64,
    ) -> Result<CartItem> {
        self.check_failure()?;
        if !quantity_in_range(new_quantity) {
            return Err(RepositoryError::InvalidQuantity {
                quantity: new_quantity,
            });
        }

        let mut state = self.state.write().await;
        let row = state
            .items
            .iter_mut()
            .find(|row| row.id == item_id)
            .ok_or(RepositoryError::ItemNotFound(item_id))?;
        let product = self.resolve(row.product_id)?;
        row.quantity = new_quantity as u32;

        Ok(row.clone().with_product(product))
    }

    async fn remove_item(&self, item_id: CartItemId) -> Result<bool> {
        self.check_failure()?;
        let mut state = self.state.write().await;
        let before = state.items.len();
        state.items.retain(|row| row.id != item_id);
        Ok(state.items.len() < before)
    }

    async fn remove_item_by_user_and_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool> {
        self.check_failure()?;
        let mut state = self.state.write().await;
        let before = state.items.len();
        state
            .items
            .retain(|row| !(row.user_id == user_id && row.product_id == product_id));
        Ok(state.items.len() < before)
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<bool> {
        self.check_failure()?;
        let mut state = self.state.write().await;
        state.items.retain(|row| row.user_id != user_id);
        Ok(true)
    }

    async fn find_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<CartItem>> {
        self.check_failure()?;
        let state = self.state.read().await;
        Ok(state
            .items
            .iter()
            .find(|row| row.user_id == user_id && row.product_id == product_id)
            .and_then(|row| self.join(row)))
    }

    async fn find_item_by_id(&self, item_id: CartItemId) -> Result<Option<CartItem>> {
        self.check_failure()?;
        let state = self.state.read().await;
        Ok(state
            .items
            .iter()
            .find(|row| row.id == item_id)
            .and_then(|row| self.join(row)))
    }

    async fn get_total_items(&self, user_id: UserId) -> Result<u32> {
        self.check_failure()?;
        let state = self.state.read().await;
        Ok(state
            .items
            .iter()
            .filter(|row| row.user_id == user_id)
            .filter_map(|row| self.join(row))
            .map(|item| item.quantity())
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: UserId = UserId::new(1);

    fn catalog() -> InMemoryProductCatalog {
        InMemoryProductCatalog::with_products([
            Product::new(ProductId::new(1), "Office Suite", "Productivity", Money::from_cents(9999)),
            Product::new(ProductId::new(2), "Antivirus", "Security", Money::from_cents(4999)),
        ])
    }

    fn item(product: &InMemoryProductCatalog, product_id: i64, quantity: i64) -> CartItem {
        let product = product.get(ProductId::new(product_id)).unwrap();
        CartItem::new(USER, product, quantity).unwrap()
    }

    #[tokio::test]
    async fn test_catalog_lookup() {
        let catalog = catalog();
        let found = catalog.find_by_id(ProductId::new(1)).await.unwrap();
        assert_eq!(found.unwrap().name, "Office Suite");
        assert!(catalog.find_by_id(ProductId::new(9)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_catalog_failure_is_one_shot() {
        let catalog = catalog();
        catalog.set_fail_on_next_call(true);

        assert!(catalog.find_by_id(ProductId::new(1)).await.is_err());
        assert!(catalog.find_by_id(ProductId::new(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_add_assigns_sequential_ids() {
        let catalog = catalog();
        let repo = InMemoryCartRepository::new(catalog.clone());

        let first = repo.add_item(item(&catalog, 1, 1)).await.unwrap();
        let second = repo.add_item(item(&catalog, 2, 1)).await.unwrap();

        assert_eq!(first.id(), Some(CartItemId::new(1)));
        assert_eq!(second.id(), Some(CartItemId::new(2)));
    }

    #[tokio::test]
    async fn test_add_merges_same_product() {
        let catalog = catalog();
        let repo = InMemoryCartRepository::new(catalog.clone());

        let first = repo.add_item(item(&catalog, 1, 2)).await.unwrap();
        let merged = repo.add_item(item(&catalog, 1, 3)).await.unwrap();

        assert_eq!(merged.id(), first.id());
        assert_eq!(merged.quantity(), 5);
        assert_eq!(repo.item_count().await, 1);
    }

    #[tokio::test]
    async fn test_add_above_cap_writes_nothing() {
        let catalog = catalog();
        let repo = InMemoryCartRepository::new(catalog.clone());
        repo.add_item(item(&catalog, 1, 50)).await.unwrap();

        let err = repo.add_item(item(&catalog, 1, 50)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::QuantityExceeded { .. }));

        let stored = repo.find_item(USER, ProductId::new(1)).await.unwrap();
        assert_eq!(stored.unwrap().quantity(), 50);
    }

    #[tokio::test]
    async fn test_reads_reflect_current_price() {
        let catalog = catalog();
        let repo = InMemoryCartRepository::new(catalog.clone());
        repo.add_item(item(&catalog, 1, 2)).await.unwrap();

        catalog.set_price(ProductId::new(1), Money::from_cents(5000));

        let cart = repo.get_by_user_id(USER).await.unwrap();
        assert_eq!(cart.total(), Money::from_cents(10000));
    }

    #[tokio::test]
    async fn test_cart_lists_newest_first() {
        let catalog = catalog();
        let repo = InMemoryCartRepository::new(catalog.clone());
        repo.add_item(item(&catalog, 1, 1)).await.unwrap();
        repo.add_item(item(&catalog, 2, 1)).await.unwrap();

        let cart = repo.get_by_user_id(USER).await.unwrap();
        let order: Vec<i64> = cart.items().iter().map(|i| i.product_id().get()).collect();
        assert_eq!(order, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_update_out_of_range_is_rejected() {
        let catalog = catalog();
        let repo = InMemoryCartRepository::new(catalog.clone());
        let stored = repo.add_item(item(&catalog, 1, 1)).await.unwrap();
        let id = stored.id().unwrap();

        let err = repo.update_item_quantity(id, 0).await.unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidQuantity { quantity: 0 }));

        let err = repo
            .update_item_quantity(CartItemId::new(99), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ItemNotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let catalog = catalog();
        let repo = InMemoryCartRepository::new(catalog.clone());
        let stored = repo.add_item(item(&catalog, 1, 1)).await.unwrap();
        repo.add_item(item(&catalog, 2, 4)).await.unwrap();

        assert!(repo.remove_item(stored.id().unwrap()).await.unwrap());
        assert!(!repo.remove_item(stored.id().unwrap()).await.unwrap());
        assert_eq!(repo.get_total_items(USER).await.unwrap(), 4);

        assert!(repo.clear_cart(USER).await.unwrap());
        assert!(repo.clear_cart(USER).await.unwrap());
        assert_eq!(repo.get_total_items(USER).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_for_product_gone_from_catalog_writes_nothing() {
        let catalog = catalog();
        let repo = InMemoryCartRepository::new(catalog.clone());
        let pending = item(&catalog, 1, 2);
        catalog.remove(ProductId::new(1));

        let err = repo.add_item(pending).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Backend(_)));
        assert_eq!(repo.item_count().await, 0);
    }

    #[tokio::test]
    async fn test_update_for_product_gone_from_catalog_writes_nothing() {
        let catalog = catalog();
        let repo = InMemoryCartRepository::new(catalog.clone());
        let stored = repo.add_item(item(&catalog, 1, 2)).await.unwrap();
        let product = catalog.get(ProductId::new(1)).unwrap();
        catalog.remove(ProductId::new(1));

        let err = repo
            .update_item_quantity(stored.id().unwrap(), 9)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Backend(_)));

        catalog.insert(product);
        let found = repo.find_item(USER, ProductId::new(1)).await.unwrap();
        assert_eq!(found.unwrap().quantity(), 2);
    }

    #[tokio::test]
    async fn test_counts_agree_after_product_leaves_catalog() {
        let catalog = catalog();
        let repo = InMemoryCartRepository::new(catalog.clone());
        repo.add_item(item(&catalog, 1, 3)).await.unwrap();
        repo.add_item(item(&catalog, 2, 2)).await.unwrap();

        catalog.remove(ProductId::new(1));

        let cart = repo.get_by_user_id(USER).await.unwrap();
        assert_eq!(cart.total_items(), 2);
        assert_eq!(repo.get_total_items(USER).await.unwrap(), 2);

        assert!(
            repo.remove_item_by_user_and_product(USER, ProductId::new(1))
                .await
                .unwrap()
        );
        assert_eq!(repo.item_count().await, 1);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let repo = InMemoryCartRepository::new(catalog());
        repo.set_fail_on_next_call(true);

        let err = repo.get_total_items(USER).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Backend(_)));
        assert!(repo.get_total_items(USER).await.is_ok());
    }
}
