//! SQLite-backed cart repository.

use async_trait::async_trait;
use common::{CartItemId, ProductId, UserId};
use domain::repository::Result;
use domain::{
    Cart, CartItem, CartRepository, MAX_QUANTITY, Money, Product, RepositoryError,
    quantity_in_range,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::StoreError;

/// Cart lines joined with their live product rows.
const SELECT_ITEM: &str = r#"
    SELECT ci.id, ci.user_id, ci.product_id, ci.quantity, ci.created_at,
           p.name, p.description, p.price_cents, p.category, p.version, p.compatibility,
           p.image_url, p.created_at AS product_created_at, p.updated_at AS product_updated_at
    FROM cart_items ci
    INNER JOIN products p ON p.id = ci.product_id
"#;

/// Cart repository stored in the `cart_items` table.
#[derive(Clone)]
pub struct SqliteCartRepository {
    pool: SqlitePool,
}

impl SqliteCartRepository {
    /// Creates a repository over an already migrated pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn row_to_item(row: &SqliteRow) -> std::result::Result<CartItem, StoreError> {
        let quantity: i64 = row.try_get("quantity")?;
        if !quantity_in_range(quantity) {
            return Err(StoreError::InvalidRow(format!(
                "cart item quantity {quantity} out of range"
            )));
        }

        let price_cents: i64 = row.try_get("price_cents")?;
        if price_cents < 0 {
            return Err(StoreError::InvalidRow(format!(
                "negative price_cents {price_cents}"
            )));
        }

        let product = Product {
            id: ProductId::new(row.try_get("product_id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: Money::from_cents(price_cents),
            category: row.try_get("category")?,
            version: row.try_get("version")?,
            compatibility: row.try_get("compatibility")?,
            image_url: row.try_get("image_url")?,
            created_at: row.try_get("product_created_at")?,
            updated_at: row.try_get("product_updated_at")?,
        };

        Ok(CartItem::restore(
            CartItemId::new(row.try_get("id")?),
            UserId::new(row.try_get("user_id")?),
            product,
            quantity as u32,
            row.try_get("created_at")?,
        ))
    }

    async fn load_item(
        &self,
        item_id: CartItemId,
    ) -> std::result::Result<Option<CartItem>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_ITEM} WHERE ci.id = ?"))
            .bind(item_id.get())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_item).transpose()
    }
}

#[async_trait]
impl CartRepository for SqliteCartRepository {
    async fn get_by_user_id(&self, user_id: UserId) -> Result<Cart> {
        let rows = sqlx::query(&format!(
            "{SELECT_ITEM} WHERE ci.user_id = ? ORDER BY ci.created_at DESC, ci.id DESC"
        ))
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)?;

        let items = rows
            .iter()
            .map(Self::row_to_item)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Cart::from_items(user_id, items).map_err(RepositoryError::backend)
    }

    async fn add_item(&self, item: CartItem) -> Result<CartItem> {
        // Insert, or merge into the existing line in the same statement. When
        // the summed quantity would exceed the cap the update's WHERE clause
        // suppresses the write and RETURNING yields no row.
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO cart_items (user_id, product_id, quantity, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (user_id, product_id) DO UPDATE
                SET quantity = cart_items.quantity + excluded.quantity
                WHERE cart_items.quantity + excluded.quantity <= ?5
            RETURNING id
            "#,
        )
        .bind(item.user_id().get())
        .bind(item.product_id().get())
        .bind(i64::from(item.quantity()))
        .bind(item.created_at())
        .bind(i64::from(MAX_QUANTITY))
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?;

        let Some(id) = id else {
            return Err(RepositoryError::QuantityExceeded {
                product_id: item.product_id(),
            });
        };

        let item_id = CartItemId::new(id);
        self.load_item(item_id)
            .await?
            .ok_or(RepositoryError::ItemNotFound(item_id))
    }

    async fn update_item_quantity(
        &self,
        item_id: CartItemId,
        new_quantity: i64,
    ) -> Result<CartItem> {
        if !quantity_in_range(new_quantity) {
            return Err(RepositoryError::InvalidQuantity {
                quantity: new_quantity,
            });
        }

        let result = sqlx::query("UPDATE cart_items SET quantity = ? WHERE id = ?")
            .bind(new_quantity)
            .bind(item_id.get())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::ItemNotFound(item_id));
        }

        self.load_item(item_id)
            .await?
            .ok_or(RepositoryError::ItemNotFound(item_id))
    }

    async fn remove_item(&self, item_id: CartItemId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = ?")
            .bind(item_id.get())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_item_by_user_and_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ? AND product_id = ?")
            .bind(user_id.get())
            .bind(product_id.get())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
            .bind(user_id.get())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;
        tracing::debug!(%user_id, removed = result.rows_affected(), "cart cleared");
        Ok(true)
    }

    async fn find_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<CartItem>> {
        let row = sqlx::query(&format!(
            "{SELECT_ITEM} WHERE ci.user_id = ? AND ci.product_id = ?"
        ))
        .bind(user_id.get())
        .bind(product_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(row.as_ref().map(Self::row_to_item).transpose()?)
    }

    async fn find_item_by_id(&self, item_id: CartItemId) -> Result<Option<CartItem>> {
        Ok(self.load_item(item_id).await?)
    }

    async fn get_total_items(&self, user_id: UserId) -> Result<u32> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0) FROM cart_items WHERE user_id = ?")
                .bind(user_id.get())
                .fetch_one(&self.pool)
                .await
                .map_err(StoreError::from)?;

        u32::try_from(total).map_err(|_| {
            RepositoryError::from(StoreError::InvalidRow(format!(
                "total quantity {total} out of range"
            )))
        })
    }
}
