//! SQLite-backed product catalog.

use async_trait::async_trait;
use chrono::Utc;
use common::ProductId;
use domain::{Money, Product, ProductLookup, RepositoryError};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::{Result, StoreError};

/// A catalog entry inserted by [`SqliteProductCatalog::seed_demo_products`].
struct DemoProduct {
    name: &'static str,
    description: &'static str,
    price_cents: i64,
    category: &'static str,
    version: &'static str,
    compatibility: &'static str,
}

const DEMO_PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        name: "Microsoft Office 365",
        description: "Complete productivity suite with Word, Excel, PowerPoint and more",
        price_cents: 9999,
        category: "Productivity",
        version: "2024",
        compatibility: "Windows, macOS",
    },
    DemoProduct {
        name: "Adobe Photoshop",
        description: "Industry-leading professional image editor",
        price_cents: 23988,
        category: "Design",
        version: "2024",
        compatibility: "Windows, macOS",
    },
    DemoProduct {
        name: "Visual Studio Code",
        description: "Free and powerful source code editor",
        price_cents: 0,
        category: "Development",
        version: "1.85",
        compatibility: "Windows, macOS, Linux",
    },
    DemoProduct {
        name: "Windows 11 Pro",
        description: "Latest Windows operating system for professionals",
        price_cents: 19999,
        category: "Operating System",
        version: "23H2",
        compatibility: "PC compatible",
    },
    DemoProduct {
        name: "AutoCAD 2024",
        description: "Computer-aided design software for architecture and engineering",
        price_cents: 169000,
        category: "Design",
        version: "2024",
        compatibility: "Windows, macOS",
    },
    DemoProduct {
        name: "Minecraft Java Edition",
        description: "Open-world building and adventure game",
        price_cents: 2695,
        category: "Games",
        version: "1.20.4",
        compatibility: "Windows, macOS, Linux",
    },
    DemoProduct {
        name: "Norton 360 Deluxe",
        description: "Complete antivirus protection for multiple devices",
        price_cents: 4999,
        category: "Security",
        version: "2024",
        compatibility: "Windows, macOS, Android, iOS",
    },
    DemoProduct {
        name: "Zoom Pro",
        description: "Professional video conferencing platform",
        price_cents: 14990,
        category: "Communication",
        version: "5.17",
        compatibility: "Windows, macOS, Linux, mobile",
    },
    DemoProduct {
        name: "Adobe Creative Suite",
        description: "Full collection of Adobe creative tools",
        price_cents: 59988,
        category: "Design",
        version: "2024",
        compatibility: "Windows, macOS",
    },
    DemoProduct {
        name: "IntelliJ IDEA Ultimate",
        description: "Advanced IDE for Java and other languages",
        price_cents: 49900,
        category: "Development",
        version: "2023.3",
        compatibility: "Windows, macOS, Linux",
    },
    DemoProduct {
        name: "Spotify Premium",
        description: "Ad-free music streaming",
        price_cents: 999,
        category: "Entertainment",
        version: "Subscription",
        compatibility: "Cross-platform",
    },
    DemoProduct {
        name: "VMware Workstation Pro",
        description: "Virtualization software for running multiple operating systems",
        price_cents: 24999,
        category: "Utilities",
        version: "17.0",
        compatibility: "Windows, Linux",
    },
];

const SELECT_PRODUCT: &str = r#"
    SELECT id, name, description, price_cents, category, version, compatibility, image_url,
           created_at, updated_at
    FROM products
"#;

/// Product catalog stored in the `products` table.
#[derive(Clone)]
pub struct SqliteProductCatalog {
    pool: SqlitePool,
}

impl SqliteProductCatalog {
    /// Creates a catalog over an already migrated pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Inserts a product and returns it with the id assigned by SQLite.
    ///
    /// The id on the passed product is ignored.
    pub async fn insert(&self, product: Product) -> Result<Product> {
        if product.price.is_negative() {
            return Err(StoreError::InvalidRow(format!(
                "negative price {} for {}",
                product.price, product.name
            )));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO products (name, description, price_cents, category, version,
                                  compatibility, image_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.cents())
        .bind(&product.category)
        .bind(&product.version)
        .bind(&product.compatibility)
        .bind(&product.image_url)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(Product {
            id: ProductId::new(id),
            ..product
        })
    }

    /// Changes the price of a product. Returns false if it does not exist.
    pub async fn set_price(&self, product_id: ProductId, price: Money) -> Result<bool> {
        let result =
            sqlx::query("UPDATE products SET price_cents = ?, updated_at = ? WHERE id = ?")
                .bind(price.cents())
                .bind(Utc::now())
                .bind(product_id.get())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes a product. Cart lines referencing it go with it.
    pub async fn delete(&self, product_id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(product_id.get())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns the number of products in the catalog.
    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Loads a product by id.
    pub async fn get(&self, product_id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(&format!("{SELECT_PRODUCT} WHERE id = ?"))
            .bind(product_id.get())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    /// Fills an empty catalog with the demo software products.
    ///
    /// Returns the number of products inserted; 0 if the catalog already had
    /// rows.
    pub async fn seed_demo_products(&self) -> Result<usize> {
        if self.count().await? > 0 {
            tracing::debug!("catalog already populated, skipping demo seed");
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        for demo in DEMO_PRODUCTS {
            sqlx::query(
                r#"
                INSERT INTO products (name, description, price_cents, category, version,
                                      compatibility, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(demo.name)
            .bind(demo.description)
            .bind(demo.price_cents)
            .bind(demo.category)
            .bind(demo.version)
            .bind(demo.compatibility)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::info!(count = DEMO_PRODUCTS.len(), "seeded demo products");
        Ok(DEMO_PRODUCTS.len())
    }

    fn row_to_product(row: &SqliteRow) -> Result<Product> {
        let price_cents: i64 = row.try_get("price_cents")?;
        if price_cents < 0 {
            return Err(StoreError::InvalidRow(format!(
                "negative price_cents {price_cents}"
            )));
        }

        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: Money::from_cents(price_cents),
            category: row.try_get("category")?,
            version: row.try_get("version")?,
            compatibility: row.try_get("compatibility")?,
            image_url: row.try_get("image_url")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl ProductLookup for SqliteProductCatalog {
    async fn find_by_id(
        &self,
        product_id: ProductId,
    ) -> std::result::Result<Option<Product>, RepositoryError> {
        Ok(self.get(product_id).await?)
    }
}
