//! Integration tests for the cart coordinator.
//!
//! These run the coordinator against the in-memory adapters and check the
//! cart-wide rules: merging, the quantity cap, one line per product, totals,
//! ownership isolation, and live re-pricing.

use domain::{
    CartItemId, CartService, ErrorKind, InMemoryCartRepository, InMemoryProductCatalog, Money,
    Product, ProductId, UserId,
};

type Service = CartService<InMemoryCartRepository, InMemoryProductCatalog>;

/// Helper to create a service over a small software catalog.
fn create_service() -> (Service, InMemoryProductCatalog) {
    let catalog = InMemoryProductCatalog::with_products([
        Product::new(ProductId::new(1), "Office 365", "Productivity", Money::from_cents(9999)),
        Product::new(ProductId::new(2), "Photoshop", "Design", Money::from_cents(23988)),
        Product::new(ProductId::new(3), "VS Code", "Development", Money::zero()),
        Product::new(ProductId::new(5), "Ten Dollar Tool", "Utilities", Money::from_cents(1000)),
    ]);
    let repository = InMemoryCartRepository::new(catalog.clone());
    (CartService::new(repository, catalog.clone()), catalog)
}

mod scenario {
    use super::*;

    #[tokio::test]
    async fn add_merge_cap_and_remove() {
        let (service, _) = create_service();
        let user = UserId::new(1);
        let product = ProductId::new(5);

        service.add_item(user, product, 2).await.unwrap();
        let cart = service.get_cart(user).await.unwrap().cart;
        assert_eq!(cart.total, 20.0);
        assert_eq!(cart.total_items, 2);

        service.add_item(user, product, 3).await.unwrap();
        let cart = service.get_cart(user).await.unwrap().cart;
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5);
        assert_eq!(cart.total, 50.0);
        assert_eq!(cart.formatted_total, "$50.00");

        let err = service.add_item(user, product, 95).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QuantityExceeded);
        let cart = service.get_cart(user).await.unwrap().cart;
        assert_eq!(cart.items[0].quantity, 5);

        service.remove_item_by_product(user, product).await.unwrap();
        let cart = service.get_cart(user).await.unwrap().cart;
        assert!(cart.is_empty);
        assert_eq!(cart.total, 0.0);
        assert_eq!(cart.formatted_total, "$0.00");
    }
}

mod invariants {
    use super::*;

    #[tokio::test]
    async fn merge_sums_quantities_for_many_pairs() {
        for (q1, q2) in [(1, 1), (1, 98), (49, 50), (33, 33), (98, 1)] {
            let (service, _) = create_service();
            let user = UserId::new(4);

            service.add_item(user, ProductId::new(1), q1).await.unwrap();
            service.add_item(user, ProductId::new(1), q2).await.unwrap();

            let cart = service.get_cart(user).await.unwrap().cart;
            assert_eq!(cart.items.len(), 1);
            assert_eq!(i64::from(cart.items[0].quantity), q1 + q2);
        }
    }

    #[tokio::test]
    async fn stored_quantities_stay_in_range() {
        let (service, _) = create_service();
        let user = UserId::new(1);
        let added = service.add_item(user, ProductId::new(2), 99).await.unwrap();
        let item_id = added.item.id.unwrap();

        assert!(service.add_item(user, ProductId::new(2), 1).await.is_err());
        assert!(service.update_item_quantity(user, item_id, 0).await.is_err());
        assert!(service.update_item_quantity(user, item_id, 100).await.is_err());

        let cart = service.get_cart(user).await.unwrap().cart;
        assert_eq!(cart.items[0].quantity, 99);
    }

    #[tokio::test]
    async fn one_line_per_product() {
        let (service, _) = create_service();
        let user = UserId::new(1);

        for product in [1, 2, 1, 3, 2, 1] {
            service
                .add_item(user, ProductId::new(product), 1)
                .await
                .unwrap();
        }

        let cart = service.get_cart(user).await.unwrap().cart;
        let mut ids: Vec<i64> = cart.items.iter().map(|i| i.product_id.get()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(cart.total_items, 6);
    }

    #[tokio::test]
    async fn totals_match_line_sums() {
        let (service, _) = create_service();
        let user = UserId::new(1);
        service.add_item(user, ProductId::new(1), 2).await.unwrap();
        service.add_item(user, ProductId::new(2), 1).await.unwrap();
        service.add_item(user, ProductId::new(3), 4).await.unwrap();

        let cart = service.get_cart(user).await.unwrap().cart;
        let expected: f64 = cart
            .items
            .iter()
            .map(|i| i.product.price * f64::from(i.quantity))
            .sum();
        assert!((cart.total - expected).abs() < 1e-9);
        assert_eq!(cart.formatted_total, "$439.86");
        assert_eq!(cart.total_items, 7);

        let count = service.get_total_items(user).await.unwrap();
        assert_eq!(count.total_items, 7);
    }

    #[tokio::test]
    async fn carts_are_isolated_between_users() {
        let (service, _) = create_service();
        service
            .add_item(UserId::new(1), ProductId::new(1), 2)
            .await
            .unwrap();
        service
            .add_item(UserId::new(2), ProductId::new(1), 7)
            .await
            .unwrap();

        let first = service.get_cart(UserId::new(1)).await.unwrap().cart;
        let second = service.get_cart(UserId::new(2)).await.unwrap().cart;
        assert_eq!(first.items[0].quantity, 2);
        assert_eq!(second.items[0].quantity, 7);

        service.clear_cart(UserId::new(1)).await.unwrap();
        let second = service.get_cart(UserId::new(2)).await.unwrap().cart;
        assert_eq!(second.total_items, 7);
    }
}

mod ownership {
    use super::*;

    #[tokio::test]
    async fn foreign_item_cannot_be_updated_or_removed() {
        let (service, _) = create_service();
        let owner = UserId::new(1);
        let intruder = UserId::new(2);
        let added = service.add_item(owner, ProductId::new(1), 3).await.unwrap();
        let item_id = added.item.id.unwrap();

        let err = service
            .update_item_quantity(intruder, item_id, 10)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = service.remove_item(intruder, item_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let cart = service.get_cart(owner).await.unwrap().cart;
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let (service, _) = create_service();
        let err = service
            .remove_item(UserId::new(1), CartItemId::new(12345))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ItemNotFound);
    }
}

mod clearing {
    use super::*;

    #[tokio::test]
    async fn clear_is_idempotent() {
        let (service, _) = create_service();
        let user = UserId::new(1);

        service.clear_cart(user).await.unwrap();
        service.add_item(user, ProductId::new(1), 1).await.unwrap();
        service.clear_cart(user).await.unwrap();
        service.clear_cart(user).await.unwrap();

        let summary = service.get_cart(user).await.unwrap();
        assert!(summary.cart.is_empty);
        assert_eq!(summary.message, "Cart is empty");
    }
}

mod pricing {
    use super::*;

    #[tokio::test]
    async fn cart_total_follows_current_catalog_price() {
        let (service, catalog) = create_service();
        let user = UserId::new(1);
        service.add_item(user, ProductId::new(5), 3).await.unwrap();

        assert!(catalog.set_price(ProductId::new(5), Money::from_cents(1250)));

        let cart = service.get_cart(user).await.unwrap().cart;
        assert_eq!(cart.items[0].product.price, 12.5);
        assert_eq!(cart.total, 37.5);
        assert_eq!(cart.formatted_total, "$37.50");
    }

    #[tokio::test]
    async fn free_products_are_flagged() {
        let (service, _) = create_service();
        let result = service
            .add_item(UserId::new(1), ProductId::new(3), 1)
            .await
            .unwrap();

        assert!(result.item.product.is_free);
        assert_eq!(result.item.formatted_subtotal, "$0.00");
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn repository_failure_surfaces_as_persistence() {
        let (service, _) = create_service();
        service.repository().set_fail_on_next_call(true);

        let err = service
            .add_item(UserId::new(1), ProductId::new(1), 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert_eq!(service.repository().item_count().await, 0);
    }

    #[tokio::test]
    async fn catalog_failure_surfaces_as_dependency() {
        let (service, catalog) = create_service();
        catalog.set_fail_on_next_call(true);

        let err = service
            .add_item(UserId::new(1), ProductId::new(1), 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DependencyFailure);
    }
}
