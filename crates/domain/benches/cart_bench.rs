use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    Cart, CartItem, CartService, InMemoryCartRepository, InMemoryProductCatalog, Money, Product,
    ProductId, UserId,
};

fn catalog() -> InMemoryProductCatalog {
    InMemoryProductCatalog::with_products((1..=20).map(|id| {
        Product::new(
            ProductId::new(id),
            format!("Product {id}"),
            "Software",
            Money::from_cents(id * 1000 + 99),
        )
    }))
}

fn bench_cart_totals(c: &mut Criterion) {
    let user_id = UserId::new(1);
    let items = (1..=20).map(|id| {
        let product = Product::new(
            ProductId::new(id),
            format!("Product {id}"),
            "Software",
            Money::from_cents(id * 1000 + 99),
        );
        CartItem::new(user_id, product, 3).unwrap()
    });
    let cart = Cart::from_items(user_id, items).unwrap();

    c.bench_function("cart/total_20_lines", |b| {
        b.iter(|| (cart.total(), cart.total_items()));
    });

    c.bench_function("cart/to_view_20_lines", |b| {
        b.iter(|| cart.to_view());
    });
}

fn bench_add_item(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let catalog = catalog();
    let service = CartService::new(InMemoryCartRepository::new(catalog.clone()), catalog);

    c.bench_function("cart/add_then_clear", |b| {
        b.iter(|| {
            rt.block_on(async {
                let user_id = UserId::new(1);
                service.add_item(user_id, ProductId::new(3), 1).await.unwrap();
                service.clear_cart(user_id).await.unwrap();
            });
        });
    });
}

fn bench_get_cart(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let catalog = catalog();
    let service = CartService::new(InMemoryCartRepository::new(catalog.clone()), catalog);
    let user_id = UserId::new(1);
    rt.block_on(async {
        for id in 1..=20 {
            service.add_item(user_id, ProductId::new(id), 2).await.unwrap();
        }
    });

    c.bench_function("cart/get_cart_20_lines", |b| {
        b.iter(|| {
            rt.block_on(async { service.get_cart(user_id).await.unwrap() });
        });
    });
}

criterion_group!(benches, bench_cart_totals, bench_add_item, bench_get_cart);
criterion_main!(benches);
