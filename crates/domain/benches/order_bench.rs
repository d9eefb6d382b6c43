use chrono::Duration;
use common::{CustomerId, Money};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{CreateOrder, DashboardService, EditOrder, OrderService};
use store::{InMemoryStore, NewCustomer, NewProduct, Product, Store};

fn setup(rt: &tokio::runtime::Runtime) -> (InMemoryStore, CustomerId, Vec<Product>) {
    rt.block_on(async {
        let store = InMemoryStore::new();
        let customer = store
            .insert_customer(NewCustomer {
                name: "Bench".to_string(),
                email: "bench@example.com".to_string(),
                phone: None,
                delivery_address: None,
                password_hash: "unused".to_string(),
            })
            .await
            .unwrap();
        let products = store
            .insert_products(vec![
                NewProduct::new("Widget", "", Money::from_cents(1000)),
                NewProduct::new("Gadget", "", Money::from_cents(2500)),
            ])
            .await
            .unwrap();
        (store, customer.id, products)
    })
}

fn bench_create_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (store, customer, products) = setup(&rt);
    let service = OrderService::new(store, customer);

    c.bench_function("domain/create_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                service
                    .create_order(CreateOrder::new(customer, products[0].id, 2))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_edit_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (store, customer, products) = setup(&rt);
    let service = OrderService::new(store, customer);
    let order_id = rt.block_on(async {
        service
            .create_order(CreateOrder::new(customer, products[0].id, 1))
            .await
            .unwrap()
            .order
            .id
    });

    c.bench_function("domain/edit_order", |b| {
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let product = &products[usize::from(flip)];
            rt.block_on(async {
                service
                    .edit_order(EditOrder::new(order_id, customer, product.id, 3))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_dashboard_summary(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (store, customer, products) = setup(&rt);
    let service = OrderService::new(store.clone(), customer);
    rt.block_on(async {
        for _ in 0..500 {
            service
                .create_order(CreateOrder::new(customer, products[1].id, 1))
                .await
                .unwrap();
        }
    });
    let dashboard = DashboardService::new(store, Duration::days(30));

    c.bench_function("domain/dashboard_summary_500_orders", |b| {
        b.iter(|| rt.block_on(dashboard.summary()));
    });
}

criterion_group!(
    benches,
    bench_create_order,
    bench_edit_order,
    bench_dashboard_summary
);
criterion_main!(benches);
