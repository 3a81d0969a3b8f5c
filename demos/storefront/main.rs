//! Storefront demo server
//!
//! This example demonstrates:
//! - Loading configuration from the YAML file named by `STOREFRONT_CONFIG`
//! - Opening the configured storage backend
//! - Seeding a few products when the catalog is empty
//! - Serving the API, the views and the live feed with graceful shutdown
//!
//! ```sh
//! STOREFRONT_CONFIG=demos/storefront/storefront.yaml cargo run --example storefront
//! ```

use storefront::prelude::*;
use storefront::server::open_stores;
use tracing_subscriber::EnvFilter;

fn seed_products() -> Vec<ProductDraft> {
    [
        ("Trail Running Shoe", "SH-TRAIL", 89.90, 12, "shoes"),
        ("Road Running Shoe", "SH-ROAD", 74.50, 0, "shoes"),
        ("Wool Beanie", "HT-BEANIE", 19.00, 40, "hats"),
        ("Rain Shell", "JK-RAIN", 129.00, 5, "jackets"),
    ]
    .into_iter()
    .map(|(title, code, price, stock, category)| ProductDraft {
        title: Some(title.to_string()),
        description: Some(format!("{} for everyday use", title)),
        code: Some(code.to_string()),
        price: Some(price),
        stock: Some(stock),
        category: Some(category.to_string()),
        ..Default::default()
    })
    .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ShopConfig::from_env()?;
    let (products, carts) = open_stores(&config.storage).await?;

    if products.all().await?.is_empty() {
        let catalog = CatalogService::new(products.clone(), config.catalog.clone());
        for draft in seed_products() {
            catalog.add(draft).await?;
        }
        tracing::info!("seeded demo catalog");
    }

    let addr = config.server.socket_addr()?;
    println!("🚀 Storefront");
    println!("   Views: http://{}/", addr);
    println!("   API:   http://{}/api/products", addr);
    println!("   Live:  ws://{}/ws\n", addr);

    ServerBuilder::new()
        .with_config(config)
        .with_stores(products, carts)
        .serve()
        .await
}
