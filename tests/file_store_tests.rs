//! Integration tests for the JSON file stores using the storage test harness.
//!
//! Each test gets its own temporary directory, removed when the fixture drops.

#[macro_use]
mod storage_harness;

use std::sync::Arc;

use storage_harness::*;
use storefront::core::{CartStore, ProductStore};
use storefront::storage::{FileCartStore, FileProductStore};

async fn file_fixture() -> StoreFixture {
    let dir = tempfile::tempdir().unwrap();
    let products = FileProductStore::open(dir.path()).await.unwrap();
    let carts = FileCartStore::open(dir.path()).await.unwrap();
    StoreFixture::new(Arc::new(products), Arc::new(carts)).with_guard(dir)
}

store_contract_tests!(file_fixture().await);

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let products = FileProductStore::open(dir.path()).await.unwrap();
    let carts = FileCartStore::open(dir.path()).await.unwrap();
    let p = products
        .insert(product("KEEP", "hats", 9.5, 2, 1))
        .await
        .unwrap();
    let cart = carts.insert(cart_with(&[(p.id, 2)])).await.unwrap();
    drop(products);
    drop(carts);

    let products = FileProductStore::open(dir.path()).await.unwrap();
    let carts = FileCartStore::open(dir.path()).await.unwrap();
    assert_eq!(products.get(&p.id).await.unwrap().unwrap().code, "KEEP");
    assert_eq!(
        carts.get(&cart.id).await.unwrap().unwrap().products[0].quantity,
        2
    );
}

#[tokio::test]
async fn test_blank_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("products.json"), "  \n")
        .await
        .unwrap();

    let products = FileProductStore::open(dir.path()).await.unwrap();
    assert!(products.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupt_file_is_a_backend_error() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("products.json"), "{not json")
        .await
        .unwrap();

    let products = FileProductStore::open(dir.path()).await.unwrap();
    let err = products.all().await.unwrap_err();
    assert!(matches!(err, storefront::core::StoreError::Backend(_)));
}

#[tokio::test]
async fn test_concurrent_inserts_are_all_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let products = Arc::new(FileProductStore::open(dir.path()).await.unwrap());

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = products.clone();
        handles.push(tokio::spawn(async move {
            store
                .insert(product(&format!("C{}", i), "bulk", 1.0, 1, i))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(products.all().await.unwrap().len(), 20);
}
