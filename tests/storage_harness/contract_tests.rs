//! Macro-generated contract suite for [`ProductStore`] and [`CartStore`]
//!
//! # Generated Tests
//!
//! ## Products
//! - insert then get, unknown id, duplicate code on insert
//! - filters: category substring (case-insensitive), status, stock, combined
//! - price sort both ways, pagination totals and out-of-range pages
//! - `get_many`, update (partial, conflict, unknown), delete, `all`
//!
//! ## Carts
//! - insert then get, put over an existing cart, put and get on unknown ids

/// Generate the store contract suite
///
/// `$fixture` must evaluate to a [`StoreFixture`]; it is re-evaluated for
/// every test so each one starts from empty stores.
#[macro_export]
macro_rules! store_contract_tests {
    ($fixture:expr) => {
        mod store_contract_tests {
            use super::*;
            use std::collections::HashSet;
            use storefront::core::{
                CatalogFilter, PageRequest, ProductPatch, SortField, StockFilter, StoreError,
                StoreSort,
            };
            use uuid::Uuid;

            // ==================================================================
            // Products: CRUD
            // ==================================================================

            #[tokio::test]
            async fn test_insert_and_get() {
                let fx = $fixture;
                let p = product("SKU-1", "shoes", 49.9, 4, 1);
                let id = p.id;

                let inserted = fx.products.insert(p).await.unwrap();
                assert_eq!(inserted.id, id);

                let fetched = fx.products.get(&id).await.unwrap().unwrap();
                assert_eq!(fetched.code, "SKU-1");
                assert_eq!(fetched.category, "shoes");
                assert_eq!(fetched.stock, 4);
                assert!((fetched.price - 49.9).abs() < f64::EPSILON);
                assert!(fetched.status);
            }

            #[tokio::test]
            async fn test_get_unknown_is_none() {
                let fx = $fixture;
                assert!(fx.products.get(&Uuid::new_v4()).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_insert_duplicate_code_conflicts() {
                let fx = $fixture;
                fx.products
                    .insert(product("DUP", "hats", 10.0, 1, 1))
                    .await
                    .unwrap();

                let err = fx
                    .products
                    .insert(product("DUP", "bags", 20.0, 1, 2))
                    .await
                    .unwrap_err();
                match err {
                    StoreError::Conflict { field, value } => {
                        assert_eq!(field, "code");
                        assert_eq!(value, "DUP");
                    }
                    other => panic!("expected conflict, got {:?}", other),
                }
                assert_eq!(fx.products.all().await.unwrap().len(), 1);
            }

            #[tokio::test]
            async fn test_update_partial() {
                let fx = $fixture;
                let p = fx
                    .products
                    .insert(product("UPD", "hats", 10.0, 1, 1))
                    .await
                    .unwrap();

                let patch = ProductPatch {
                    price: Some(12.5),
                    stock: Some(0),
                    ..Default::default()
                };
                let updated = fx.products.update(&p.id, patch).await.unwrap().unwrap();
                assert_eq!(updated.code, "UPD");
                assert_eq!(updated.stock, 0);
                assert!((updated.price - 12.5).abs() < f64::EPSILON);

                let fetched = fx.products.get(&p.id).await.unwrap().unwrap();
                assert_eq!(fetched.stock, 0);
                assert_eq!(fetched.title, p.title);
            }

            #[tokio::test]
            async fn test_update_to_taken_code_conflicts() {
                let fx = $fixture;
                fx.products
                    .insert(product("A", "hats", 10.0, 1, 1))
                    .await
                    .unwrap();
                let b = fx
                    .products
                    .insert(product("B", "hats", 10.0, 1, 2))
                    .await
                    .unwrap();

                let patch = ProductPatch {
                    code: Some("A".to_string()),
                    ..Default::default()
                };
                let err = fx.products.update(&b.id, patch).await.unwrap_err();
                assert!(matches!(err, StoreError::Conflict { .. }));

                let unchanged = fx.products.get(&b.id).await.unwrap().unwrap();
                assert_eq!(unchanged.code, "B");
            }

            #[tokio::test]
            async fn test_update_keeping_own_code_is_allowed() {
                let fx = $fixture;
                let a = fx
                    .products
                    .insert(product("SAME", "hats", 10.0, 1, 1))
                    .await
                    .unwrap();

                let patch = ProductPatch {
                    code: Some("SAME".to_string()),
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                };
                let updated = fx.products.update(&a.id, patch).await.unwrap().unwrap();
                assert_eq!(updated.title, "Renamed");
            }

            #[tokio::test]
            async fn test_update_unknown_is_none() {
                let fx = $fixture;
                let result = fx
                    .products
                    .update(&Uuid::new_v4(), ProductPatch::default())
                    .await
                    .unwrap();
                assert!(result.is_none());
            }

            #[tokio::test]
            async fn test_update_unknown_with_taken_code_is_none() {
                let fx = $fixture;
                fx.products
                    .insert(product("TAKEN", "hats", 10.0, 1, 1))
                    .await
                    .unwrap();

                let patch = ProductPatch {
                    code: Some("TAKEN".to_string()),
                    ..Default::default()
                };
                let result = fx.products.update(&Uuid::new_v4(), patch).await.unwrap();
                assert!(result.is_none());
            }

            #[tokio::test]
            async fn test_delete() {
                let fx = $fixture;
                let p = fx
                    .products
                    .insert(product("DEL", "hats", 10.0, 1, 1))
                    .await
                    .unwrap();

                assert!(fx.products.delete(&p.id).await.unwrap());
                assert!(fx.products.get(&p.id).await.unwrap().is_none());
                assert!(!fx.products.delete(&p.id).await.unwrap());
            }

            #[tokio::test]
            async fn test_all_in_insertion_order() {
                let fx = $fixture;
                seed(fx.products.as_ref(), sample_catalog()).await;

                let all = fx.products.all().await.unwrap();
                assert_codes(&all, &["S1", "S2", "S3", "H1", "H2", "B1"]);
            }

            #[tokio::test]
            async fn test_get_many_omits_unknown_ids() {
                let fx = $fixture;
                let seeded = seed(fx.products.as_ref(), sample_catalog()).await;

                let ids = vec![seeded[0].id, Uuid::new_v4(), seeded[3].id];
                let found = fx.products.get_many(&ids).await.unwrap();

                let found: HashSet<&str> = found.iter().map(|p| p.code.as_str()).collect();
                assert_eq!(found, HashSet::from(["S1", "H1"]));
            }

            // ==================================================================
            // Products: query
            // ==================================================================

            #[tokio::test]
            async fn test_query_without_filter_returns_everything() {
                let fx = $fixture;
                seed(fx.products.as_ref(), sample_catalog()).await;

                let page = fx
                    .products
                    .query(&CatalogFilter::new(), &PageRequest::new(1, 10))
                    .await
                    .unwrap();
                assert_eq!(page.total, 6);
                assert_codes(&page.items, &["S1", "S2", "S3", "H1", "H2", "B1"]);
            }

            #[tokio::test]
            async fn test_query_category_is_case_insensitive_substring() {
                let fx = $fixture;
                seed(fx.products.as_ref(), sample_catalog()).await;

                let filter = CatalogFilter::new().with_category("SHOES");
                let page = fx
                    .products
                    .query(&filter, &PageRequest::new(1, 10))
                    .await
                    .unwrap();
                assert_eq!(page.total, 3);
                assert_codes(&page.items, &["S1", "S2", "S3"]);
            }

            #[tokio::test]
            async fn test_query_category_is_literal() {
                let fx = $fixture;
                seed(fx.products.as_ref(), sample_catalog()).await;

                let filter = CatalogFilter::new().with_category(".*");
                let page = fx
                    .products
                    .query(&filter, &PageRequest::new(1, 10))
                    .await
                    .unwrap();
                assert_eq!(page.total, 0);
                assert!(page.items.is_empty());
            }

            #[tokio::test]
            async fn test_query_status() {
                let fx = $fixture;
                seed(fx.products.as_ref(), sample_catalog()).await;

                let filter = CatalogFilter::new().with_status(false);
                let page = fx
                    .products
                    .query(&filter, &PageRequest::new(1, 10))
                    .await
                    .unwrap();
                assert_codes(&page.items, &["S3", "B1"]);
            }

            #[tokio::test]
            async fn test_query_stock() {
                let fx = $fixture;
                seed(fx.products.as_ref(), sample_catalog()).await;

                let available = fx
                    .products
                    .query(
                        &CatalogFilter::new().with_stock(StockFilter::Available),
                        &PageRequest::new(1, 10),
                    )
                    .await
                    .unwrap();
                assert_codes(&available.items, &["S1", "S3", "H2", "B1"]);

                let unavailable = fx
                    .products
                    .query(
                        &CatalogFilter::new().with_stock(StockFilter::Unavailable),
                        &PageRequest::new(1, 10),
                    )
                    .await
                    .unwrap();
                assert_codes(&unavailable.items, &["S2", "H1"]);
            }

            #[tokio::test]
            async fn test_query_combined_filters_are_anded() {
                let fx = $fixture;
                seed(fx.products.as_ref(), sample_catalog()).await;

                let filter = CatalogFilter::new()
                    .with_category("shoes")
                    .with_status(true)
                    .with_stock(StockFilter::Available);
                let page = fx
                    .products
                    .query(&filter, &PageRequest::new(1, 10))
                    .await
                    .unwrap();
                assert_eq!(page.total, 1);
                assert_codes(&page.items, &["S1"]);
            }

            #[tokio::test]
            async fn test_query_sorted_by_price() {
                let fx = $fixture;
                seed(fx.products.as_ref(), sample_catalog()).await;

                let asc = fx
                    .products
                    .query(
                        &CatalogFilter::new(),
                        &PageRequest::new(1, 10).sorted(StoreSort::asc(SortField::Price)),
                    )
                    .await
                    .unwrap();
                assert_codes(&asc.items, &["H1", "S2", "H2", "S1", "B1", "S3"]);

                let desc = fx
                    .products
                    .query(
                        &CatalogFilter::new(),
                        &PageRequest::new(1, 10).sorted(StoreSort::desc(SortField::Price)),
                    )
                    .await
                    .unwrap();
                assert_codes(&desc.items, &["S3", "B1", "S1", "H2", "S2", "H1"]);
            }

            #[tokio::test]
            async fn test_query_newest_first() {
                let fx = $fixture;
                seed(fx.products.as_ref(), sample_catalog()).await;

                let page = fx
                    .products
                    .query(
                        &CatalogFilter::new(),
                        &PageRequest::new(1, 2).sorted(StoreSort::desc(SortField::CreatedAt)),
                    )
                    .await
                    .unwrap();
                assert_codes(&page.items, &["B1", "H2"]);
            }

            #[tokio::test]
            async fn test_query_pagination() {
                let fx = $fixture;
                seed(fx.products.as_ref(), sample_catalog()).await;

                let second = fx
                    .products
                    .query(&CatalogFilter::new(), &PageRequest::new(2, 4))
                    .await
                    .unwrap();
                assert_eq!(second.total, 6);
                assert_codes(&second.items, &["H2", "B1"]);

                let beyond = fx
                    .products
                    .query(&CatalogFilter::new(), &PageRequest::new(5, 4))
                    .await
                    .unwrap();
                assert_eq!(beyond.total, 6);
                assert!(beyond.items.is_empty());
            }

            #[tokio::test]
            async fn test_query_filtered_pagination_counts_matches_only() {
                let fx = $fixture;
                seed(fx.products.as_ref(), sample_catalog()).await;

                let page = fx
                    .products
                    .query(
                        &CatalogFilter::new().with_category("shoes"),
                        &PageRequest::new(2, 2).sorted(StoreSort::asc(SortField::Price)),
                    )
                    .await
                    .unwrap();
                assert_eq!(page.total, 3);
                assert_codes(&page.items, &["S3"]);
            }

            // ==================================================================
            // Carts
            // ==================================================================

            #[tokio::test]
            async fn test_cart_insert_and_get() {
                let fx = $fixture;
                let product_id = Uuid::new_v4();
                let cart = cart_with(&[(product_id, 2)]);
                let id = cart.id;

                fx.carts.insert(cart).await.unwrap();
                let fetched = fx.carts.get(&id).await.unwrap().unwrap();
                assert_eq!(fetched.products.len(), 1);
                assert_eq!(fetched.products[0].product, product_id);
                assert_eq!(fetched.products[0].quantity, 2);
            }

            #[tokio::test]
            async fn test_cart_put_overwrites() {
                let fx = $fixture;
                let mut cart = fx.carts.insert(cart_with(&[])).await.unwrap();

                let a = Uuid::new_v4();
                let b = Uuid::new_v4();
                cart.add(a, 1);
                cart.add(b, 3);
                cart.add(a, 1);

                let saved = fx.carts.put(cart.clone()).await.unwrap().unwrap();
                assert_eq!(saved.products.len(), 2);

                let fetched = fx.carts.get(&cart.id).await.unwrap().unwrap();
                assert_eq!(fetched.line(&a).map(|l| l.quantity), Some(2));
                assert_eq!(fetched.line(&b).map(|l| l.quantity), Some(3));
            }

            #[tokio::test]
            async fn test_cart_unknown_ids() {
                let fx = $fixture;
                assert!(fx.carts.get(&Uuid::new_v4()).await.unwrap().is_none());
                assert!(fx.carts.put(cart_with(&[])).await.unwrap().is_none());
            }
        }
    };
}
