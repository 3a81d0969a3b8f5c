//! Integration tests for the in-memory stores using the storage test harness.
//!
//! This file invokes `store_contract_tests!` to validate that the in-memory
//! product and cart stores conform to the store contract.

#[macro_use]
mod storage_harness;

use storage_harness::*;

store_contract_tests!(StoreFixture::in_memory());
