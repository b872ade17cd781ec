//! Integration Tests for the Debt Ledger
//!
//! These tests verify cross-entity workflows end to end: the service layer
//! driving aggregates, the storage port, and the summary cache together,
//! over the in-memory store.

use domain_debt::{DebtLedger, DebtError, EntityRef, LineItemOp, OrderStatus, StoreError};
use ledger_kernel::Money;
use test_utils::{free_item, money, CustomerFixtures, MemoryLedgerStore, NewLineItemBuilder};

fn ledger() -> DebtLedger<MemoryLedgerStore> {
    DebtLedger::new(MemoryLedgerStore::new())
}

mod order_lifecycle {
    use super::*;

    /// An order is billed, partially paid, then settled; the status label
    /// and the summaries follow along.
    #[tokio::test]
    async fn test_bill_pay_settle() {
        let ledger = ledger();
        let customer = ledger
            .create_customer(CustomerFixtures::details())
            .await
            .unwrap();

        let order = ledger
            .create_order(
                customer.id,
                vec![free_item("rice 5kg", 2, "10.00"), free_item("oil", 1, "5.00")],
            )
            .await
            .unwrap();
        assert_eq!(order.total(), money("25.00"));
        assert_eq!(order.status, OrderStatus::Pending);

        let order = ledger
            .record_payment(order.id, money("10.00"), None)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.outstanding(), money("15.00"));

        let summary = ledger.account_summary(customer.id).await.unwrap();
        assert_eq!(summary.billed, money("25.00"));
        assert_eq!(summary.pending, money("15.00"));
        assert_eq!(summary.collected, money("10.00"));

        let order = ledger
            .record_payment(order.id, money("15.00"), Some("cash".to_string()))
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.payments.len(), 2);

        let summary = ledger.account_summary(customer.id).await.unwrap();
        assert_eq!(summary.pending, Money::zero());
        assert_eq!(summary.collected, money("25.00"));
    }

    /// A payment larger than the outstanding balance is rejected and
    /// nothing changes.
    #[tokio::test]
    async fn test_overpayment_rejected() {
        let ledger = ledger();
        let customer = ledger
            .create_customer(CustomerFixtures::minimal("walk-in"))
            .await
            .unwrap();
        let order = ledger
            .create_order(customer.id, vec![free_item("bread", 1, "3.00")])
            .await
            .unwrap();

        let err = ledger
            .record_payment(order.id, money("3.01"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DebtError::InvalidPayment(_)));

        let order = ledger.get_order(order.id).await.unwrap();
        assert_eq!(order.amount_paid, Money::zero());
        assert_eq!(order.status, OrderStatus::Pending);
    }

    /// Editing line items below the amount already paid is rejected, and a
    /// failing batch leaves the order untouched.
    #[tokio::test]
    async fn test_edit_floor_and_batch_atomicity() {
        let ledger = ledger();
        let customer = ledger
            .create_customer(CustomerFixtures::minimal("editor"))
            .await
            .unwrap();
        let order = ledger
            .create_order(customer.id, vec![free_item("beans", 4, "5.00")])
            .await
            .unwrap();
        ledger
            .record_payment(order.id, money("15.00"), None)
            .await
            .unwrap();

        let item_id = order.line_items[0].id;
        // Dropping quantity to 2 would put the total (10.00) below the
        // 15.00 already paid.
        let err = ledger
            .edit_line_items(
                order.id,
                vec![
                    LineItemOp::Add {
                        product_id: None,
                        description: "candy".to_string(),
                        quantity: 1,
                        unit_price: money("1.00"),
                    },
                    LineItemOp::Update {
                        item_id,
                        quantity: Some(2),
                        unit_price: None,
                    },
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DebtError::OrderFrozen(_)));

        // The valid Add in the same batch must not have been applied.
        let order = ledger.get_order(order.id).await.unwrap();
        assert_eq!(order.line_items.len(), 1);
        assert_eq!(order.total(), money("20.00"));
    }

    /// Status-filtered listings track reclassification.
    #[tokio::test]
    async fn test_list_orders_by_status() {
        let ledger = ledger();
        let customer = ledger
            .create_customer(CustomerFixtures::minimal("lister"))
            .await
            .unwrap();
        let a = ledger
            .create_order(customer.id, vec![free_item("a", 1, "10.00")])
            .await
            .unwrap();
        ledger
            .create_order(customer.id, vec![free_item("b", 1, "20.00")])
            .await
            .unwrap();

        ledger.record_payment(a.id, money("10.00"), None).await.unwrap();

        let paid = ledger.list_orders(Some(OrderStatus::Paid)).await.unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].id, a.id);
        let pending = ledger.list_orders(Some(OrderStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(ledger.list_orders(None).await.unwrap().len(), 2);
    }

    /// Soft-deleting an order retracts it from summaries but keeps it
    /// fetchable as history.
    #[tokio::test]
    async fn test_soft_delete_order() {
        let ledger = ledger();
        let customer = ledger
            .create_customer(CustomerFixtures::minimal("deleter"))
            .await
            .unwrap();
        let order = ledger
            .create_order(customer.id, vec![free_item("tools", 1, "40.00")])
            .await
            .unwrap();

        ledger.soft_delete(EntityRef::Order(order.id)).await.unwrap();
        // Idempotent.
        ledger.soft_delete(EntityRef::Order(order.id)).await.unwrap();

        let summary = ledger.account_summary(customer.id).await.unwrap();
        assert_eq!(summary.billed, Money::zero());

        let order = ledger.get_order(order.id).await.unwrap();
        assert!(order.state.is_deleted());

        let active = ledger.customer_orders(customer.id, false).await.unwrap();
        assert!(active.is_empty());
        let history = ledger.customer_orders(customer.id, true).await.unwrap();
        assert_eq!(history.len(), 1);

        // Deleted orders reject further mutation.
        let err = ledger
            .record_payment(order.id, money("1.00"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DebtError::OrderDeleted(_)));
    }
}

mod default_workflow {
    use super::*;

    /// Write-off moves the shortfall into the defaulted bucket; reversal
    /// restores classification and payments resume.
    #[tokio::test]
    async fn test_default_and_reversal() {
        let ledger = ledger();
        let customer = ledger
            .create_customer(CustomerFixtures::minimal("risky"))
            .await
            .unwrap();
        let order = ledger
            .create_order(customer.id, vec![free_item("stock", 1, "100.00")])
            .await
            .unwrap();
        ledger
            .record_payment(order.id, money("30.00"), None)
            .await
            .unwrap();

        let order = ledger.mark_defaulted(order.id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Defaulted);

        let summary = ledger.system_summary();
        assert_eq!(summary.defaulted, money("70.00"));
        assert_eq!(summary.pending, Money::zero());
        // Collected excludes defaulted orders.
        assert_eq!(summary.collected, Money::zero());

        // Payments and edits are frozen while written off.
        assert!(matches!(
            ledger.record_payment(order.id, money("10.00"), None).await,
            Err(DebtError::InvalidPayment(_))
        ));
        assert!(matches!(
            ledger
                .edit_line_items(
                    order.id,
                    vec![LineItemOp::Remove {
                        item_id: order.line_items[0].id
                    }]
                )
                .await,
            Err(DebtError::OrderFrozen(_))
        ));

        let order = ledger.reverse_default(order.id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);

        let order = ledger
            .record_payment(order.id, money("70.00"), None)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Paid);

        let summary = ledger.system_summary();
        assert_eq!(summary.defaulted, Money::zero());
        assert_eq!(summary.collected, money("100.00"));
    }
}

mod catalog_workflow {
    use super::*;

    /// Catalog prices are snapshotted into orders; later repricing never
    /// reaches back.
    #[tokio::test]
    async fn test_price_snapshot_isolation() {
        let ledger = ledger();
        let customer = ledger
            .create_customer(CustomerFixtures::minimal("regular"))
            .await
            .unwrap();
        let product = ledger
            .create_product("flour 1kg".to_string(), money("2.50"), None)
            .await
            .unwrap();

        let order = ledger
            .create_order(
                customer.id,
                vec![NewLineItemBuilder::new()
                    .from_product(product.id)
                    .quantity(4)
                    .build()],
            )
            .await
            .unwrap();
        assert_eq!(order.total(), money("10.00"));
        assert_eq!(order.line_items[0].description, "flour 1kg");

        ledger
            .update_product(product.id, money("3.00"), None)
            .await
            .unwrap();

        let order = ledger.get_order(order.id).await.unwrap();
        assert_eq!(order.total(), money("10.00"));

        // New orders see the new price.
        let order2 = ledger
            .create_order(
                customer.id,
                vec![NewLineItemBuilder::new()
                    .from_product(product.id)
                    .quantity(4)
                    .build()],
            )
            .await
            .unwrap();
        assert_eq!(order2.total(), money("12.00"));
    }

    /// Active product names are unique, but a soft-deleted product frees
    /// its name.
    #[tokio::test]
    async fn test_product_name_uniqueness() {
        let ledger = ledger();
        ledger
            .create_product("sugar".to_string(), money("1.80"), None)
            .await
            .unwrap();

        let err = ledger
            .create_product("sugar".to_string(), money("2.00"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DebtError::DuplicateProduct(_)));

        let products = ledger.list_products().await.unwrap();
        ledger
            .soft_delete(EntityRef::Product(products[0].id))
            .await
            .unwrap();

        ledger
            .create_product("sugar".to_string(), money("2.00"), None)
            .await
            .unwrap();
    }

    /// A quote prices items without persisting anything.
    #[tokio::test]
    async fn test_quote_is_stateless() {
        let ledger = ledger();
        let product = ledger
            .create_product("eggs".to_string(), money("0.50"), None)
            .await
            .unwrap();

        let quote = ledger
            .quote(vec![
                NewLineItemBuilder::new()
                    .from_product(product.id)
                    .quantity(12)
                    .build(),
                free_item("delivery", 1, "2.00"),
            ])
            .await
            .unwrap();
        assert_eq!(quote.total, money("8.00"));
        assert_eq!(quote.lines.len(), 2);

        assert_eq!(ledger.system_summary().billed, Money::zero());
    }
}

mod customer_workflow {
    use super::*;

    /// A customer with live orders cannot be deleted; deleting the orders
    /// first unblocks it, and the delete is then idempotent.
    #[tokio::test]
    async fn test_customer_delete_guard() {
        let ledger = ledger();
        let customer = ledger
            .create_customer(CustomerFixtures::details())
            .await
            .unwrap();
        let order = ledger
            .create_order(customer.id, vec![free_item("goods", 1, "9.00")])
            .await
            .unwrap();

        let err = ledger.soft_delete_customer(customer.id).await.unwrap_err();
        assert!(matches!(err, DebtError::AccountHasActiveOrders(_)));

        ledger.soft_delete_order(order.id).await.unwrap();
        ledger.soft_delete_customer(customer.id).await.unwrap();
        ledger.soft_delete_customer(customer.id).await.unwrap();

        assert!(ledger.list_customers().await.unwrap().is_empty());

        // No new orders under a deleted customer.
        let err = ledger
            .create_order(customer.id, vec![free_item("goods", 1, "1.00")])
            .await
            .unwrap_err();
        assert!(matches!(err, DebtError::NotFound(_)));
    }
}

mod summary_reconciliation {
    use super::*;

    /// A fresh ledger over the same store reproduces the incremental
    /// summaries from a full scan.
    #[tokio::test]
    async fn test_reconcile_matches_incremental() {
        let store = MemoryLedgerStore::new();
        let ledger = DebtLedger::new(store.clone());

        let customer = ledger
            .create_customer(CustomerFixtures::minimal("rollup"))
            .await
            .unwrap();
        let a = ledger
            .create_order(customer.id, vec![free_item("a", 1, "50.00")])
            .await
            .unwrap();
        ledger
            .record_payment(a.id, money("20.00"), None)
            .await
            .unwrap();
        let b = ledger
            .create_order(customer.id, vec![free_item("b", 2, "10.00")])
            .await
            .unwrap();
        ledger.mark_defaulted(b.id).await.unwrap();

        let incremental = ledger.system_summary();

        let restarted = DebtLedger::new(store.clone());
        restarted.reconcile().await.unwrap();
        let rebuilt = restarted.system_summary();

        assert_eq!(incremental.billed, rebuilt.billed);
        assert_eq!(incremental.pending, rebuilt.pending);
        assert_eq!(incremental.collected, rebuilt.collected);
        assert_eq!(incremental.defaulted, rebuilt.defaulted);
    }

    /// The store's compare-and-swap surfaces as a typed conflict when a
    /// stale snapshot is written back.
    #[tokio::test]
    async fn test_stale_write_conflicts() {
        use domain_debt::LedgerStore;

        let store = MemoryLedgerStore::new();
        let ledger = DebtLedger::new(store.clone());

        let customer = ledger
            .create_customer(CustomerFixtures::minimal("racer"))
            .await
            .unwrap();
        let order = ledger
            .create_order(customer.id, vec![free_item("c", 1, "10.00")])
            .await
            .unwrap();

        // Take a snapshot, then let the service win a write.
        let stale = store.fetch_order(order.id).await.unwrap().unwrap();
        ledger
            .record_payment(order.id, money("5.00"), None)
            .await
            .unwrap();

        let err = store.update_order(&stale).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }
}
