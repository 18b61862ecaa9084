//! Shopfront admin demo.
//!
//! Drives one order editing session through a [`Store`]: a product priced 10.00
//! is selected on a fresh line, the quantity goes to 3, a second line stays
//! empty, and the order is submitted twice (first incomplete, then valid).
//! Moving it to processing and submitting again updates the stored order.
//!
//! Configuration comes from `SHOPFRONT_*` environment variables, see
//! [`AdminConfig`].

use anyhow::Context;
use shopfront_admin::order::{
    OrderDraft, OrderFormAction, OrderFormEnvironment, OrderFormReducer, OrderStatus,
    OrderSubmission, OrderSummary, RandomOrderNumbers, count_with_status,
};
use shopfront_admin::{
    AdminConfig, CustomerId, InMemoryCatalog, InMemoryRecords, LineId, Money, ProductId,
};
use shopfront_runtime::Store;
use shopfront_runtime::metrics::MetricsServer;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AdminConfig::from_env();

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(?config, "Starting shopfront admin");

    let _metrics = match config.metrics_addr {
        Some(addr) => {
            let mut server = MetricsServer::new(addr);
            server.start().context("starting metrics recorder")?;
            Some(server)
        },
        None => None,
    };

    let catalog = InMemoryCatalog::new()
        .with_product(ProductId::new(1), "Pour-over Kettle", Money::from_major(10))
        .with_product(ProductId::new(2), "Paper Filters", Money::from_cents(450));
    let orders = Arc::new(InMemoryRecords::<OrderSubmission>::new());
    let env = OrderFormEnvironment::new(
        Arc::new(catalog),
        Arc::new(RandomOrderNumbers::new(config.order_prefix.clone())),
        orders.clone(),
    );
    let store = Store::new(OrderDraft::new(), OrderFormReducer::new(), env);

    let priced = LineId::new();
    let empty = LineId::new();
    for action in [
        OrderFormAction::OpenDraft,
        OrderFormAction::AddLine { line_id: priced },
        OrderFormAction::SelectProduct {
            line_id: priced,
            product_id: Some(ProductId::new(1)),
        },
        OrderFormAction::ChangeQuantity {
            line_id: priced,
            quantity: Some(3),
        },
        OrderFormAction::AddLine { line_id: empty },
    ] {
        store.send(action).await?;
    }

    let (number, total) = store
        .state(|draft| (draft.number.clone(), draft.total))
        .await;
    tracing::info!(?number, %total, "Draft priced");

    // Incomplete: no customer, no shipping price, second line has no product
    store.send(OrderFormAction::Submit).await?;
    let errors = store.state(|draft| draft.errors.messages()).await;
    tracing::info!(?errors, "First submit rejected");

    store
        .send(OrderFormAction::RemoveLine { line_id: empty })
        .await?;
    store
        .send(OrderFormAction::SetCustomer {
            customer_id: Some(CustomerId::new(42)),
        })
        .await?;
    store
        .send(OrderFormAction::SetShippingPrice {
            shipping_price: Some(Money::from_cents(595)),
        })
        .await?;

    let mut handle = store.send(OrderFormAction::Submit).await?;
    handle
        .wait_with_timeout(config.save_timeout())
        .await
        .context("waiting for the order to be saved")?;

    let (saved, dirty) = store.state(|draft| (draft.saved, draft.is_dirty())).await;
    tracing::info!(?saved, dirty, "Second submit finished");

    // Resubmitting updates the stored order instead of adding a second one
    store
        .send(OrderFormAction::SetStatus {
            status: Some(OrderStatus::Processing),
        })
        .await?;
    let mut handle = store.send(OrderFormAction::Submit).await?;
    handle
        .wait_with_timeout(config.save_timeout())
        .await
        .context("waiting for the order to be updated")?;

    let stored = orders.all();
    for submission in &stored {
        println!("{}", serde_json::to_string_pretty(submission)?);
    }

    let summary = OrderSummary::of(&stored);
    let processing = count_with_status(&stored, OrderStatus::Processing);
    tracing::info!(
        count = summary.count,
        total = %summary.total,
        shipping_price = %summary.shipping_price,
        processing,
        "Stored orders"
    );

    store.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}
