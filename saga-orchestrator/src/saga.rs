//! The `execute` workflow (§4.4): `CreateOrder` -> `ReserveInventory` ->
//! `ConfirmOrder`, compensating with `CancelOrder` when reservation fails.

use crate::client::{self, StepError};
use crate::domain::{SagaOutcome, SagaStep, TerminalEvent};
use order_saga_core::event_bus::{event_envelope, EventBus};
use order_saga_core::Clock;

/// Base URLs of the two authorities the saga calls (§6, §10).
#[derive(Debug, Clone)]
pub struct SagaConfig {
    /// Base URL of the order authority, e.g. `http://localhost:3001`.
    pub order_service_url: String,
    /// Base URL of the inventory authority, e.g. `http://localhost:3002`.
    pub inventory_service_url: String,
}

/// Everything one `execute` call needs about the order being placed.
#[derive(Debug, Clone)]
pub struct PlaceOrderRequest {
    /// Caller-supplied order identifier.
    pub order_id: String,
    /// Customer placing the order.
    pub customer_name: String,
    /// Product being ordered.
    pub product_id: String,
    /// Human-readable product name, persisted alongside the order.
    pub product_name: String,
    /// Units requested.
    pub quantity: i64,
    /// Total order price.
    pub total_price: f64,
}

/// Runs the three-step saga for one order placement (§4.4).
///
/// Always returns a [`SagaOutcome`]; failures are conveyed through
/// `success` and the per-step log, never through a `Result`/panic — the
/// saga never leaves the caller without an answer (§7's propagation rule).
#[allow(clippy::too_many_lines)]
pub async fn execute(
    client: &reqwest::Client,
    config: &SagaConfig,
    bus: &dyn EventBus,
    clock: &dyn Clock,
    correlation_id: &str,
    request: &PlaceOrderRequest,
) -> SagaOutcome {
    let mut log = Vec::with_capacity(3);

    // Step 1: CreateOrder
    let step1 = client::create_order(
        client,
        &config.order_service_url,
        correlation_id,
        &request.order_id,
        &request.customer_name,
        &request.product_id,
        &request.product_name,
        request.quantity,
        request.total_price,
    )
    .await;

    if let Err(e) = step1 {
        log.push(SagaStep::failed(1, "CreateOrder", clock.now(), e.message()));
        publish_terminal(bus, TerminalEvent::SagaFailed, &request.order_id, &log).await;
        return SagaOutcome {
            success: false,
            saga_log: log,
        };
    }
    log.push(SagaStep::completed(1, "CreateOrder", clock.now()));

    // Step 2: ReserveInventory
    let step2 = client::reserve_inventory(
        client,
        &config.inventory_service_url,
        correlation_id,
        &request.product_id,
        &request.order_id,
        request.quantity,
    )
    .await;

    if let Err(e) = step2 {
        log.push(SagaStep::failed(2, "ReserveInventory", clock.now(), e.message()));
        compensate(client, config, bus, clock, correlation_id, &request.order_id, &e, &mut log).await;
        return SagaOutcome {
            success: false,
            saga_log: log,
        };
    }
    log.push(SagaStep::completed(2, "ReserveInventory", clock.now()));

    // Step 3: ConfirmOrder. A failure here still reports success=true (§9,
    // open question preserved): the order is reserved but left unconfirmed.
    let step3 = client::confirm_order(client, &config.order_service_url, correlation_id, &request.order_id).await;

    match step3 {
        Ok(_) => log.push(SagaStep::completed(3, "ConfirmOrder", clock.now())),
        Err(e) => log.push(SagaStep::failed(3, "ConfirmOrder", clock.now(), e.message())),
    }

    publish_terminal(bus, TerminalEvent::SagaCompleted, &request.order_id, &log).await;
    SagaOutcome {
        success: true,
        saga_log: log,
    }
}

/// Runs the step-3' compensation (`CancelOrder`) and appends its outcome to
/// the log. Compensation never issues a `ReleaseInventory` (§4.4: the
/// forward reservation either failed outright or raised an ambiguous
/// error — see the open question recorded in `DESIGN.md`).
async fn compensate(
    client: &reqwest::Client,
    config: &SagaConfig,
    bus: &dyn EventBus,
    clock: &dyn Clock,
    correlation_id: &str,
    order_id: &str,
    cause: &StepError,
    log: &mut Vec<SagaStep>,
) {
    let reason = format!("compensating for failed reservation: {}", cause.message());
    let result = client::cancel_order(client, &config.order_service_url, correlation_id, order_id, &reason).await;

    match result {
        Ok(_) => log.push(SagaStep::completed(3, "CancelOrder (compensation)", clock.now())),
        Err(e) => log.push(SagaStep::failed(3, "CancelOrder (compensation)", clock.now(), e.message())),
    }

    publish_terminal(bus, TerminalEvent::SagaCompensated, order_id, log).await;
}

/// Publishes the one terminal saga event for this execution to the
/// `saga_events` channel, adding `order_id` and `saga_log` at the top level
/// of the envelope (§6). Publish failure is logged and swallowed — the
/// caller already has its answer via the returned [`SagaOutcome`].
async fn publish_terminal(bus: &dyn EventBus, event: TerminalEvent, order_id: &str, log: &[SagaStep]) {
    let mut envelope = event_envelope(event.event_type(), serde_json::json!({}));
    if let Some(obj) = envelope.as_object_mut() {
        obj.insert("order_id".to_string(), serde_json::json!(order_id));
        obj.insert("saga_log".to_string(), serde_json::json!(log));
    }

    if let Err(e) = bus.publish("saga_events", envelope).await {
        tracing::warn!(error = %e, order_id, "failed to publish terminal saga event");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::StepStatus;
    use order_saga_testing::{test_clock, InMemoryEventBus};

    #[tokio::test]
    async fn execute_against_unreachable_services_fails_at_step_one() {
        let client = reqwest::Client::new();
        let config = SagaConfig {
            order_service_url: "http://127.0.0.1:1".to_string(),
            inventory_service_url: "http://127.0.0.1:1".to_string(),
        };
        let bus = InMemoryEventBus::new();
        let clock = test_clock();
        let request = PlaceOrderRequest {
            order_id: "order-1".to_string(),
            customer_name: "Ada".to_string(),
            product_id: "p-1".to_string(),
            product_name: "Widget".to_string(),
            quantity: 1,
            total_price: 9.99,
        };

        let outcome = execute(&client, &config, &bus, &clock, "corr-1", &request).await;

        assert!(!outcome.success);
        assert_eq!(outcome.saga_log.len(), 1);
        assert_eq!(outcome.saga_log[0].status, StepStatus::Failed);
        assert_eq!(outcome.saga_log[0].action, "CreateOrder");
    }
}
