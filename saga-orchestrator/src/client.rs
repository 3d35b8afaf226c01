//! Outbound HTTP calls to the order and inventory authorities (§4.4, §6).

use serde_json::json;
use std::time::Duration;

/// How a forward step failed, distinguished by HTTP status class (§4.4).
#[derive(Debug, Clone)]
pub enum StepError {
    /// A 4xx response — a business rejection (e.g. insufficient stock).
    Business(String),
    /// A timeout, network error, or non-2xx/non-4xx response (`TRANSPORT_ERROR`, §7).
    Transport(String),
}

impl StepError {
    /// A short human-readable description for the saga log.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Business(m) | Self::Transport(m) => m,
        }
    }
}

/// Outbound request timeout for every saga step (§5: 30 seconds).
pub const STEP_TIMEOUT: Duration = Duration::from_secs(30);

async fn classify(response: reqwest::Result<reqwest::Response>) -> Result<serde_json::Value, StepError> {
    let response = match response {
        Ok(r) => r,
        Err(e) if e.is_timeout() => return Err(StepError::Transport(format!("request timed out: {e}"))),
        Err(e) => return Err(StepError::Transport(format!("request failed: {e}"))),
    };

    let status = response.status();
    if status.is_success() {
        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| StepError::Transport(format!("malformed response body: {e}")))
    } else if status.is_client_error() {
        let detail = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("detail").or_else(|| v.get("message")).cloned())
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {status}"));
        Err(StepError::Business(detail))
    } else {
        Err(StepError::Transport(format!("unexpected status {status}")))
    }
}

/// `POST {order_service_url}/commands/orders` (§6).
///
/// # Errors
///
/// Returns [`StepError::Transport`] on network/timeout/5xx failure, or
/// [`StepError::Business`] if the order authority itself rejects the
/// command (it currently never does for creation, but the classification
/// stays uniform with the other two calls).
pub async fn create_order(
    client: &reqwest::Client,
    order_service_url: &str,
    correlation_id: &str,
    order_id: &str,
    customer_name: &str,
    product_id: &str,
    product_name: &str,
    quantity: i64,
    total_price: f64,
) -> Result<serde_json::Value, StepError> {
    let url = format!("{order_service_url}/commands/orders");
    let response = client
        .post(url)
        .timeout(STEP_TIMEOUT)
        .header("X-Correlation-ID", correlation_id)
        .json(&json!({
            "order_id": order_id,
            "customer_name": customer_name,
            "product_id": product_id,
            "product_name": product_name,
            "quantity": quantity,
            "total_price": total_price,
        }))
        .send()
        .await;
    classify(response).await
}

/// `POST {inventory_service_url}/commands/inventory/{product_id}/reserve` (§6).
///
/// # Errors
///
/// Returns [`StepError::Business`] on a 409 insufficient-stock rejection,
/// or [`StepError::Transport`] on any other failure.
pub async fn reserve_inventory(
    client: &reqwest::Client,
    inventory_service_url: &str,
    correlation_id: &str,
    product_id: &str,
    order_id: &str,
    quantity: i64,
) -> Result<serde_json::Value, StepError> {
    let url = format!("{inventory_service_url}/commands/inventory/{product_id}/reserve");
    let response = client
        .post(url)
        .timeout(STEP_TIMEOUT)
        .header("X-Correlation-ID", correlation_id)
        .json(&json!({"order_id": order_id, "quantity": quantity}))
        .send()
        .await;
    classify(response).await
}

/// `POST {order_service_url}/commands/orders/{order_id}/confirm` (§6).
///
/// # Errors
///
/// Returns [`StepError::Transport`] on network/timeout/5xx failure, or
/// [`StepError::Business`] on a 4xx rejection.
pub async fn confirm_order(
    client: &reqwest::Client,
    order_service_url: &str,
    correlation_id: &str,
    order_id: &str,
) -> Result<serde_json::Value, StepError> {
    let url = format!("{order_service_url}/commands/orders/{order_id}/confirm");
    let response = client
        .post(url)
        .timeout(STEP_TIMEOUT)
        .header("X-Correlation-ID", correlation_id)
        .send()
        .await;
    classify(response).await
}

/// `POST {order_service_url}/commands/orders/{order_id}/cancel` (§6) — the
/// compensating action for a failed `ReserveInventory`.
///
/// # Errors
///
/// Returns [`StepError::Transport`] or [`StepError::Business`] the same way
/// the forward calls do. A failed compensation still terminates the saga
/// (§4.4 does not define a compensation-of-a-compensation).
pub async fn cancel_order(
    client: &reqwest::Client,
    order_service_url: &str,
    correlation_id: &str,
    order_id: &str,
    reason: &str,
) -> Result<serde_json::Value, StepError> {
    let url = format!("{order_service_url}/commands/orders/{order_id}/cancel");
    let response = client
        .post(url)
        .timeout(STEP_TIMEOUT)
        .header("X-Correlation-ID", correlation_id)
        .json(&json!({"reason": reason}))
        .send()
        .await;
    classify(response).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_error_message_unwraps_either_variant() {
        assert_eq!(StepError::Business("a".to_string()).message(), "a");
        assert_eq!(StepError::Transport("b".to_string()).message(), "b");
    }
}
