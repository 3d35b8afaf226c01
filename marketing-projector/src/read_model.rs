//! Marketing read-model queries (§4.5, §6) — this projector's only
//! externally observable surface, since it takes no commands.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

/// One row of `customer_summary`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerSummaryView {
    /// The customer this row summarizes.
    pub customer_name: String,
    /// Orders placed, confirmed or not.
    pub total_orders: i64,
    /// Orders that reached `CONFIRMED`.
    pub confirmed_orders: i64,
    /// Orders that reached `CANCELLED`.
    pub cancelled_orders: i64,
    /// Sum of `total_price` across every order, confirmed or not.
    pub total_revenue: f64,
    /// `total_revenue / total_orders`.
    pub avg_order_value: f64,
    /// When this customer's first order was created.
    pub first_order_at: Option<DateTime<Utc>>,
    /// When this customer's most recent order was created.
    pub last_order_at: Option<DateTime<Utc>>,
}

/// One row of `product_popularity`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductPopularityView {
    /// The product this row summarizes.
    pub product_id: String,
    /// The product's display name as of its most recent order.
    pub product_name: String,
    /// Units ordered, confirmed or not.
    pub total_units_ordered: i64,
    /// Units on orders that reached `CONFIRMED`.
    pub confirmed_units: i64,
    /// Orders placed for this product, confirmed or not.
    pub total_order_count: i64,
    /// Orders for this product that reached `CONFIRMED`.
    pub confirmed_order_count: i64,
    /// Sum of `total_price` across every order for this product.
    pub total_revenue: f64,
    /// Distinct customers who have ordered this product.
    pub unique_customers: i64,
}

/// One row of `daily_sales_summary`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailySalesView {
    /// The UTC calendar date this row summarizes.
    pub sale_date: NaiveDate,
    /// Orders created on this date.
    pub total_orders: i64,
    /// Orders created on this date that reached `CONFIRMED`.
    pub confirmed_orders: i64,
    /// Orders created on this date that reached `CANCELLED`.
    pub cancelled_orders: i64,
    /// Sum of `total_price` for orders created on this date.
    pub total_revenue: f64,
    /// `total_revenue / total_orders` for this date.
    pub avg_order_value: f64,
}

/// The dashboard summary block inside [`MarketingOverview`].
#[derive(Debug, Clone, Serialize)]
pub struct OverviewSummary {
    /// Total revenue across every customer.
    pub total_revenue: f64,
    /// Distinct customers who have ordered.
    pub total_customers: i64,
    /// Distinct products that have been ordered.
    pub total_product_types: i64,
}

/// `GET /queries/marketing/overview`'s combined response (§4.5).
#[derive(Debug, Clone, Serialize)]
pub struct MarketingOverview {
    /// Aggregate totals across the whole read model.
    pub summary: OverviewSummary,
    /// Top 5 customers by revenue.
    pub top_customers: Vec<CustomerSummaryView>,
    /// Top 5 products by revenue.
    pub top_products: Vec<ProductPopularityView>,
    /// The most recent 7 days of `daily_sales_summary`.
    pub recent_daily_sales: Vec<DailySalesView>,
}

/// `GET /queries/marketing/customers` — every customer, by revenue.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on a storage failure.
pub async fn list_customers(pool: &PgPool) -> Result<Vec<CustomerSummaryView>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM customer_summary ORDER BY total_revenue DESC")
        .fetch_all(pool)
        .await
}

/// `GET /queries/marketing/customers/{customer_name}`.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on a storage failure.
pub async fn get_customer(pool: &PgPool, customer_name: &str) -> Result<Option<CustomerSummaryView>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM customer_summary WHERE customer_name = $1")
        .bind(customer_name)
        .fetch_optional(pool)
        .await
}

/// `GET /queries/marketing/products` — every product, by revenue.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on a storage failure.
pub async fn list_products(pool: &PgPool) -> Result<Vec<ProductPopularityView>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM product_popularity ORDER BY total_revenue DESC")
        .fetch_all(pool)
        .await
}

/// `GET /queries/marketing/daily` — the most recent 30 days.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on a storage failure.
pub async fn list_daily_sales(pool: &PgPool) -> Result<Vec<DailySalesView>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM daily_sales_summary ORDER BY sale_date DESC LIMIT 30")
        .fetch_all(pool)
        .await
}

/// `GET /queries/marketing/overview` — the combined dashboard response.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on a storage failure.
pub async fn overview(pool: &PgPool) -> Result<MarketingOverview, sqlx::Error> {
    let customers = list_customers(pool).await?;
    let products = list_products(pool).await?;
    let daily = list_daily_sales(pool).await?;

    let total_revenue = customers.iter().map(|c| c.total_revenue).sum();
    let total_customers = i64::try_from(customers.len()).unwrap_or(i64::MAX);
    let total_product_types = i64::try_from(products.len()).unwrap_or(i64::MAX);

    Ok(MarketingOverview {
        summary: OverviewSummary {
            total_revenue,
            total_customers,
            total_product_types,
        },
        top_customers: customers.into_iter().take(5).collect(),
        top_products: products.into_iter().take(5).collect(),
        recent_daily_sales: daily.into_iter().take(7).collect(),
    })
}
