//! Order repository: checkout, history and status tracking.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use sqlx::types::Json;

use larder_core::cart::{CartLine, LineItem};
use larder_core::{
    ComboId, CustomerId, OrderId, OrderItemId, OrderStatus, Pricing, ProductId, TrackingStep,
};

use crate::addresses::AddressInput;
use crate::{RepositoryError, to_i32, to_u32};

// =============================================================================
// Models
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub customer_id: CustomerId,
    pub shipping_address: AddressInput,
    /// Sum of list prices.
    pub mrp_total: Decimal,
    pub discount: Decimal,
    /// Amount charged.
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchased line with prices snapshotted at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: Option<ProductId>,
    pub combo_id: Option<ComboId>,
    pub name: String,
    pub unit_list_price: Decimal,
    pub unit_paid_price: Decimal,
    pub quantity: u32,
}

impl OrderItem {
    /// Amount paid for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_paid_price * Decimal::from(self.quantity)
    }
}

/// A recorded status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct TrackingEvent {
    pub status: OrderStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Tracking ladder for an order given its recorded events.
///
/// For cancelled orders the last non-cancelled event decides how far up the
/// ladder the order got.
#[must_use]
pub fn tracking_steps(status: OrderStatus, events: &[TrackingEvent]) -> Vec<TrackingStep> {
    let last_reached = events
        .iter()
        .rev()
        .map(|e| e.status)
        .find(|s| *s != OrderStatus::Cancelled);
    status.tracking_steps(last_reached)
}

/// Order counts and revenue for the back-office dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_orders: i64,
    /// Orders not yet delivered or cancelled.
    pub open_orders: i64,
    /// Sum of non-cancelled order totals.
    pub revenue: Decimal,
    pub orders_by_status: BTreeMap<String, i64>,
}

/// What checkout needs to place an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub shipping_address: AddressInput,
    pub lines: Vec<CartLine>,
}

// =============================================================================
// Checkout planning
// =============================================================================

/// A product row locked for checkout.
#[derive(Debug, Clone, sqlx::FromRow)]
struct LockedProduct {
    id: ProductId,
    name: String,
    price: Decimal,
    offer_price: Option<Decimal>,
    stock: i32,
    is_active: bool,
}

/// A combo and its bundled `(product, quantity)` pairs.
#[derive(Debug, Clone)]
struct LockedCombo {
    name: String,
    price: Decimal,
    is_active: bool,
    components: Vec<(ProductId, u32)>,
}

#[derive(Debug, sqlx::FromRow)]
struct ComboHeadRow {
    id: ComboId,
    name: String,
    price: Decimal,
    is_active: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct ComboComponentRow {
    combo_id: ComboId,
    product_id: ProductId,
    quantity: i32,
}

/// One order line ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedItem {
    item: LineItem,
    name: String,
    unit_list_price: Decimal,
    unit_paid_price: Decimal,
    quantity: u32,
}

/// Everything checkout writes, computed before any write happens.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CheckoutPlan {
    items: Vec<PlannedItem>,
    /// Units to take from each product.
    decrements: BTreeMap<ProductId, u32>,
    mrp_total: Decimal,
    total: Decimal,
}

fn unavailable(name: &str) -> RepositoryError {
    RepositoryError::Conflict(format!("{name} is no longer available"))
}

/// Resolve cart lines against locked rows: snapshot prices and check stock.
fn plan_checkout(
    lines: &[CartLine],
    products: &HashMap<ProductId, LockedProduct>,
    combos: &HashMap<ComboId, LockedCombo>,
) -> Result<CheckoutPlan, RepositoryError> {
    let mut items = Vec::with_capacity(lines.len());
    let mut decrements: BTreeMap<ProductId, u32> = BTreeMap::new();

    let active_product = |id: ProductId| {
        products
            .get(&id)
            .filter(|p| p.is_active)
            .ok_or_else(|| unavailable("an item in your cart"))
    };

    for line in lines {
        match line.item {
            LineItem::Product(id) => {
                let product = active_product(id)?;
                let pricing = Pricing::new(product.price, product.offer_price);
                items.push(PlannedItem {
                    item: line.item,
                    name: product.name.clone(),
                    unit_list_price: pricing.price,
                    unit_paid_price: pricing.effective(),
                    quantity: line.quantity,
                });
                let need = decrements.entry(id).or_default();
                *need = need.saturating_add(line.quantity);
            }
            LineItem::Combo(id) => {
                let combo = combos
                    .get(&id)
                    .filter(|c| c.is_active)
                    .ok_or_else(|| unavailable("a combo in your cart"))?;

                let mut original = Decimal::ZERO;
                for (product_id, per_combo) in &combo.components {
                    let product = active_product(*product_id)
                        .map_err(|_| unavailable(&combo.name))?;
                    original += product.price * Decimal::from(*per_combo);
                    let need = decrements.entry(*product_id).or_default();
                    *need = need.saturating_add(per_combo.saturating_mul(line.quantity));
                }

                let pricing = Pricing::new(original, Some(combo.price));
                items.push(PlannedItem {
                    item: line.item,
                    name: combo.name.clone(),
                    unit_list_price: pricing.price,
                    unit_paid_price: pricing.effective(),
                    quantity: line.quantity,
                });
            }
        }
    }

    for (product_id, need) in &decrements {
        let product = active_product(*product_id)?;
        let stock = to_u32(product.stock, "stock")?;
        if stock < *need {
            return Err(RepositoryError::Conflict(format!(
                "only {stock} of {} left in stock",
                product.name
            )));
        }
    }

    let (mrp_total, total) = items.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(mrp, paid), item| {
            let qty = Decimal::from(item.quantity);
            (mrp + item.unit_list_price * qty, paid + item.unit_paid_price * qty)
        },
    );

    Ok(CheckoutPlan {
        items,
        decrements,
        mrp_total,
        total,
    })
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    customer_id: CustomerId,
    shipping_address: Json<AddressInput>,
    mrp_total: Decimal,
    discount: Decimal,
    total: Decimal,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            order_number: row.order_number,
            customer_id: row.customer_id,
            shipping_address: row.shipping_address.0,
            mrp_total: row.mrp_total,
            discount: row.discount,
            total: row.total,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    product_id: Option<ProductId>,
    combo_id: Option<ComboId>,
    name: String,
    unit_list_price: Decimal,
    unit_paid_price: Decimal,
    quantity: i32,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            combo_id: row.combo_id,
            name: row.name,
            unit_list_price: row.unit_list_price,
            unit_paid_price: row.unit_paid_price,
            quantity: to_u32(row.quantity, "quantity")?,
        })
    }
}

const COLUMNS: &str = "id, order_number, customer_id, shipping_address, mrp_total, discount, \
                       total, status, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order from cart lines in one transaction.
    ///
    /// Locks the affected product rows, verifies stock, snapshots effective
    /// prices, inserts the order with its items and first tracking event,
    /// decrements stock (combos take from each bundled product) and clears
    /// the customer's persisted cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if an item is unavailable or stock
    /// is short. Nothing is written in that case.
    /// Returns `RepositoryError::Database` if a query fails.
    #[tracing::instrument(skip(self, order), fields(customer_id = %order.customer_id))]
    pub async fn checkout(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        if order.lines.is_empty() {
            return Err(RepositoryError::Conflict("cart is empty".to_owned()));
        }

        let mut tx = self.pool.begin().await?;

        let combo_ids: Vec<i32> = order
            .lines
            .iter()
            .filter_map(|l| match l.item {
                LineItem::Combo(id) => Some(id.as_i32()),
                LineItem::Product(_) => None,
            })
            .collect();

        let heads = sqlx::query_as::<_, ComboHeadRow>(
            "SELECT id, name, price, is_active FROM combos WHERE id = ANY($1) FOR SHARE",
        )
        .bind(&combo_ids)
        .fetch_all(&mut *tx)
        .await?;

        let component_rows = sqlx::query_as::<_, ComboComponentRow>(
            "SELECT combo_id, product_id, quantity FROM combo_items WHERE combo_id = ANY($1)",
        )
        .bind(&combo_ids)
        .fetch_all(&mut *tx)
        .await?;

        let mut combos: HashMap<ComboId, LockedCombo> = heads
            .into_iter()
            .map(|h| {
                (
                    h.id,
                    LockedCombo {
                        name: h.name,
                        price: h.price,
                        is_active: h.is_active,
                        components: Vec::new(),
                    },
                )
            })
            .collect();
        for row in component_rows {
            if let Some(combo) = combos.get_mut(&row.combo_id) {
                combo
                    .components
                    .push((row.product_id, to_u32(row.quantity, "combo quantity")?));
            }
        }

        let mut product_ids: Vec<i32> = order
            .lines
            .iter()
            .filter_map(|l| match l.item {
                LineItem::Product(id) => Some(id.as_i32()),
                LineItem::Combo(_) => None,
            })
            .chain(
                combos
                    .values()
                    .flat_map(|c| c.components.iter().map(|(id, _)| id.as_i32())),
            )
            .collect();
        product_ids.sort_unstable();
        product_ids.dedup();

        // Lock in id order so concurrent checkouts can't deadlock.
        let products: HashMap<ProductId, LockedProduct> = sqlx::query_as::<_, LockedProduct>(
            "SELECT id, name, price, offer_price, stock, is_active
             FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&product_ids)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

        let plan = plan_checkout(&order.lines, &products, &combos)?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (customer_id, shipping_address, mrp_total, discount, total)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        ))
        .bind(order.customer_id)
        .bind(Json(&order.shipping_address))
        .bind(plan.mrp_total)
        .bind(plan.mrp_total - plan.total)
        .bind(plan.total)
        .fetch_one(&mut *tx)
        .await?;

        for item in &plan.items {
            let (product_id, combo_id) = match item.item {
                LineItem::Product(id) => (Some(id), None),
                LineItem::Combo(id) => (None, Some(id)),
            };
            sqlx::query(
                "INSERT INTO order_items
                    (order_id, product_id, combo_id, name, unit_list_price, unit_paid_price, quantity)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(row.id)
            .bind(product_id)
            .bind(combo_id)
            .bind(&item.name)
            .bind(item.unit_list_price)
            .bind(item.unit_paid_price)
            .bind(to_i32(item.quantity, "quantity")?)
            .execute(&mut *tx)
            .await?;
        }

        for (product_id, quantity) in &plan.decrements {
            sqlx::query(
                "UPDATE products SET stock = stock - $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(*product_id)
            .bind(to_i32(*quantity, "quantity")?)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("INSERT INTO order_tracking (order_id, status, note) VALUES ($1, $2, $3)")
            .bind(row.id)
            .bind(OrderStatus::Pending)
            .bind("Order placed")
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE customers SET cart = '[]'::jsonb, updated_at = NOW() WHERE id = $1")
            .bind(order.customer_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let placed = Order::from(row);
        tracing::info!(
            order_id = %placed.id,
            order_number = %placed.order_number,
            total = %placed.total,
            "Order placed"
        );
        Ok(placed)
    }

    /// A customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE customer_id = $1 ORDER BY created_at DESC"
        ))
        .bind(customer)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// One of a customer's orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_customer(
        &self,
        customer: CustomerId,
        id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE id = $1 AND customer_id = $2"
        ))
        .bind(id)
        .bind(customer)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    /// Any order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    /// Orders newest first, optionally with a given status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {COLUMNS} FROM orders
             WHERE $1::order_status IS NULL OR status = $1
             ORDER BY created_at DESC
             LIMIT $2"
        ))
        .bind(status)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Items of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn items(&self, order: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, product_id, combo_id, name, unit_list_price, unit_paid_price, quantity
             FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Status history of an order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn tracking(&self, order: OrderId) -> Result<Vec<TrackingEvent>, RepositoryError> {
        let rows = sqlx::query_as::<_, TrackingEvent>(
            "SELECT status, note, created_at FROM order_tracking
             WHERE order_id = $1 ORDER BY created_at, id",
        )
        .bind(order)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Move an order to `next` and record a tracking event.
    ///
    /// Cancelling returns the order's units to stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Conflict` if the transition isn't allowed.
    #[tracing::instrument(skip(self, note), fields(order_id = %id, next = %next))]
    pub async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
        note: Option<&str>,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: OrderStatus =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        if !current.can_transition_to(next) {
            return Err(RepositoryError::Conflict(format!(
                "cannot move order from {current} to {next}"
            )));
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO order_tracking (order_id, status, note) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(next)
            .bind(note.unwrap_or(next.label()))
            .execute(&mut *tx)
            .await?;

        if next == OrderStatus::Cancelled {
            sqlx::query(
                "UPDATE products p SET stock = p.stock + r.units, updated_at = NOW()
                 FROM (
                     SELECT product_id, SUM(units)::INTEGER AS units
                     FROM (
                         SELECT product_id, quantity AS units
                         FROM order_items WHERE order_id = $1 AND product_id IS NOT NULL
                         UNION ALL
                         SELECT ci.product_id, ci.quantity * oi.quantity
                         FROM order_items oi
                         JOIN combo_items ci ON ci.combo_id = oi.combo_id
                         WHERE oi.order_id = $1
                     ) lines
                     GROUP BY product_id
                 ) r
                 WHERE p.id = r.product_id",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(from = %current, to = %next, "Order status updated");
        Ok(row.into())
    }

    /// Order counts and revenue.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(&self) -> Result<DashboardSummary, RepositoryError> {
        let by_status: Vec<(OrderStatus, i64, Decimal)> = sqlx::query_as(
            "SELECT status, COUNT(*), COALESCE(SUM(total), 0) FROM orders GROUP BY status",
        )
        .fetch_all(self.pool)
        .await?;

        let mut summary = DashboardSummary {
            total_orders: 0,
            open_orders: 0,
            revenue: Decimal::ZERO,
            orders_by_status: BTreeMap::new(),
        };

        for (status, count, total) in by_status {
            summary.total_orders += count;
            if !status.is_terminal() {
                summary.open_orders += count;
            }
            if status != OrderStatus::Cancelled {
                summary.revenue += total;
            }
            summary.orders_by_status.insert(status.to_string(), count);
        }

        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i32, price: i64, offer: Option<i64>, stock: i32) -> LockedProduct {
        LockedProduct {
            id: ProductId::new(id),
            name: format!("product {id}"),
            price: Decimal::from(price),
            offer_price: offer.map(Decimal::from),
            stock,
            is_active: true,
        }
    }

    fn products(list: Vec<LockedProduct>) -> HashMap<ProductId, LockedProduct> {
        list.into_iter().map(|p| (p.id, p)).collect()
    }

    fn combo(id: i32, price: i64, components: &[(i32, u32)]) -> HashMap<ComboId, LockedCombo> {
        let combo = LockedCombo {
            name: format!("combo {id}"),
            price: Decimal::from(price),
            is_active: true,
            components: components
                .iter()
                .map(|(p, q)| (ProductId::new(*p), *q))
                .collect(),
        };
        HashMap::from([(ComboId::new(id), combo)])
    }

    fn line(item: LineItem, quantity: u32) -> CartLine {
        CartLine { item, quantity }
    }

    #[test]
    fn test_plan_snapshots_effective_prices() {
        let products = products(vec![product(1, 300, Some(250), 10), product(2, 100, None, 5)]);
        let lines = [
            line(LineItem::Product(ProductId::new(1)), 2),
            line(LineItem::Product(ProductId::new(2)), 1),
        ];

        let plan = plan_checkout(&lines, &products, &HashMap::new()).unwrap();
        assert_eq!(plan.mrp_total, Decimal::from(700));
        assert_eq!(plan.total, Decimal::from(600));
        assert_eq!(plan.items[0].unit_paid_price, Decimal::from(250));
        assert_eq!(plan.decrements[&ProductId::new(1)], 2);
    }

    #[test]
    fn test_plan_combo_takes_from_each_component() {
        let products = products(vec![product(1, 150, None, 10), product(2, 300, None, 10)]);
        let combos = combo(9, 500, &[(1, 2), (2, 1)]);
        let lines = [
            line(LineItem::Combo(ComboId::new(9)), 3),
            line(LineItem::Product(ProductId::new(2)), 1),
        ];

        let plan = plan_checkout(&lines, &products, &combos).unwrap();
        assert_eq!(plan.decrements[&ProductId::new(1)], 6);
        assert_eq!(plan.decrements[&ProductId::new(2)], 4);
        assert_eq!(plan.items[0].unit_list_price, Decimal::from(600));
        assert_eq!(plan.items[0].unit_paid_price, Decimal::from(500));
        assert_eq!(plan.total, Decimal::from(1800));
    }

    #[test]
    fn test_plan_rejects_shortfall_across_lines() {
        let products = products(vec![product(1, 150, None, 5)]);
        let combos = combo(9, 250, &[(1, 2)]);
        let lines = [
            line(LineItem::Combo(ComboId::new(9)), 2),
            line(LineItem::Product(ProductId::new(1)), 2),
        ];

        let err = plan_checkout(&lines, &products, &combos).unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(msg) if msg.contains("only 5")));
    }

    #[test]
    fn test_plan_rejects_inactive_and_unknown_items() {
        let mut hidden = product(1, 100, None, 5);
        hidden.is_active = false;
        let products = products(vec![hidden]);

        let lines = [line(LineItem::Product(ProductId::new(1)), 1)];
        assert!(plan_checkout(&lines, &products, &HashMap::new()).is_err());

        let lines = [line(LineItem::Combo(ComboId::new(4)), 1)];
        assert!(plan_checkout(&lines, &products, &HashMap::new()).is_err());
    }

    #[test]
    fn test_tracking_steps_use_last_event_before_cancel() {
        let at = Utc::now();
        let events = vec![
            TrackingEvent {
                status: OrderStatus::Pending,
                note: None,
                created_at: at,
            },
            TrackingEvent {
                status: OrderStatus::Processing,
                note: None,
                created_at: at,
            },
            TrackingEvent {
                status: OrderStatus::Cancelled,
                note: Some("customer request".to_owned()),
                created_at: at,
            },
        ];

        let steps = tracking_steps(OrderStatus::Cancelled, &events);
        let statuses: Vec<OrderStatus> = steps.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::Processing,
                OrderStatus::Cancelled
            ]
        );
    }
}
