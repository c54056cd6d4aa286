//! In-memory paper exchange.
//!
//! Simulates a spot exchange well enough to drive every strategy executor
//! without network access: listed symbols with prices and minimum
//! quantities, immediate fills for marketable orders, resting stop and
//! take-profit orders, expiry of non-crossing IOC/FOK limits, and scripted
//! failures. Order IDs are sequential
//! starting from 1.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;

use crate::application::ports::{ExchangeGateway, GatewayError, OrderAck, SubmitOrderRequest};
use crate::domain::order_execution::{OrderSide, OrderStatus, OrderType};
use crate::domain::shared::{ExchangeOrderId, Symbol};

#[derive(Debug, Clone)]
struct Listing {
    tradable: bool,
    min_quantity: Option<Decimal>,
}

#[derive(Debug, Clone)]
struct PaperOrder {
    request: SubmitOrderRequest,
    status: OrderStatus,
    executed_qty: Decimal,
    avg_price: Option<Decimal>,
}

impl PaperOrder {
    fn ack(&self, order_id: &ExchangeOrderId) -> OrderAck {
        OrderAck {
            order_id: order_id.clone(),
            status: self.status,
            executed_qty: Some(self.executed_qty),
            avg_price: self.avg_price,
        }
    }
}

/// Simulated exchange for tests and paper trading.
#[derive(Debug, Default)]
pub struct PaperExchange {
    order_counter: AtomicU64,
    submission_counter: AtomicU64,
    listings: RwLock<HashMap<Symbol, Listing>>,
    prices: RwLock<HashMap<Symbol, Decimal>>,
    orders: RwLock<HashMap<ExchangeOrderId, PaperOrder>>,
    submissions: Mutex<Vec<SubmitOrderRequest>>,
    cancellations: Mutex<Vec<ExchangeOrderId>>,
    scripted_submit_failures: Mutex<HashMap<u64, GatewayError>>,
    failing_cancels: Mutex<HashSet<ExchangeOrderId>>,
    failing_lookups: Mutex<HashSet<ExchangeOrderId>>,
}

impl PaperExchange {
    /// Create an exchange with no listings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// List a tradable symbol at `price`.
    #[must_use]
    pub fn with_symbol(self, symbol: &str, price: Decimal) -> Self {
        self.add_symbol(symbol, true);
        self.set_price(symbol, price);
        self
    }

    /// List a symbol, tradable or halted.
    pub fn add_symbol(&self, symbol: &str, tradable: bool) {
        let mut listings = self.listings.write();
        let listing = listings.entry(Symbol::new(symbol)).or_insert(Listing {
            tradable,
            min_quantity: None,
        });
        listing.tradable = tradable;
    }

    /// Set the last traded price.
    pub fn set_price(&self, symbol: &str, price: Decimal) {
        self.prices.write().insert(Symbol::new(symbol), price);
    }

    /// Set the minimum order quantity for a listed symbol.
    pub fn set_min_quantity(&self, symbol: &str, min_quantity: Decimal) {
        if let Some(listing) = self.listings.write().get_mut(&Symbol::new(symbol)) {
            listing.min_quantity = Some(min_quantity);
        }
    }

    /// Make the `n`-th submission attempt (1-based, counted from creation) fail.
    pub fn fail_submission(&self, n: u64, error: GatewayError) {
        self.scripted_submit_failures.lock().insert(n, error);
    }

    /// Make the next submission attempt fail.
    pub fn fail_next_submission(&self, error: GatewayError) {
        let next = self.submission_counter.load(Ordering::SeqCst) + 1;
        self.fail_submission(next, error);
    }

    /// Make every cancel of `order_id` fail.
    pub fn fail_cancel(&self, order_id: &ExchangeOrderId) {
        self.failing_cancels.lock().insert(order_id.clone());
    }

    /// Make every status lookup of `order_id` fail.
    pub fn fail_lookup(&self, order_id: &ExchangeOrderId) {
        self.failing_lookups.lock().insert(order_id.clone());
    }

    /// Force an order's status. `FILLED` also marks the full quantity executed.
    ///
    /// Returns `false` for unknown orders.
    pub fn set_order_status(&self, order_id: &ExchangeOrderId, status: OrderStatus) -> bool {
        let mut orders = self.orders.write();
        let Some(order) = orders.get_mut(order_id) else {
            return false;
        };
        order.status = status;
        if status.is_filled() {
            order.executed_qty = order.request.quantity;
            order.avg_price = order.avg_price.or(order.request.price);
        }
        true
    }

    /// Fill an order completely.
    pub fn fill(&self, order_id: &ExchangeOrderId) -> bool {
        self.set_order_status(order_id, OrderStatus::Filled)
    }

    /// Current status of an order.
    #[must_use]
    pub fn order_status(&self, order_id: &ExchangeOrderId) -> Option<OrderStatus> {
        self.orders.read().get(order_id).map(|order| order.status)
    }

    /// Every submission attempt, in order, including failed ones.
    #[must_use]
    pub fn submissions(&self) -> Vec<SubmitOrderRequest> {
        self.submissions.lock().clone()
    }

    /// Every successfully cancelled order, in order.
    #[must_use]
    pub fn cancellations(&self) -> Vec<ExchangeOrderId> {
        self.cancellations.lock().clone()
    }

    /// Number of accepted orders.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.read().len()
    }

    fn listing(&self, symbol: &Symbol) -> Result<Listing, GatewayError> {
        self.listings
            .read()
            .get(symbol)
            .cloned()
            .ok_or_else(|| GatewayError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }

    fn is_marketable(request: &SubmitOrderRequest, last: Option<Decimal>) -> bool {
        match request.order_type {
            OrderType::Market => true,
            OrderType::Limit => match (request.price, last) {
                (Some(limit), Some(last)) => match request.side {
                    OrderSide::Buy => limit >= last,
                    OrderSide::Sell => limit <= last,
                },
                _ => false,
            },
            OrderType::Stop | OrderType::TakeProfit => false,
        }
    }
}

#[async_trait]
impl ExchangeGateway for PaperExchange {
    async fn submit_order(&self, request: SubmitOrderRequest) -> Result<OrderAck, GatewayError> {
        let attempt = self.submission_counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.submissions.lock().push(request.clone());

        if let Some(error) = self.scripted_submit_failures.lock().remove(&attempt) {
            return Err(error);
        }

        let listing = self.listing(&request.symbol)?;
        if !listing.tradable {
            return Err(GatewayError::OrderRejected {
                reason: format!("{} is not trading", request.symbol),
            });
        }
        if request.quantity <= Decimal::ZERO {
            return Err(GatewayError::OrderRejected {
                reason: format!("invalid quantity {}", request.quantity),
            });
        }
        if request.order_type.requires_limit_price() && request.price.is_none() {
            return Err(GatewayError::OrderRejected {
                reason: format!("{} order requires a price", request.order_type),
            });
        }
        if request.order_type.requires_stop_price() && request.stop_price.is_none() {
            return Err(GatewayError::OrderRejected {
                reason: format!("{} order requires a stop price", request.order_type),
            });
        }
        if listing.min_quantity.is_some_and(|min| request.quantity < min) {
            return Err(GatewayError::OrderRejected {
                reason: format!("quantity {} below minimum", request.quantity),
            });
        }

        let last = self.prices.read().get(&request.symbol).copied();
        let order = if Self::is_marketable(&request, last) {
            PaperOrder {
                status: OrderStatus::Filled,
                executed_qty: request.quantity,
                avg_price: last,
                request,
            }
        } else {
            let status =
                if request.order_type == OrderType::Limit && request.time_in_force.is_immediate() {
                    OrderStatus::Expired
                } else {
                    OrderStatus::New
                };
            PaperOrder {
                status,
                executed_qty: Decimal::ZERO,
                avg_price: None,
                request,
            }
        };

        let sequence = self.order_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let order_id = ExchangeOrderId::new(sequence.to_string());
        let ack = order.ack(&order_id);
        self.orders.write().insert(order_id, order);
        Ok(ack)
    }

    async fn get_order(
        &self,
        _symbol: &Symbol,
        order_id: &ExchangeOrderId,
    ) -> Result<OrderAck, GatewayError> {
        if self.failing_lookups.lock().contains(order_id) {
            return Err(GatewayError::Connection {
                message: "simulated lookup failure".to_string(),
            });
        }
        self.orders
            .read()
            .get(order_id)
            .map(|order| order.ack(order_id))
            .ok_or_else(|| GatewayError::OrderNotFound {
                order_id: order_id.to_string(),
            })
    }

    async fn cancel_order(
        &self,
        _symbol: &Symbol,
        order_id: &ExchangeOrderId,
    ) -> Result<(), GatewayError> {
        if self.failing_cancels.lock().contains(order_id) {
            return Err(GatewayError::Connection {
                message: "simulated cancel failure".to_string(),
            });
        }

        let mut orders = self.orders.write();
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| GatewayError::OrderNotFound {
                order_id: order_id.to_string(),
            })?;
        if order.status.is_terminal() {
            return Err(GatewayError::OrderRejected {
                reason: format!("order {order_id} already {}", order.status),
            });
        }
        order.status = OrderStatus::Canceled;
        drop(orders);

        self.cancellations.lock().push(order_id.clone());
        Ok(())
    }

    async fn current_price(&self, symbol: &Symbol) -> Result<Decimal, GatewayError> {
        self.prices
            .read()
            .get(symbol)
            .copied()
            .ok_or_else(|| GatewayError::PriceUnavailable {
                symbol: symbol.to_string(),
            })
    }

    async fn min_quantity(&self, symbol: &Symbol) -> Result<Option<Decimal>, GatewayError> {
        Ok(self.listing(symbol)?.min_quantity)
    }

    async fn symbol_tradable(&self, symbol: &Symbol) -> Result<bool, GatewayError> {
        Ok(self.listing(symbol)?.tradable)
    }
}
