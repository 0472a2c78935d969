//! Conversion of a cart into an order.
//!
//! Pricing, order header, order lines and cart clearing happen inside one
//! store transaction: a failure at any step rolls everything back, so the cart
//! stays intact and no partial order is ever visible.
//!
//! Stock is not checked or decremented here. That is
//! [`crate::services::catalog::decrement_stock`], which callers invoke
//! separately.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, Set,
    TransactionTrait,
};
use thiserror::Error;
use tracing::{error, info};

use crate::entities::{
    order::{self, Status},
    order_item,
};
use crate::error::ApiError;
use crate::services::{cart, money};

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Cart not found")]
    CartNotFound,
    #[error("Cart is empty")]
    EmptyCart,
    #[error("{0}")]
    Store(#[from] DbErr),
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::CartNotFound => ApiError::NotFound(err.to_string()),
            CheckoutError::EmptyCart => ApiError::BadRequest(err.to_string()),
            CheckoutError::Store(db_err) => db_err.into(),
        }
    }
}

/// Line of an order before it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Snapshots the unit price of each line and totals them.
pub fn price_lines<I>(lines: I) -> (Vec<PricedLine>, Decimal)
where
    I: IntoIterator<Item = (i32, i32, Decimal)>,
{
    let priced: Vec<PricedLine> = lines
        .into_iter()
        .map(|(product_id, quantity, price)| {
            let unit_price = money(price);
            PricedLine {
                product_id,
                quantity,
                unit_price,
                subtotal: money(unit_price * Decimal::from(quantity)),
            }
        })
        .collect();

    let total = money(priced.iter().map(|line| line.subtotal).sum());
    (priced, total)
}

/// Places an order from the user's cart and returns the order header.
pub async fn checkout(db: &DatabaseConnection, user_id: i32) -> Result<order::Model, CheckoutError> {
    let txn = db.begin().await?;

    match place_order(&txn, user_id).await {
        Ok(order) => {
            txn.commit().await?;
            info!(
                order_id = order.id,
                user_id,
                total_amount = %order.total_amount,
                "order placed"
            );
            Ok(order)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                error!(user_id, error = %rollback_err, "checkout rollback failed");
            }
            Err(err)
        }
    }
}

async fn place_order(txn: &DatabaseTransaction, user_id: i32) -> Result<order::Model, CheckoutError> {
    let user_cart = cart::find_cart(txn, user_id)
        .await?
        .ok_or(CheckoutError::CartNotFound)?;

    let lines = cart::cart_lines(txn, user_cart.id).await?;
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let (priced, total_amount) = price_lines(
        lines
            .into_iter()
            .map(|(item, product)| (product.id, item.quantity, product.price)),
    );

    let now = Utc::now();
    let new_order = order::ActiveModel {
        user_id: Set(user_id),
        total_amount: Set(total_amount),
        status: Set(Status::Pending),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let mut placed = new_order.insert(txn).await?;
    placed.total_amount = money(placed.total_amount);

    let order_lines = priced.into_iter().map(|line| order_item::ActiveModel {
        order_id: Set(placed.id),
        product_id: Set(line.product_id),
        quantity: Set(line.quantity),
        unit_price: Set(line.unit_price),
        subtotal: Set(line.subtotal),
        ..Default::default()
    });
    order_item::Entity::insert_many(order_lines).exec(txn).await?;

    cart::clear_lines(txn, user_cart.id).await?;

    Ok(placed)
}
