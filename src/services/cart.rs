//! Per-user cart operations. Every entry point provisions the cart row on
//! first use, so callers never see a "create cart" step.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use serde::Serialize;

use crate::entities::{cart, cart_item, product};
use crate::services::money;

#[derive(Debug, Serialize)]
pub struct CartLine {
    pub item_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub cart_id: i32,
    pub items: Vec<CartLine>,
    pub total_price: Decimal,
}

pub async fn find_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Option<cart::Model>, DbErr> {
    cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(conn)
        .await
}

/// Returns the user's cart, inserting it if absent. A concurrent first
/// access that wins the unique `user_id` race is picked up by re-reading.
pub async fn get_or_create_cart<C>(conn: &C, user_id: i32) -> Result<cart::Model, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    if let Some(existing) = find_cart(conn, user_id).await? {
        return Ok(existing);
    }

    let now = Utc::now();
    let new_cart = cart::ActiveModel {
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    // Savepoint, so a lost race does not poison the caller's transaction.
    let savepoint = conn.begin().await?;
    match new_cart.insert(&savepoint).await {
        Ok(created) => {
            savepoint.commit().await?;
            Ok(created)
        }
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            savepoint.rollback().await?;
            find_cart(conn, user_id).await?.ok_or(err)
        }
        Err(err) => Err(err),
    }
}

/// Lines of a cart joined with the live product price.
pub async fn cart_lines<C: ConnectionTrait>(
    conn: &C,
    cart_id: i32,
) -> Result<Vec<(cart_item::Model, product::Model)>, DbErr> {
    let rows = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .order_by_asc(cart_item::Column::Id)
        .find_also_related(product::Entity)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(item, product)| product.map(|product| (item, product)))
        .collect())
}

pub async fn view_cart<C>(conn: &C, user_id: i32) -> Result<CartView, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let cart = get_or_create_cart(conn, user_id).await?;

    let items: Vec<CartLine> = cart_lines(conn, cart.id)
        .await?
        .into_iter()
        .map(|(item, product)| CartLine {
            item_id: item.id,
            product_id: product.id,
            product_name: product.name,
            price: money(product.price),
            quantity: item.quantity,
            total: money(product.price * Decimal::from(item.quantity)),
        })
        .collect();

    let total_price = money(items.iter().map(|line| line.total).sum());

    Ok(CartView {
        cart_id: cart.id,
        items,
        total_price,
    })
}

/// Appends a new line. Repeated adds of one product stay separate lines.
pub async fn add_item<C>(
    conn: &C,
    user_id: i32,
    product_id: i32,
    quantity: i32,
) -> Result<cart_item::Model, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let cart = get_or_create_cart(conn, user_id).await?;

    let new_item = cart_item::ActiveModel {
        cart_id: Set(cart.id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        ..Default::default()
    };
    let item = new_item.insert(conn).await?;
    touch(conn, cart.id).await?;

    Ok(item)
}

/// Sets the quantity on every line of `product_id`. Returns affected rows.
pub async fn update_quantity<C>(
    conn: &C,
    user_id: i32,
    product_id: i32,
    quantity: i32,
) -> Result<u64, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let cart = get_or_create_cart(conn, user_id).await?;

    let result = cart_item::Entity::update_many()
        .col_expr(cart_item::Column::Quantity, Expr::value(quantity))
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;
    touch(conn, cart.id).await?;

    Ok(result.rows_affected)
}

pub async fn remove_item<C>(conn: &C, user_id: i32, product_id: i32) -> Result<u64, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let cart = get_or_create_cart(conn, user_id).await?;

    let result = cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;
    touch(conn, cart.id).await?;

    Ok(result.rows_affected)
}

pub async fn clear<C>(conn: &C, user_id: i32) -> Result<u64, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let cart = get_or_create_cart(conn, user_id).await?;
    clear_lines(conn, cart.id).await
}

/// Deletes every line of the cart; the cart row itself stays.
pub async fn clear_lines<C: ConnectionTrait>(conn: &C, cart_id: i32) -> Result<u64, DbErr> {
    let result = cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .exec(conn)
        .await?;
    touch(conn, cart_id).await?;

    Ok(result.rows_affected)
}

async fn touch<C: ConnectionTrait>(conn: &C, cart_id: i32) -> Result<(), DbErr> {
    cart::Entity::update_many()
        .col_expr(cart::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(cart::Column::Id.eq(cart_id))
        .exec(conn)
        .await?;
    Ok(())
}
