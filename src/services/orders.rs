use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;

use crate::entities::{
    order::{self, Status},
    order_item, product, user,
};
use crate::services::money;

#[derive(Debug, Serialize)]
pub struct OrderLine {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OrderDetails {
    pub order: order::Model,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Serialize)]
pub struct AdminOrderRow {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub total_amount: Decimal,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

pub async fn list_user_orders<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Vec<order::Model>, DbErr> {
    let orders = order::Entity::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(conn)
        .await?;

    Ok(orders.into_iter().map(normalise).collect())
}

/// `None` both when the order is missing and when it belongs to someone else.
pub async fn order_details<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    order_id: i32,
) -> Result<Option<OrderDetails>, DbErr> {
    let Some(found) = order::Entity::find_by_id(order_id)
        .filter(order::Column::UserId.eq(user_id))
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    let rows = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(found.id))
        .order_by_asc(order_item::Column::Id)
        .find_also_related(product::Entity)
        .all(conn)
        .await?;

    let items = rows
        .into_iter()
        .map(|(item, product)| OrderLine {
            id: item.id,
            product_id: item.product_id,
            product_name: product.map(|p| p.name).unwrap_or_default(),
            quantity: item.quantity,
            unit_price: money(item.unit_price),
            subtotal: money(item.subtotal),
        })
        .collect();

    Ok(Some(OrderDetails {
        order: normalise(found),
        items,
    }))
}

/// Sets any status regardless of the current one. `None` if the order does
/// not exist.
pub async fn update_status<C: ConnectionTrait>(
    conn: &C,
    order_id: i32,
    status: Status,
) -> Result<Option<order::Model>, DbErr> {
    let result = order::Entity::update_many()
        .col_expr(order::Column::Status, Expr::value(status.to_string()))
        .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(order::Column::Id.eq(order_id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Ok(None);
    }

    let updated = order::Entity::find_by_id(order_id).one(conn).await?;
    Ok(updated.map(normalise))
}

pub async fn list_all_orders<C: ConnectionTrait>(conn: &C) -> Result<Vec<AdminOrderRow>, DbErr> {
    let rows = order::Entity::find()
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .find_also_related(user::Entity)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(found, owner)| AdminOrderRow {
            id: found.id,
            user_id: found.user_id,
            username: owner.map(|u| u.username).unwrap_or_default(),
            total_amount: money(found.total_amount),
            status: found.status,
            created_at: found.created_at,
        })
        .collect())
}

fn normalise(mut found: order::Model) -> order::Model {
    found.total_amount = money(found.total_amount);
    found
}
