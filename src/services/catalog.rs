use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::order_item;
use crate::entities::product::{self, Entity as ProductEntity};
use crate::services::money;

#[derive(Debug, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category: String,
    pub image_url: String,
}

#[derive(Debug, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.category.is_none()
            && self.image_url.is_none()
    }
}

/// Newest first. `category` matches exactly, `search` is a case-insensitive
/// substring of the name.
pub async fn list_products<C: ConnectionTrait>(
    conn: &C,
    filter: &ProductFilter,
) -> Result<Vec<product::Model>, DbErr> {
    let mut query = ProductEntity::find();

    if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
        query = query.filter(product::Column::Category.eq(category));
    }

    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        query = query.filter(
            Expr::expr(Func::lower(Expr::col(product::Column::Name)))
                .like(format!("%{}%", search.to_lowercase())),
        );
    }

    let products = query.order_by_desc(product::Column::Id).all(conn).await?;
    Ok(products.into_iter().map(normalise).collect())
}

pub async fn find_product<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<Option<product::Model>, DbErr> {
    let found = ProductEntity::find_by_id(id).one(conn).await?;
    Ok(found.map(normalise))
}

pub async fn create_product<C: ConnectionTrait>(
    conn: &C,
    new: NewProduct,
) -> Result<product::Model, DbErr> {
    product::ActiveModel {
        name: Set(new.name),
        description: Set(new.description),
        price: Set(new.price),
        stock: Set(new.stock),
        category: Set(new.category),
        image_url: Set(new.image_url),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map(normalise)
}

/// Applies only the provided fields. `None` when the product does not exist.
pub async fn update_product<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    changes: ProductChanges,
) -> Result<Option<product::Model>, DbErr> {
    let Some(existing) = ProductEntity::find_by_id(id).one(conn).await? else {
        return Ok(None);
    };
    let mut product: product::ActiveModel = existing.into();

    if let Some(name) = changes.name {
        product.name = Set(name);
    }
    if let Some(description) = changes.description {
        product.description = Set(description);
    }
    if let Some(price) = changes.price {
        product.price = Set(price);
    }
    if let Some(stock) = changes.stock {
        product.stock = Set(stock);
    }
    if let Some(category) = changes.category {
        product.category = Set(category);
    }
    if let Some(image_url) = changes.image_url {
        product.image_url = Set(image_url);
    }

    product.update(conn).await.map(|p| Some(normalise(p)))
}

/// Number of order lines that reference the product.
pub async fn order_references<C: ConnectionTrait>(conn: &C, id: i32) -> Result<u64, DbErr> {
    order_item::Entity::find()
        .filter(order_item::Column::ProductId.eq(id))
        .count(conn)
        .await
}

/// Returns whether a row was deleted.
pub async fn delete_product<C: ConnectionTrait>(conn: &C, id: i32) -> Result<bool, DbErr> {
    let result = ProductEntity::delete_by_id(id).exec(conn).await?;
    Ok(result.rows_affected > 0)
}

/// Takes `quantity` units out of stock with a single conditional update, so
/// concurrent callers cannot drive stock below zero. `None` means the product
/// is missing or has fewer than `quantity` units; nothing was changed then.
pub async fn decrement_stock<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    quantity: i32,
) -> Result<Option<product::Model>, DbErr> {
    let result = ProductEntity::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).sub(quantity),
        )
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::Stock.gte(quantity))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Ok(None);
    }

    let updated = ProductEntity::find_by_id(product_id).one(conn).await?;
    Ok(updated.map(normalise))
}

fn normalise(mut found: product::Model) -> product::Model {
    found.price = money(found.price);
    found
}
