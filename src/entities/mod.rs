pub mod cart;
pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, TableCreateStatement},
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Schema,
    Set, TransactionTrait,
};
use tracing::info;

use crate::config::AdminSeed;
use crate::entities::{
    cart::Entity as Cart, cart_item::Entity as CartItem, order::Entity as Order,
    order_item::Entity as OrderItem, product::Entity as Product, user::Entity as User,
};

/// Creates the six relations if they are missing. Tables are created parents
/// first so foreign keys resolve on every backend.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut create_product_table = schema.create_table_from_entity(Product);
    create_product_table
        .check(Expr::col(product::Column::Price).gte(0))
        .check(Expr::col(product::Column::Stock).gte(0));

    let mut create_cart_item_table = schema.create_table_from_entity(CartItem);
    create_cart_item_table.check(Expr::col(cart_item::Column::Quantity).gt(0));

    let mut create_order_item_table = schema.create_table_from_entity(OrderItem);
    create_order_item_table.check(Expr::col(order_item::Column::Quantity).gt(0));

    let statements: Vec<TableCreateStatement> = vec![
        schema.create_table_from_entity(User),
        create_product_table,
        schema.create_table_from_entity(Cart),
        create_cart_item_table,
        schema.create_table_from_entity(Order),
        create_order_item_table,
    ];

    for mut statement in statements {
        statement.if_not_exists();
        db.execute(backend.build(&statement)).await?;
    }

    Ok(())
}

/// Creates the bootstrap admin account unless its email is already taken.
pub async fn seed_admin(db: &DatabaseConnection, seed: &AdminSeed) -> Result<(), DbErr> {
    let txn = db.begin().await?;

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&*seed.email))
        .one(&txn)
        .await?;
    if existing.is_some() {
        info!(email = %seed.email, "bootstrap admin already present");
        return Ok(());
    }

    let password_hash = user::hash_password(&seed.password)
        .map_err(|err| DbErr::Custom(format!("Failed to hash admin password: {err}")))?;

    let new_admin = user::ActiveModel {
        email: Set(seed.email.clone()),
        username: Set(seed.username.clone()),
        password_hash: Set(password_hash),
        role: Set(user::Role::Admin),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    user::Entity::insert(new_admin).exec(&txn).await?;
    txn.commit().await?;

    info!(email = %seed.email, "bootstrap admin created");
    Ok(())
}
