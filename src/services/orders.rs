use sqlx::sqlite::SqlitePool;

use crate::{
    error::AppError,
    models::order::{NewOrder, Order, OrderStatus},
};

const ORDER_COLUMNS: &str = "id, size, order_status, flavour, quantity, date_created, customer";

#[derive(Clone)]
pub struct OrderStore {
    db: SqlitePool,
}

impl OrderStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY id"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(orders)
    }

    pub async fn create(&self, customer: i64, order: NewOrder) -> Result<Order, AppError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (size, order_status, flavour, quantity, customer) \
             VALUES (?, ?, ?, ?, ?) RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.size)
        .bind(OrderStatus::Pending)
        .bind(order.flavour)
        .bind(order.quantity)
        .bind(customer)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Order {} placed by user {}", order.id, customer);
        Ok(order)
    }

    pub async fn get(&self, id: i64) -> Result<Order, AppError> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::NotFound)
    }

    /// Replaces size, flavour, and quantity. Status is left untouched.
    pub async fn update(&self, id: i64, order: NewOrder) -> Result<Order, AppError> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET size = ?, flavour = ?, quantity = ? WHERE id = ? RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.size)
        .bind(order.flavour)
        .bind(order.quantity)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn update_status(&self, id: i64, status: OrderStatus) -> Result<Order, AppError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET order_status = ? WHERE id = ? RETURNING {ORDER_COLUMNS}"
        ))
        .bind(status)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::NotFound)?;

        tracing::info!("Order {} moved to {}", order.id, status.as_str());
        Ok(order)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        tracing::info!("Order {} deleted", id);
        Ok(())
    }

    pub async fn list_for_customer(&self, customer: i64) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer = ? ORDER BY id"
        ))
        .bind(customer)
        .fetch_all(&self.db)
        .await?;
        Ok(orders)
    }

    pub async fn get_for_customer(&self, customer: i64, id: i64) -> Result<Order, AppError> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ? AND customer = ?"
        ))
        .bind(id)
        .bind(customer)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db,
        models::{
            order::{Flavour, Size},
            user::CreateUser,
        },
        services::credentials::CredentialStore,
    };

    async fn setup() -> (OrderStore, i64, i64) {
        let pool = db::connect("sqlite::memory:").await.unwrap();
        let users = CredentialStore::new(pool.clone());
        let mut ids = Vec::new();
        for name in ["alice", "bob"] {
            let user = users
                .register(CreateUser {
                    username: name.into(),
                    email: format!("{name}@x.com"),
                    password: "secret".into(),
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        (OrderStore::new(pool), ids[0], ids[1])
    }

    fn large_pepperoni() -> NewOrder {
        NewOrder {
            size: Size::Large,
            flavour: Flavour::Pepperoni,
            quantity: 2,
        }
    }

    #[tokio::test]
    async fn create_and_fetch() {
        let (orders, alice, _) = setup().await;
        assert!(orders.list().await.unwrap().is_empty());

        let created = orders.create(alice, large_pepperoni()).await.unwrap();
        assert_eq!(created.order_status, OrderStatus::Pending);
        assert_eq!(created.customer, Some(alice));
        assert_eq!(created.size, Size::Large);

        let fetched = orders.get(created.id).await.unwrap();
        assert_eq!(fetched.quantity, 2);
        assert_eq!(orders.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_and_status() {
        let (orders, alice, _) = setup().await;
        let created = orders.create(alice, large_pepperoni()).await.unwrap();

        let updated = orders
            .update(
                created.id,
                NewOrder {
                    size: Size::Small,
                    flavour: Flavour::Chicken,
                    quantity: 5,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.size, Size::Small);
        assert_eq!(updated.flavour, Flavour::Chicken);
        assert_eq!(updated.quantity, 5);
        assert_eq!(updated.order_status, OrderStatus::Pending);

        let delivered = orders
            .update_status(created.id, OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(delivered.order_status, OrderStatus::Delivered);
        assert_eq!(delivered.quantity, 5);
    }

    #[tokio::test]
    async fn missing_orders_are_not_found() {
        let (orders, _, _) = setup().await;
        assert!(matches!(orders.get(42).await, Err(AppError::NotFound)));
        assert!(matches!(
            orders.update(42, large_pepperoni()).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            orders.update_status(42, OrderStatus::InTransit).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(orders.delete(42).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn delete_removes_order() {
        let (orders, alice, _) = setup().await;
        let created = orders.create(alice, large_pepperoni()).await.unwrap();
        orders.delete(created.id).await.unwrap();
        assert!(matches!(orders.get(created.id).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn customer_scoped_queries() {
        let (orders, alice, bob) = setup().await;
        let first = orders.create(alice, large_pepperoni()).await.unwrap();
        orders.create(alice, large_pepperoni()).await.unwrap();
        let bobs = orders.create(bob, large_pepperoni()).await.unwrap();

        assert_eq!(orders.list_for_customer(alice).await.unwrap().len(), 2);
        assert_eq!(orders.list_for_customer(bob).await.unwrap().len(), 1);

        assert_eq!(
            orders.get_for_customer(alice, first.id).await.unwrap().id,
            first.id
        );
        assert!(matches!(
            orders.get_for_customer(alice, bobs.id).await,
            Err(AppError::NotFound)
        ));
    }
}
