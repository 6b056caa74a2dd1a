use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::user::required};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Size {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    InTransit,
    Delivered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Flavour {
    Pepperoni,
    Chicken,
    Pork,
    Mix,
}

macro_rules! closed_enum {
    ($ty:ident, $label:literal, { $($name:literal => $variant:ident),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
                    $($name => Ok($ty::$variant),)+
                    _ => Err(AppError::Validation(format!(
                        concat!($label, " must be one of {}"),
                        [$($name),+].join(", ")
                    ))),
                }
            }
        }
    };
}

closed_enum!(Size, "size", {
    "SMALL" => Small,
    "MEDIUM" => Medium,
    "LARGE" => Large,
    "EXTRA_LARGE" => ExtraLarge,
});

closed_enum!(OrderStatus, "order_status", {
    "PENDING" => Pending,
    "IN_TRANSIT" => InTransit,
    "DELIVERED" => Delivered,
});

closed_enum!(Flavour, "flavour", {
    "PEPPERONI" => Pepperoni,
    "CHICKEN" => Chicken,
    "PORK" => Pork,
    "MIX" => Mix,
});

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub size: Size,
    pub order_status: OrderStatus,
    pub flavour: Flavour,
    pub quantity: i64,
    pub date_created: chrono::NaiveDateTime,
    pub customer: Option<i64>,
}

/// Raw order body as sent by clients; turned into [`NewOrder`] by `validate`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderPayload {
    pub size: Option<String>,
    pub flavour: Option<String>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub size: Size,
    pub flavour: Flavour,
    pub quantity: i64,
}

impl OrderPayload {
    pub fn validate(self) -> Result<NewOrder, AppError> {
        let size = required(self.size, "size")?.parse()?;
        let flavour = required(self.flavour, "flavour")?.parse()?;
        let quantity = required(self.quantity, "quantity")?;
        if quantity < 1 {
            return Err(AppError::Validation("quantity must be at least 1".into()));
        }
        Ok(NewOrder {
            size,
            flavour,
            quantity,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderStatusPayload {
    pub order_status: Option<String>,
}

impl OrderStatusPayload {
    pub fn validate(self) -> Result<OrderStatus, AppError> {
        required(self.order_status, "order_status")?.parse()
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
