//! Menu catalog model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Columns selected for every menu read.
pub const MENU_COLUMNS: &str =
    "id, name, category, description, ingredients, calories, price, created_at, updated_at";

/// A row of the `menus` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Menu {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub calories: Option<i32>,
    pub price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a menu.
#[derive(Debug, Clone)]
pub struct NewMenu {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub calories: Option<i32>,
    pub price: Option<Decimal>,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct MenuChanges {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub calories: Option<i32>,
    pub price: Option<Decimal>,
}

/// Columns a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Price,
    Calories,
    CreatedAt,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::Calories => "calories",
            SortField::CreatedAt => "created_at",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "name" => Some(SortField::Name),
            "price" => Some(SortField::Price),
            "calories" => Some(SortField::Calories),
            "created_at" => Some(SortField::CreatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuSort {
    pub field: SortField,
    pub ascending: bool,
}

impl MenuSort {
    /// Parse `field:order`. Unknown fields yield `None`; any order other than `asc` is descending.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(2, ':');
        let field = SortField::from_string(parts.next()?.trim())?;
        let ascending = parts
            .next()
            .map(|order| order.trim().eq_ignore_ascii_case("asc"))
            .unwrap_or(false);
        Some(Self { field, ascending })
    }
}

impl Default for MenuSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            ascending: false,
        }
    }
}

/// Filter parameters for listing menus.
#[derive(Debug, Clone, Default)]
pub struct ListMenusFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub max_calories: Option<i32>,
    pub sort: Option<MenuSort>,
    pub page: i64,
    pub per_page: i64,
}

impl ListMenusFilter {
    /// Rows to skip; saturates instead of overflowing for absurd pages.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).max(0).saturating_mul(self.per_page)
    }
}

/// One page of menus plus the unpaginated match count.
#[derive(Debug, Clone)]
pub struct MenuPage {
    pub menus: Vec<Menu>,
    pub total: i64,
}
