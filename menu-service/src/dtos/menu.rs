use crate::models::Menu;
use crate::services::ai::AiUsage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Menu as returned by the API. Nullable columns are replaced by empty defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuResponse {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub calories: i32,
    pub price: Decimal,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Menu> for MenuResponse {
    fn from(menu: Menu) -> Self {
        Self {
            id: menu.id,
            name: menu.name,
            category: menu.category,
            description: menu.description.unwrap_or_default(),
            ingredients: menu.ingredients.unwrap_or_default(),
            calories: menu.calories.unwrap_or(0),
            price: menu.price.unwrap_or(Decimal::ZERO),
            created_at: menu.created_at.to_rfc3339(),
            updated_at: menu.updated_at.to_rfc3339(),
        }
    }
}

/// Generic success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

// =============================================================================
// Listing
// =============================================================================

/// Query for `GET /menu`. Values stay raw so malformed numbers can be ignored.
#[derive(Debug, Default, Deserialize)]
pub struct MenuListParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub max_cal: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub sort: Option<String>,
}

/// Query for `GET /menu/search`.
#[derive(Debug, Default, Deserialize)]
pub struct MenuSearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// Query for `GET /menu/group-by-category`.
#[derive(Debug, Default, Deserialize)]
pub struct GroupByCategoryParams {
    pub mode: Option<String>,
    pub per_page: Option<String>,
    pub per_category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };
        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PriceRange {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct ListFiltersApplied {
    pub search: Option<String>,
    pub category: Option<String>,
    pub price_range: PriceRange,
    pub max_calories: Option<i32>,
    pub sort: String,
}

#[derive(Debug, Serialize)]
pub struct SearchFiltersApplied {
    pub search: Option<String>,
    pub category: Option<String>,
    pub price_range: PriceRange,
}

#[derive(Debug, Serialize)]
pub struct MenuListResponse<F> {
    pub success: bool,
    pub message: String,
    pub data: Vec<MenuResponse>,
    pub pagination: Pagination,
    pub filters_applied: F,
}

#[derive(Debug, Serialize)]
pub struct GroupSummary {
    pub total_categories: usize,
    pub total_items: usize,
    /// A number when the listing was truncated per category, otherwise `"all"`.
    pub items_per_category: Value,
}

#[derive(Debug, Serialize)]
pub struct GroupedMenuResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
    pub summary: GroupSummary,
}

// =============================================================================
// Writes
// =============================================================================

/// Body of `POST /menu`.
///
/// Numeric and list fields are kept as raw JSON so type mistakes produce the
/// business-rule messages instead of a generic deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMenuRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Value>,
    pub calories: Option<Value>,
    pub price: Option<Value>,
}

/// Body of `PUT /menu/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateMenuRequest {
    #[validate(length(min = 3, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    #[validate(range(min = 0))]
    pub calories: Option<i32>,
    #[validate(range(exclusive_min = 0.0))]
    pub price: Option<f64>,
}

impl UpdateMenuRequest {
    /// Normalize name and category so length rules apply to what gets stored.
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.map(|n| n.trim().to_string()),
            category: self.category.map(|c| c.trim().to_lowercase()),
            ..self
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AiAssistance {
    pub description_generated: bool,
    pub calories_estimated: bool,
    pub price_estimated: bool,
    pub note: String,
}

impl From<AiUsage> for AiAssistance {
    fn from(usage: AiUsage) -> Self {
        let note = if usage.any() {
            "AI membantu melengkapi data yang kosong"
        } else {
            "Semua data diisi manual oleh user"
        };
        Self {
            description_generated: usage.description,
            calories_estimated: usage.calories,
            price_estimated: usage.price,
            note: note.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateMenuResponse {
    pub success: bool,
    pub message: String,
    pub data: MenuResponse,
    pub ai_assistance: AiAssistance,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_update_blank_name_fails_after_trim() {
        let request = UpdateMenuRequest {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(request.clone().validate().is_ok());
        assert!(request.trimmed().validate().is_err());

        let request = UpdateMenuRequest {
            category: Some("  ".to_string()),
            ..Default::default()
        }
        .trimmed();
        assert!(request.validate().is_err());

        let request = UpdateMenuRequest {
            name: Some("  Soto Ayam ".to_string()),
            category: Some(" Makanan ".to_string()),
            ..Default::default()
        }
        .trimmed();
        assert!(request.validate().is_ok());
        assert_eq!(request.name.as_deref(), Some("Soto Ayam"));
        assert_eq!(request.category.as_deref(), Some("makanan"));
    }

    #[test]
    fn test_sanitize_nulls() {
        let now = Utc::now();
        let menu = Menu {
            id: 1,
            name: "Es Teh Manis".to_string(),
            category: "minuman".to_string(),
            description: None,
            ingredients: None,
            calories: None,
            price: None,
            created_at: now,
            updated_at: now,
        };

        let response = MenuResponse::from(menu);
        assert_eq!(response.description, "");
        assert!(response.ingredients.is_empty());
        assert_eq!(response.calories, 0);
        assert_eq!(response.price, Decimal::ZERO);
    }

    #[test]
    fn test_pagination_rounds_up() {
        assert_eq!(Pagination::new(21, 1, 10).total_pages, 3);
        assert_eq!(Pagination::new(0, 1, 10).total_pages, 0);
    }

    #[test]
    fn test_update_validation() {
        let request = UpdateMenuRequest {
            name: Some("Es".to_string()),
            calories: Some(-5),
            ..Default::default()
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("calories"));

        let request = UpdateMenuRequest {
            price: Some(15000.0),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
    }
}
