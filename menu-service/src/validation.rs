//! Business rules applied to a new menu before any AI work happens.

use crate::dtos::CreateMenuRequest;
use crate::services::ai::MenuDraft;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use service_core::error::{AppError, Rejection};

/// Names too vague to describe a real dish.
static GENERIC_NAMES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^test\s*menu$",
        r"(?i)^menu\s*\d*$",
        r"(?i)^[a-z]{1,2}$",
        r"(?i)^xxx+$",
        r"^[\d\s\-_]+$",
        r"(?i)^untitled",
        r"(?i)^no\s*name",
        r"(?i)^temp",
        r"(?i)^item\s*\d*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid generic name regex"))
    .collect()
});

static PLACEHOLDER_INGREDIENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\s\-_]+$").expect("valid ingredient regex"));

/// Accepted categories. A category passes when it equals or contains one of these.
pub const VALID_CATEGORIES: &[&str] = &[
    "makanan",
    "minuman",
    "snack",
    "dessert",
    "appetizer",
    "main course",
    "side dish",
    "soup",
    "salad",
    "kue",
    "jajanan",
    "camilan",
    "hidangan pembuka",
    "hidangan utama",
    "hidangan penutup",
    "bakery",
    "pastry",
    "food",
    "beverage",
    "drink",
    "snacks",
    "desserts",
    "appetizers",
    "entree",
    "main dish",
    "side",
    "cake",
    "coffee",
    "tea",
    "juice",
    "smoothie",
    "bread",
];

/// Subset shown to clients when a category is refused.
const SUGGESTED_CATEGORIES: &[&str] = &[
    "makanan",
    "minuman",
    "snack",
    "dessert",
    "appetizer",
    "main course",
    "side dish",
    "soup",
    "salad",
    "kue",
    "jajanan",
    "camilan",
];

pub fn is_generic_name(name: &str) -> bool {
    GENERIC_NAMES.iter().any(|p| p.is_match(name))
}

pub fn is_valid_category(category: &str) -> bool {
    let category = category.trim().to_lowercase();
    VALID_CATEGORIES
        .iter()
        .any(|valid| category == *valid || category.contains(valid))
}

pub fn is_valid_ingredient(ingredient: &str) -> bool {
    let trimmed = ingredient.trim();
    trimmed.chars().count() >= 2 && !PLACEHOLDER_INGREDIENT.is_match(trimmed)
}

/// Check a create request and turn it into a draft for auto-completion.
///
/// The draft keeps the name and category trimmed; lower-casing the category
/// happens at insert time.
pub fn validate_new_menu(request: &CreateMenuRequest) -> Result<MenuDraft, AppError> {
    let name = request.name.as_deref().map(str::trim).unwrap_or_default();
    let category = request.category.as_deref().map(str::trim).unwrap_or_default();

    if name.is_empty() || category.is_empty() {
        return Err(
            Rejection::bad_request("Data tidak lengkap. Harap isi name dan category.").into(),
        );
    }

    if is_generic_name(name) {
        return Err(Rejection::bad_request("Nama menu tidak valid")
            .reason(format!(
                "Nama '{}' terlalu generic atau tidak jelas",
                request.name.as_deref().unwrap_or_default()
            ))
            .hint("Gunakan nama menu yang spesifik, contoh: 'Nasi Goreng Seafood', 'Es Teh Manis', 'Ayam Bakar Madu'")
            .with(
                "examples",
                json!(["Nasi Goreng Spesial", "Es Teh Manis", "Ayam Geprek", "Kopi Susu Gula Aren"]),
            )
            .into());
    }

    if name.chars().count() < 3 {
        return Err(Rejection::bad_request("Nama menu terlalu pendek")
            .reason("Nama menu harus minimal 3 karakter")
            .hint("Contoh: 'Teh', 'Soto', 'Mie Ayam'")
            .into());
    }

    if !is_valid_category(category) {
        return Err(Rejection::bad_request("Kategori menu tidak valid")
            .reason(format!(
                "Kategori '{}' tidak dikenali",
                request.category.as_deref().unwrap_or_default()
            ))
            .hint("Gunakan kategori yang sesuai untuk menu makanan/minuman")
            .with("validCategories", json!(SUGGESTED_CATEGORIES))
            .into());
    }

    let price = parse_price(request.price.as_ref())?;
    let calories = parse_calories(request.calories.as_ref())?;
    let ingredients = parse_ingredients(request.ingredients.as_ref())?;

    Ok(MenuDraft {
        name: name.to_string(),
        category: category.to_string(),
        ingredients,
        description: request
            .description
            .clone()
            .filter(|d| !d.trim().is_empty()),
        calories,
        price,
    })
}

fn parse_price(value: Option<&Value>) -> Result<Option<Decimal>, AppError> {
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    value
        .as_f64()
        .filter(|p| *p > 0.0)
        .and_then(Decimal::from_f64)
        .map(|p| Some(p.round_dp(2)))
        .ok_or_else(|| {
            Rejection::bad_request("Price harus berupa angka positif")
                .hint("Contoh: 15000, 25000, 50000. Atau kosongkan agar AI yang estimasi.")
                .into()
        })
}

fn parse_calories(value: Option<&Value>) -> Result<Option<i32>, AppError> {
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    value
        .as_f64()
        .filter(|c| *c >= 0.0 && *c <= i32::MAX as f64)
        .map(|c| Some(c.round() as i32))
        .ok_or_else(|| {
            Rejection::bad_request("Calories harus berupa angka non-negatif")
                .hint("Atau kosongkan agar AI yang estimasi.")
                .into()
        })
}

fn parse_ingredients(value: Option<&Value>) -> Result<Vec<String>, AppError> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(not_an_array()),
    };

    let ingredients: Vec<String> = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<_>>()
        .ok_or_else(not_an_array)?;

    let invalid: Vec<&str> = ingredients
        .iter()
        .map(String::as_str)
        .filter(|i| !is_valid_ingredient(i))
        .collect();

    if !invalid.is_empty() {
        return Err(Rejection::bad_request("Bahan tidak valid")
            .reason(format!("Bahan berikut tidak valid: {}", invalid.join(", ")))
            .hint("Bahan harus berupa kata yang valid, minimal 2 karakter")
            .into());
    }

    Ok(ingredients.iter().map(|i| i.trim().to_string()).collect())
}

fn not_an_array() -> AppError {
    Rejection::bad_request("Ingredients harus berupa array")
        .hint("Contoh: [\"nasi\", \"telur\", \"ayam\"] atau kosongkan.")
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, category: &str) -> CreateMenuRequest {
        CreateMenuRequest {
            name: Some(name.to_string()),
            category: Some(category.to_string()),
            ..Default::default()
        }
    }

    fn rejection_message(result: Result<MenuDraft, AppError>) -> String {
        match result {
            Err(AppError::Rejected(rejection)) => rejection.message,
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_generic_names() {
        for name in ["Test Menu", "menu 3", "AB", "xxxx", "123 - 4", "Untitled dish", "no name", "Temporary", "item 2"] {
            assert!(is_generic_name(name), "{} should be generic", name);
        }
        for name in ["Nasi Goreng", "Es Teh Manis", "Menu Spesial Ayam"] {
            assert!(!is_generic_name(name), "{} should be accepted", name);
        }
    }

    #[test]
    fn test_categories() {
        assert!(is_valid_category("Makanan"));
        assert!(is_valid_category("minuman dingin"));
        assert!(is_valid_category("  Coffee "));
        assert!(!is_valid_category("elektronik"));
    }

    #[test]
    fn test_ingredients() {
        assert!(is_valid_ingredient("nasi"));
        assert!(is_valid_ingredient("蛋"));
        assert!(!is_valid_ingredient("a"));
        assert!(!is_valid_ingredient("12"));
        assert!(!is_valid_ingredient("--"));
    }

    #[test]
    fn test_missing_fields() {
        let message = rejection_message(validate_new_menu(&request("  ", "makanan")));
        assert_eq!(message, "Data tidak lengkap. Harap isi name dan category.");
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(
            rejection_message(validate_new_menu(&request("menu", "makanan"))),
            "Nama menu tidak valid"
        );
        assert_eq!(
            rejection_message(validate_new_menu(&request("Nasi Goreng", "furniture"))),
            "Kategori menu tidak valid"
        );
    }

    #[test]
    fn test_numeric_fields() {
        let mut req = request("Nasi Goreng", "makanan");
        req.price = Some(json!("mahal"));
        assert_eq!(
            rejection_message(validate_new_menu(&req)),
            "Price harus berupa angka positif"
        );

        let mut req = request("Nasi Goreng", "makanan");
        req.calories = Some(json!(-10));
        assert_eq!(
            rejection_message(validate_new_menu(&req)),
            "Calories harus berupa angka non-negatif"
        );

        let mut req = request("Nasi Goreng", "makanan");
        req.calories = Some(json!(0));
        req.price = Some(Value::Null);
        let draft = validate_new_menu(&req).unwrap();
        assert_eq!(draft.calories, Some(0));
        assert_eq!(draft.price, None);
    }

    #[test]
    fn test_ingredient_list() {
        let mut req = request("Nasi Goreng", "makanan");
        req.ingredients = Some(json!("nasi, telur"));
        assert_eq!(
            rejection_message(validate_new_menu(&req)),
            "Ingredients harus berupa array"
        );

        req.ingredients = Some(json!(["nasi", "1"]));
        match validate_new_menu(&req) {
            Err(AppError::Rejected(rejection)) => {
                assert_eq!(rejection.reason.as_deref(), Some("Bahan berikut tidak valid: 1"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }

        req.ingredients = Some(json!([" nasi ", "telur"]));
        let draft = validate_new_menu(&req).unwrap();
        assert_eq!(draft.ingredients, vec!["nasi", "telur"]);
    }

    #[test]
    fn test_valid_request_becomes_draft() {
        let mut req = request("  Nasi Goreng Spesial ", " Makanan ");
        req.price = Some(json!(25000));
        req.description = Some("   ".to_string());

        let draft = validate_new_menu(&req).unwrap();
        assert_eq!(draft.name, "Nasi Goreng Spesial");
        assert_eq!(draft.category, "Makanan");
        assert_eq!(draft.price, Some(Decimal::from(25_000)));
        assert_eq!(draft.description, None);
    }
}
