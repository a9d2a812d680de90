use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateDescriptionRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub style: Option<String>,
}

/// Body shared by the calorie and price estimators.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EstimateRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub ingredients: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct DescriptionData {
    pub name: String,
    pub category: String,
    pub ingredients: Vec<String>,
    pub style: String,
    pub ai_generated_description: String,
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CaloriesData {
    pub name: String,
    pub category: Option<String>,
    pub ingredients: Vec<String>,
    pub estimated_calories: Option<i32>,
    pub reasoning: Option<String>,
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct PriceData {
    pub menu: String,
    pub ingredients: Vec<String>,
    pub recommended_price: Option<i64>,
    pub currency: String,
    pub reasoning: Option<String>,
}
