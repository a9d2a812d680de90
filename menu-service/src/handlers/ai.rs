//! Standalone AI helpers for menu authoring. All routes here are rate limited per IP.

use axum::extract::{rejection::JsonRejection, Json, State};
use serde_json::json;
use service_core::error::{AppError, Rejection};

use crate::dtos::{
    ApiResponse, CaloriesData, DescriptionData, EstimateRequest, GenerateDescriptionRequest,
    PriceData,
};
use crate::services::ai::{CalorieOutcome, DescriptionOutcome, DescriptionStyle, PriceOutcome};
use crate::startup::AppState;

use super::json_body;

fn required(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// Validate a dish and write a description for it.
///
/// POST /menu/ai/generate-description
pub async fn generate_description(
    State(state): State<AppState>,
    payload: Result<Json<GenerateDescriptionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<DescriptionData>>, AppError> {
    let request = json_body(payload)?;

    let (name, category) = match (required(request.name.as_ref()), required(request.category.as_ref())) {
        (Some(name), Some(category)) => (name, category),
        _ => {
            return Err(
                Rejection::bad_request("Field 'name' dan 'category' wajib diisi").into(),
            )
        }
    };

    let ingredients = request.ingredients.clone().unwrap_or_default();
    let style = DescriptionStyle::parse(request.style.as_deref());

    match state
        .ai
        .generate_description(name, category, &ingredients, style)
        .await
    {
        DescriptionOutcome::Generated(generated) => Ok(Json(ApiResponse::ok(
            "Deskripsi berhasil di-generate oleh AI",
            DescriptionData {
                name: name.to_string(),
                category: category.to_string(),
                ingredients,
                style: generated.style.as_str().to_string(),
                ai_generated_description: generated.description,
                warning: generated.warning,
            },
        ))),
        DescriptionOutcome::Rejected { reason } => {
            Err(Rejection::bad_request("Menu tidak valid untuk dibuatkan deskripsi")
                .reason(reason)
                .with(
                    "data",
                    json!({ "name": name, "category": category, "ingredients": ingredients }),
                )
                .into())
        }
    }
}

/// Estimate calories for one standard portion.
///
/// POST /menu/ai/estimate-calories
pub async fn estimate_calories(
    State(state): State<AppState>,
    payload: Result<Json<EstimateRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CaloriesData>>, AppError> {
    let request = json_body(payload)?;
    let name = required(request.name.as_ref())
        .ok_or_else(|| AppError::from(Rejection::bad_request("Name menu harus diisi")))?;
    let category = required(request.category.as_ref());
    let ingredients = request.ingredients.clone().unwrap_or_default();

    let (message, calories, reasoning) = match state
        .ai
        .estimate_calories(name, category, &ingredients)
        .await
    {
        CalorieOutcome::Estimated {
            calories,
            reasoning,
        } => ("Kalori berhasil dihitung oleh AI", Some(calories), reasoning),
        CalorieOutcome::Unavailable => ("AI tidak memberikan estimasi kalori", None, None),
        CalorieOutcome::Rejected { reason } => {
            return Err(
                Rejection::bad_request("Menu tidak valid atau tidak bisa dihitung kalorinya")
                    .reason(reason)
                    .into(),
            )
        }
    };

    Ok(Json(ApiResponse::ok(
        message,
        CaloriesData {
            name: name.to_string(),
            category: category.map(str::to_string),
            ingredients,
            estimated_calories: calories,
            reasoning,
            note: "Estimasi kalori untuk 1 porsi standar".to_string(),
        },
    )))
}

/// Recommend a selling price in IDR.
///
/// POST /menu/ai/estimate-price
pub async fn estimate_price(
    State(state): State<AppState>,
    payload: Result<Json<EstimateRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PriceData>>, AppError> {
    let request = json_body(payload)?;
    let name = required(request.name.as_ref())
        .ok_or_else(|| AppError::from(Rejection::bad_request("Nama menu harus diisi")))?;
    let category = required(request.category.as_ref());
    let ingredients = request.ingredients.clone().unwrap_or_default();

    let (price, reasoning) = match state.ai.estimate_price(name, category, &ingredients).await {
        PriceOutcome::Estimated { price, analysis } => (Some(price), analysis),
        PriceOutcome::Unavailable { analysis } => (None, Some(analysis)),
        PriceOutcome::Rejected { reason } => {
            return Err(
                Rejection::bad_request("Menu tidak valid atau tidak lazim untuk dijual")
                    .reason(reason)
                    .into(),
            )
        }
    };

    Ok(Json(ApiResponse::ok(
        "Berhasil mendapatkan saran harga",
        PriceData {
            menu: name.to_string(),
            ingredients,
            recommended_price: price,
            currency: "IDR".to_string(),
            reasoning,
        },
    )))
}
