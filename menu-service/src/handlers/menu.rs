//! Menu catalog handlers.

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::{
    extract::{rejection::JsonRejection, Json, Path, Query, State},
    http::StatusCode,
};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use service_core::error::{AppError, Rejection};
use tracing::{info, warn};
use validator::Validate;

use crate::dtos::{
    ApiResponse, CreateMenuRequest, CreateMenuResponse, GroupByCategoryParams, GroupSummary,
    GroupedMenuResponse, ListFiltersApplied, MenuListParams, MenuListResponse, MenuResponse,
    MenuSearchParams, MessageResponse, Pagination, PriceRange, SearchFiltersApplied,
    UpdateMenuRequest,
};
use crate::models::{ListMenusFilter, MenuChanges, MenuSort, NewMenu};
use crate::services::metrics::record_menu_created;
use crate::startup::AppState;
use crate::validation::validate_new_menu;

use super::{failed, json_body};

const DEFAULT_PER_PAGE: i64 = 10;
const MAX_PER_PAGE: i64 = 100;
/// Largest page whose offset still fits in an `i64`.
const MAX_PAGE: i64 = i64::MAX / MAX_PER_PAGE;
const DEFAULT_SORT: &str = "created_at:desc";
const GROUPING_FAILED: &str = "Gagal mengelompokkan menu";

// ============================================================================
// Query helpers
// ============================================================================

/// Non-blank query value.
fn present(raw: Option<&String>) -> Option<&str> {
    raw.map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// Parse a query value, ignoring blanks and malformed numbers.
fn parse_query<T: FromStr>(raw: Option<&String>) -> Option<T> {
    present(raw).and_then(|s| s.trim().parse().ok())
}

fn page_bounds(page: Option<&String>, per_page: Option<&String>) -> (i64, i64) {
    let page = parse_query::<i64>(page)
        .filter(|p| *p >= 1)
        .unwrap_or(1)
        .min(MAX_PAGE);
    let per_page = parse_query::<i64>(per_page)
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    (page, per_page)
}

/// Path ids that are not numbers can never match a row.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim().parse().map_err(|_| menu_not_found())
}

fn menu_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Menu tidak ditemukan"))
}

async fn fetch_page(
    state: &AppState,
    filter: &ListMenusFilter,
) -> Result<(Vec<MenuResponse>, Pagination), AppError> {
    let page = state.db.list_menus(filter).await?;
    let pagination = Pagination::new(page.total, filter.page, filter.per_page);
    let data = page.menus.into_iter().map(MenuResponse::from).collect();
    Ok((data, pagination))
}

// ============================================================================
// Reads
// ============================================================================

/// List menus with filters, sorting and pagination.
///
/// GET /menu
pub async fn list_menus(
    State(state): State<AppState>,
    Query(params): Query<MenuListParams>,
) -> Result<Json<MenuListResponse<ListFiltersApplied>>, AppError> {
    let (page, per_page) = page_bounds(params.page.as_ref(), params.per_page.as_ref());
    let sort = present(params.sort.as_ref()).unwrap_or(DEFAULT_SORT).to_string();

    let filter = ListMenusFilter {
        search: present(params.q.as_ref()).map(str::to_string),
        category: present(params.category.as_ref()).map(str::to_string),
        min_price: parse_query(params.min_price.as_ref()),
        max_price: parse_query(params.max_price.as_ref()),
        max_calories: parse_query(params.max_cal.as_ref()),
        sort: MenuSort::parse(&sort),
        page,
        per_page,
    };

    let (data, pagination) = fetch_page(&state, &filter)
        .await
        .map_err(failed("Gagal mengambil data menu"))?;

    Ok(Json(MenuListResponse {
        success: true,
        message: "Berhasil mengambil data menu".to_string(),
        data,
        pagination,
        filters_applied: ListFiltersApplied {
            search: filter.search,
            category: filter.category,
            price_range: PriceRange {
                min: filter.min_price,
                max: filter.max_price,
            },
            max_calories: filter.max_calories,
            sort,
        },
    }))
}

/// Search menus by keyword, category and price range.
///
/// GET /menu/search
pub async fn search_menus(
    State(state): State<AppState>,
    Query(params): Query<MenuSearchParams>,
) -> Result<Json<MenuListResponse<SearchFiltersApplied>>, AppError> {
    let (page, per_page) = page_bounds(params.page.as_ref(), params.per_page.as_ref());
    let search = present(params.q.as_ref()).map(|s| s.trim().to_string());

    let filter = ListMenusFilter {
        search: search.clone(),
        category: present(params.category.as_ref()).map(|s| s.trim().to_string()),
        min_price: parse_query(params.min_price.as_ref()),
        max_price: parse_query(params.max_price.as_ref()),
        max_calories: None,
        sort: Some(MenuSort::default()),
        page,
        per_page,
    };

    let (data, pagination) = fetch_page(&state, &filter)
        .await
        .map_err(failed("Gagal melakukan pencarian"))?;

    let message = if search.is_some() {
        "Berhasil melakukan pencarian"
    } else {
        "Berhasil mengambil semua menu"
    };

    Ok(Json(MenuListResponse {
        success: true,
        message: message.to_string(),
        data,
        pagination,
        filters_applied: SearchFiltersApplied {
            search: filter.search,
            category: filter.category,
            price_range: PriceRange {
                min: filter.min_price,
                max: filter.max_price,
            },
        },
    }))
}

/// Number of menus per category.
///
/// GET /menu/stats/category-counts
pub async fn category_counts(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let counts: BTreeMap<String, i64> = state
        .db
        .category_counts()
        .await
        .map_err(failed("Gagal menghitung menu per kategori"))?
        .into_iter()
        .collect();
    Ok(Json(json!({ "success": true, "data": counts })))
}

async fn grouped_by_category(
    state: &AppState,
) -> Result<BTreeMap<String, Vec<MenuResponse>>, AppError> {
    let mut grouped: BTreeMap<String, Vec<MenuResponse>> = BTreeMap::new();
    for menu in state.db.list_all_by_category().await? {
        grouped
            .entry(menu.category.clone())
            .or_default()
            .push(MenuResponse::from(menu));
    }
    Ok(grouped)
}

/// Every menu keyed by category.
///
/// GET /menu/grouped
pub async fn grouped_menus(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BTreeMap<String, Vec<MenuResponse>>>>, AppError> {
    let grouped = grouped_by_category(&state)
        .await
        .map_err(failed(GROUPING_FAILED))?;
    Ok(Json(ApiResponse::ok(
        "Berhasil mengelompokkan menu berdasarkan kategori",
        grouped,
    )))
}

/// Grouped listing with an optional per-category cap, or counts with `mode=count`.
///
/// GET /menu/group-by-category
pub async fn group_by_category(
    State(state): State<AppState>,
    Query(params): Query<GroupByCategoryParams>,
) -> Result<Json<Value>, AppError> {
    if params.mode.as_deref() == Some("count") {
        let counts: BTreeMap<String, i64> = state
            .db
            .category_counts()
            .await
            .map_err(failed(GROUPING_FAILED))?
            .into_iter()
            .collect();
        return Ok(Json(json!({
            "success": true,
            "message": "Berhasil menghitung menu per kategori",
            "data": counts,
        })));
    }

    let mut grouped = grouped_by_category(&state)
        .await
        .map_err(failed(GROUPING_FAILED))?;

    let limit = present(params.per_category.as_ref())
        .or_else(|| present(params.per_page.as_ref()))
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|l| *l > 0);

    if let Some(limit) = limit {
        for items in grouped.values_mut() {
            items.truncate(limit);
        }
    }

    let summary = GroupSummary {
        total_categories: grouped.len(),
        total_items: grouped.values().map(Vec::len).sum(),
        items_per_category: limit.map(Value::from).unwrap_or_else(|| json!("all")),
    };

    let response = GroupedMenuResponse {
        success: true,
        message: "Berhasil mengelompokkan menu berdasarkan kategori".to_string(),
        data: grouped,
        summary,
    };

    serde_json::to_value(response)
        .map(Json)
        .map_err(|e| failed(GROUPING_FAILED)(AppError::InternalError(e.into())))
}

/// Fetch a single menu.
///
/// GET /menu/:id
pub async fn get_menu(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MenuResponse>>, AppError> {
    let id = parse_id(&id)?;
    let menu = state
        .db
        .find_menu(id)
        .await
        .map_err(failed("Gagal mengambil detail menu"))?
        .ok_or_else(menu_not_found)?;

    Ok(Json(ApiResponse::ok(
        "Berhasil mengambil detail menu",
        MenuResponse::from(menu),
    )))
}

// ============================================================================
// Writes
// ============================================================================

/// Create a menu, letting the AI fill in missing fields.
///
/// POST /menu
pub async fn create_menu(
    State(state): State<AppState>,
    payload: Result<Json<CreateMenuRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateMenuResponse>), AppError> {
    let request = json_body(payload)?;
    let draft = validate_new_menu(&request)?;

    info!(name = %draft.name, category = %draft.category, "Creating menu");

    let completed = state.ai.auto_complete(&draft).await;

    if completed.rejected {
        let reason = completed.rejection_reason.unwrap_or_default();
        warn!(name = %draft.name, reason = %reason, "Menu rejected by AI");
        return Err(Rejection::bad_request("Menu ditolak oleh sistem validasi AI")
            .reason(reason)
            .hint("Pastikan nama menu adalah makanan/minuman yang valid dan lazim dikonsumsi")
            .with(
                "data",
                json!({
                    "name": request.name,
                    "category": request.category,
                    "ingredients": request.ingredients.clone().unwrap_or_else(|| json!([])),
                }),
            )
            .into());
    }

    let description = match completed.description.filter(|d| !d.trim().is_empty()) {
        Some(description) => description,
        None => {
            tracing::error!(name = %draft.name, "AI failed to generate description");
            return Err(Rejection::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Gagal membuat deskripsi menu",
            )
            .reason("AI service mengalami kesalahan atau tidak dapat memahami menu ini")
            .hint("Coba tambahkan ingredients atau description manual")
            .into());
        }
    };

    let new_menu = NewMenu {
        name: draft.name,
        category: draft.category.to_lowercase(),
        description: Some(description),
        ingredients: draft.ingredients,
        calories: completed.calories,
        price: completed.price,
    };

    let menu = state
        .db
        .insert_menu(&new_menu)
        .await
        .map_err(failed("Gagal menambahkan menu"))?;
    let usage = completed.ai_used;
    record_menu_created(usage.any());

    info!(
        menu_id = menu.id,
        ai_description = usage.description,
        ai_calories = usage.calories,
        ai_price = usage.price,
        "Menu created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateMenuResponse {
            success: true,
            message: "Menu berhasil ditambahkan".to_string(),
            data: MenuResponse::from(menu),
            ai_assistance: usage.into(),
        }),
    ))
}

/// Partially update a menu.
///
/// PUT /menu/:id
pub async fn update_menu(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateMenuRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<MenuResponse>>, AppError> {
    let id = parse_id(&id)?;
    let request = json_body(payload)?.trimmed();
    request.validate()?;

    let price = match request.price {
        Some(price) => Some(
            Decimal::from_f64(price)
                .map(|p| p.round_dp(2))
                .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid price")))?,
        ),
        None => None,
    };

    let changes = MenuChanges {
        name: request.name,
        category: request.category,
        description: request.description,
        ingredients: request.ingredients,
        calories: request.calories,
        price,
    };

    let menu = state
        .db
        .update_menu(id, &changes)
        .await
        .map_err(failed("Gagal mengupdate menu"))?
        .ok_or_else(menu_not_found)?;

    info!(menu_id = id, "Menu updated");

    Ok(Json(ApiResponse::ok(
        "Menu berhasil diupdate",
        MenuResponse::from(menu),
    )))
}

/// Delete a menu.
///
/// DELETE /menu/:id
pub async fn delete_menu(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id)?;
    let name = state
        .db
        .delete_menu(id)
        .await
        .map_err(failed("Gagal menghapus menu"))?
        .ok_or_else(menu_not_found)?;

    Ok(Json(MessageResponse {
        success: true,
        message: format!("Menu '{}' berhasil dihapus", name),
    }))
}
