pub mod ai;
pub mod menu;

pub use ai::{CaloriesData, DescriptionData, EstimateRequest, GenerateDescriptionRequest, PriceData};
pub use menu::{
    AiAssistance, ApiResponse, CreateMenuRequest, CreateMenuResponse, GroupByCategoryParams,
    GroupSummary, GroupedMenuResponse, ListFiltersApplied, MenuListParams, MenuListResponse,
    MenuResponse, MenuSearchParams, MessageResponse, Pagination, PriceRange, SearchFiltersApplied,
    UpdateMenuRequest,
};
