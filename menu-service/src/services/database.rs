//! PostgreSQL access for the menu catalog.

use crate::models::{ListMenusFilter, Menu, MenuChanges, MenuPage, NewMenu, MENU_COLUMNS};
use crate::services::metrics::DB_QUERY_DURATION;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use std::time::Duration;
use tracing::{info, instrument};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "menu-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Create a pool that opens connections on first use.
    pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(database_url)
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Invalid database URL: {}", e)))?;

        Ok(Self { pool })
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["health_check"])
            .start_timer();

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;

        timer.observe_duration();
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetch one page of menus matching `filter`, plus the total match count.
    #[instrument(skip(self, filter), fields(page = filter.page, per_page = filter.per_page))]
    pub async fn list_menus(&self, filter: &ListMenusFilter) -> Result<MenuPage, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_menus"])
            .start_timer();

        let total: i64 = build_count_query(filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to count menus: {}", e)))?;

        let menus = build_list_query(filter)
            .build_query_as::<Menu>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list menus: {}", e)))?;

        timer.observe_duration();
        Ok(MenuPage { menus, total })
    }

    /// Every menu, ordered by category then id.
    #[instrument(skip(self))]
    pub async fn list_all_by_category(&self) -> Result<Vec<Menu>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_all_by_category"])
            .start_timer();

        let menus = sqlx::query_as::<_, Menu>(&format!(
            "SELECT {} FROM menus ORDER BY category ASC, id ASC",
            MENU_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list menus: {}", e)))?;

        timer.observe_duration();
        Ok(menus)
    }

    /// Number of menus per category.
    #[instrument(skip(self))]
    pub async fn category_counts(&self) -> Result<Vec<(String, i64)>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["category_counts"])
            .start_timer();

        let counts = sqlx::query_as::<_, (String, i64)>(
            "SELECT category, COUNT(*) FROM menus GROUP BY category ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to count categories: {}", e))
        })?;

        timer.observe_duration();
        Ok(counts)
    }

    /// Find a menu by id.
    #[instrument(skip(self))]
    pub async fn find_menu(&self, id: i64) -> Result<Option<Menu>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_menu"])
            .start_timer();

        let menu = sqlx::query_as::<_, Menu>(&format!(
            "SELECT {} FROM menus WHERE id = $1",
            MENU_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to find menu: {}", e)))?;

        timer.observe_duration();
        Ok(menu)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert a menu and return the stored row.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn insert_menu(&self, input: &NewMenu) -> Result<Menu, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_menu"])
            .start_timer();

        let menu = sqlx::query_as::<_, Menu>(&format!(
            r#"
            INSERT INTO menus (name, category, description, ingredients, calories, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            MENU_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.category)
        .bind(&input.description)
        .bind(&input.ingredients)
        .bind(input.calories)
        .bind(input.price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create menu: {}", e)))?;

        timer.observe_duration();
        info!(menu_id = menu.id, name = %menu.name, "Menu created");

        Ok(menu)
    }

    /// Apply `changes` and bump `updated_at`. Returns `None` when the id does not exist.
    #[instrument(skip(self, changes))]
    pub async fn update_menu(
        &self,
        id: i64,
        changes: &MenuChanges,
    ) -> Result<Option<Menu>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_menu"])
            .start_timer();

        let menu = build_update_query(id, changes)
            .build_query_as::<Menu>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update menu: {}", e)))?;

        timer.observe_duration();
        Ok(menu)
    }

    /// Delete a menu. Returns the deleted menu's name, or `None` when it did not exist.
    #[instrument(skip(self))]
    pub async fn delete_menu(&self, id: i64) -> Result<Option<String>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_menu"])
            .start_timer();

        let name = sqlx::query_scalar::<_, String>("DELETE FROM menus WHERE id = $1 RETURNING name")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to delete menu: {}", e)))?;

        timer.observe_duration();
        if let Some(name) = &name {
            info!(menu_id = id, name = %name, "Menu deleted");
        }
        Ok(name)
    }
}

// =============================================================================
// Query builders
// =============================================================================

/// Escape LIKE wildcards so a search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ListMenusFilter) {
    qb.push(" WHERE TRUE");

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category) = &filter.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(min_price) = filter.min_price {
        qb.push(" AND price >= ").push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        qb.push(" AND price <= ").push_bind(max_price);
    }
    if let Some(max_calories) = filter.max_calories {
        qb.push(" AND calories <= ").push_bind(max_calories);
    }
}

fn build_count_query(filter: &ListMenusFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM menus");
    push_filters(&mut qb, filter);
    qb
}

fn build_list_query(filter: &ListMenusFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM menus", MENU_COLUMNS));
    push_filters(&mut qb, filter);

    match filter.sort {
        Some(sort) => {
            qb.push(format!(
                " ORDER BY {} {} NULLS LAST, id ASC",
                sort.field.as_str(),
                if sort.ascending { "ASC" } else { "DESC" }
            ));
        }
        None => {
            qb.push(" ORDER BY id ASC");
        }
    }

    qb.push(" LIMIT ")
        .push_bind(filter.per_page)
        .push(" OFFSET ")
        .push_bind(filter.offset());
    qb
}

fn build_update_query(id: i64, changes: &MenuChanges) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE menus SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(name) = &changes.name {
            set.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(category) = &changes.category {
            set.push("category = ").push_bind_unseparated(category.clone());
        }
        if let Some(description) = &changes.description {
            set.push("description = ")
                .push_bind_unseparated(description.clone());
        }
        if let Some(ingredients) = &changes.ingredients {
            set.push("ingredients = ")
                .push_bind_unseparated(ingredients.clone());
        }
        if let Some(calories) = changes.calories {
            set.push("calories = ").push_bind_unseparated(calories);
        }
        if let Some(price) = changes.price {
            set.push("price = ").push_bind_unseparated(price);
        }
        set.push("updated_at = NOW()");
    }
    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(format!(" RETURNING {}", MENU_COLUMNS));
    qb
}
