use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use tableside_core::domain::menu::{Category, CategoryId, LocalizedText, MenuItem, MenuItemId};

use super::{decode_error, parse_decimal, MenuRepository, RepositoryError};
use crate::DbPool;

const ITEM_COLUMNS: &str = "id, category_id, name_en, name_ur, name_ar, description_en,
                            description_ur, description_ar, price, available";

pub struct SqlMenuRepository {
    pool: DbPool,
}

impl SqlMenuRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_category(row: &SqliteRow) -> Result<Category, RepositoryError> {
    let position: i64 = row.try_get("position").map_err(decode_error)?;
    Ok(Category {
        id: CategoryId(row.try_get("id").map_err(decode_error)?),
        name: row.try_get("name").map_err(decode_error)?,
        active: row.try_get("active").map_err(decode_error)?,
        position: u32::try_from(position)
            .map_err(|_| RepositoryError::Decode(format!("category position {position}")))?,
    })
}

fn row_to_item(row: &SqliteRow) -> Result<MenuItem, RepositoryError> {
    let price: String = row.try_get("price").map_err(decode_error)?;
    Ok(MenuItem {
        id: MenuItemId(row.try_get("id").map_err(decode_error)?),
        category: CategoryId(row.try_get("category_id").map_err(decode_error)?),
        name: LocalizedText {
            en: row.try_get("name_en").map_err(decode_error)?,
            ur: row.try_get("name_ur").map_err(decode_error)?,
            ar: row.try_get("name_ar").map_err(decode_error)?,
        },
        description: LocalizedText {
            en: row.try_get("description_en").map_err(decode_error)?,
            ur: row.try_get("description_ur").map_err(decode_error)?,
            ar: row.try_get("description_ar").map_err(decode_error)?,
        },
        price: parse_decimal("menu_item.price", &price)?,
        available: row.try_get("available").map_err(decode_error)?,
    })
}

#[async_trait::async_trait]
impl MenuRepository for SqlMenuRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, active, position FROM menu_category ORDER BY position ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_category).collect()
    }

    async fn save_category(&self, category: Category) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO menu_category (id, name, active, position)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 active = excluded.active,
                 position = excluded.position",
        )
        .bind(&category.id.0)
        .bind(&category.name)
        .bind(category.active)
        .bind(i64::from(category.position))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_category(&self, id: &CategoryId) -> Result<(), RepositoryError> {
        let items: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM menu_item WHERE category_id = ?")
                .bind(&id.0)
                .fetch_one(&self.pool)
                .await?;
        if items > 0 {
            return Err(RepositoryError::Conflict(format!(
                "category `{}` still has {items} item(s)",
                id.0
            )));
        }

        let result =
            sqlx::query("DELETE FROM menu_category WHERE id = ?")
                .bind(&id.0)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("category `{}`", id.0)));
        }
        Ok(())
    }

    async fn list_items(&self) -> Result<Vec<MenuItem>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM menu_item ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_item).collect()
    }

    async fn find_item(&self, id: &MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM menu_item WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_item).transpose()
    }

    async fn save_item(&self, item: MenuItem) -> Result<(), RepositoryError> {
        let category_exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM menu_category WHERE id = ?")
                .bind(&item.category.0)
                .fetch_one(&self.pool)
                .await?;
        if category_exists == 0 {
            return Err(RepositoryError::NotFound(format!("category `{}`", item.category.0)));
        }

        sqlx::query(
            "INSERT INTO menu_item (id, category_id, name_en, name_ur, name_ar, description_en,
                                    description_ur, description_ar, price, available)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 category_id = excluded.category_id,
                 name_en = excluded.name_en,
                 name_ur = excluded.name_ur,
                 name_ar = excluded.name_ar,
                 description_en = excluded.description_en,
                 description_ur = excluded.description_ur,
                 description_ar = excluded.description_ar,
                 price = excluded.price,
                 available = excluded.available",
        )
        .bind(&item.id.0)
        .bind(&item.category.0)
        .bind(&item.name.en)
        .bind(&item.name.ur)
        .bind(&item.name.ar)
        .bind(&item.description.en)
        .bind(&item.description.ur)
        .bind(&item.description.ar)
        .bind(item.price.to_string())
        .bind(item.available)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_item(&self, id: &MenuItemId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM menu_item WHERE id = ?")
                .bind(&id.0)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("menu item `{}`", id.0)));
        }
        Ok(())
    }
}
