use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use tableside_core::domain::deal::{Deal, DealId};
use tableside_core::domain::menu::{LocalizedText, MenuItemId};

use super::{decode_error, parse_decimal, DealRepository, RepositoryError};
use crate::DbPool;

const DEAL_COLUMNS: &str = "id, name_en, name_ur, name_ar, description_en, description_ur,
                            description_ar, price, discount_percent, active, position";

pub struct SqlDealRepository {
    pool: DbPool,
}

impl SqlDealRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn constituents(&self, deal_id: &str) -> Result<Vec<MenuItemId>, RepositoryError> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT menu_item_id FROM deal_item WHERE deal_id = ? ORDER BY position ASC",
        )
        .bind(deal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(MenuItemId).collect())
    }
}

fn row_to_deal(
    row: &SqliteRow,
    applicable_items: Vec<MenuItemId>,
) -> Result<Deal, RepositoryError> {
    let price: String = row.try_get("price").map_err(decode_error)?;
    let discount: String = row.try_get("discount_percent").map_err(decode_error)?;
    let position: i64 = row.try_get("position").map_err(decode_error)?;

    Ok(Deal {
        id: DealId(row.try_get("id").map_err(decode_error)?),
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
        price: parse_decimal("deal.price", &price)?,
        discount_percent: parse_decimal("deal.discount_percent", &discount)?,
        applicable_items,
        active: row.try_get("active").map_err(decode_error)?,
        position: u32::try_from(position)
            .map_err(|_| RepositoryError::Decode(format!("deal position {position}")))?,
    })
}

#[async_trait::async_trait]
impl DealRepository for SqlDealRepository {
    async fn find(&self, id: &DealId) -> Result<Option<Deal>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {DEAL_COLUMNS} FROM deal WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref row) => {
                let items = self.constituents(&id.0).await?;
                Ok(Some(row_to_deal(row, items)?))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Deal>, RepositoryError> {
        let rows =
            sqlx::query(&format!("SELECT {DEAL_COLUMNS} FROM deal ORDER BY position ASC, id ASC"))
                .fetch_all(&self.pool)
                .await?;

        let mut deals = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row.try_get("id").map_err(decode_error)?;
            let items = self.constituents(&id).await?;
            deals.push(row_to_deal(row, items)?);
        }
        Ok(deals)
    }

    async fn save(&self, deal: Deal) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO deal (id, name_en, name_ur, name_ar, description_en, description_ur,
                               description_ar, price, discount_percent, active, position)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name_en = excluded.name_en,
                 name_ur = excluded.name_ur,
                 name_ar = excluded.name_ar,
                 description_en = excluded.description_en,
                 description_ur = excluded.description_ur,
                 description_ar = excluded.description_ar,
                 price = excluded.price,
                 discount_percent = excluded.discount_percent,
                 active = excluded.active,
                 position = excluded.position",
        )
        .bind(&deal.id.0)
        .bind(&deal.name.en)
        .bind(&deal.name.ur)
        .bind(&deal.name.ar)
        .bind(&deal.description.en)
        .bind(&deal.description.ur)
        .bind(&deal.description.ar)
        .bind(deal.price.to_string())
        .bind(deal.discount_percent.to_string())
        .bind(deal.active)
        .bind(i64::from(deal.position))
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM deal_item WHERE deal_id = ?")
            .bind(&deal.id.0)
            .execute(&mut *tx)
            .await?;

        for (position, item_id) in deal.applicable_items.iter().enumerate() {
            sqlx::query("INSERT INTO deal_item (deal_id, position, menu_item_id) VALUES (?, ?, ?)")
                .bind(&deal.id.0)
                .bind(position as i64)
                .bind(&item_id.0)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: &DealId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM deal WHERE id = ?").bind(&id.0).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("deal `{}`", id.0)));
        }
        Ok(())
    }
}
