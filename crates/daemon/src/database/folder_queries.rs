use time::OffsetDateTime;
use uuid::Uuid;

use super::Database;

/// A stored folder row.
#[derive(Debug, Clone)]
pub struct FolderRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub parent_folder_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewFolder {
    pub owner_id: Uuid,
    pub name: String,
    pub parent_folder_id: Option<Uuid>,
}

/// Partial update; `parent_folder_id` uses a double option so a folder
/// can be moved back to the top level.
#[derive(Debug, Clone, Default)]
pub struct UpdateFolder {
    pub name: Option<String>,
    pub parent_folder_id: Option<Option<Uuid>>,
}

#[derive(Debug, sqlx::FromRow)]
struct FolderRow {
    id: String,
    owner_id: String,
    name: String,
    parent_folder_id: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<FolderRow> for FolderRecord {
    fn from(row: FolderRow) -> Self {
        FolderRecord {
            id: Uuid::parse_str(&row.id).expect("invalid folder id in database"),
            owner_id: Uuid::parse_str(&row.owner_id).expect("invalid owner id in database"),
            name: row.name,
            parent_folder_id: row
                .parent_folder_id
                .map(|f| Uuid::parse_str(&f).expect("invalid folder id in database")),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Database {
    pub async fn create_folder(&self, new: NewFolder) -> Result<FolderRecord, sqlx::Error> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        sqlx::query(
            r#"
            INSERT INTO folders (id, owner_id, name, parent_folder_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id.to_string())
        .bind(new.owner_id.to_string())
        .bind(&new.name)
        .bind(new.parent_folder_id.map(|f| f.to_string()))
        .bind(now)
        .bind(now)
        .execute(&**self)
        .await?;

        Ok(FolderRecord {
            id,
            owner_id: new.owner_id,
            name: new.name,
            parent_folder_id: new.parent_folder_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn folder_by_id(&self, id: Uuid) -> Result<Option<FolderRecord>, sqlx::Error> {
        let row = sqlx::query_as::<_, FolderRow>(
            r#"
            SELECT id, owner_id, name, parent_folder_id, created_at, updated_at
            FROM folders
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&**self)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Folders belonging to any of the scoped owners, by name.
    pub async fn folders_for_owners(
        &self,
        owners: &[Uuid],
    ) -> Result<Vec<FolderRecord>, sqlx::Error> {
        if owners.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = sqlx::QueryBuilder::new(
            "SELECT id, owner_id, name, parent_folder_id, created_at, updated_at \
             FROM folders WHERE owner_id IN (",
        );

        let mut separated = builder.separated(", ");
        for owner in owners {
            separated.push_bind(owner.to_string());
        }
        builder.push(") ORDER BY name ASC");

        let rows: Vec<FolderRow> = builder.build_query_as().fetch_all(&**self).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn update_folder(
        &self,
        mut folder: FolderRecord,
        changes: UpdateFolder,
    ) -> Result<FolderRecord, sqlx::Error> {
        if let Some(name) = changes.name {
            folder.name = name;
        }
        if let Some(parent_folder_id) = changes.parent_folder_id {
            folder.parent_folder_id = parent_folder_id;
        }
        folder.updated_at = OffsetDateTime::now_utc();

        sqlx::query(
            r#"
            UPDATE folders
            SET name = $1, parent_folder_id = $2, updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(&folder.name)
        .bind(folder.parent_folder_id.map(|f| f.to_string()))
        .bind(folder.updated_at)
        .bind(folder.id.to_string())
        .execute(&**self)
        .await?;

        Ok(folder)
    }

    /// Delete a folder, detaching its notes and child folders rather
    /// than cascading into them.
    pub async fn delete_folder(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = self.begin().await?;

        sqlx::query("UPDATE notes SET folder_id = NULL WHERE folder_id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE folders SET parent_folder_id = NULL WHERE parent_folder_id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
