use time::OffsetDateTime;
use uuid::Uuid;

use super::Database;

/// A stored note row.
#[derive(Debug, Clone)]
pub struct NoteRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub folder_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewNote {
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub folder_id: Option<Uuid>,
    pub tags: Vec<String>,
}

/// Partial update. Absent fields keep their stored value; `folder_id`
/// uses a double option so a note can be moved out of its folder.
#[derive(Debug, Clone, Default)]
pub struct UpdateNote {
    pub title: Option<String>,
    pub content: Option<String>,
    pub folder_id: Option<Option<Uuid>>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, sqlx::FromRow)]
struct NoteRow {
    id: String,
    owner_id: String,
    title: String,
    content: String,
    folder_id: Option<String>,
    tags: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<NoteRow> for NoteRecord {
    fn from(row: NoteRow) -> Self {
        NoteRecord {
            id: Uuid::parse_str(&row.id).expect("invalid note id in database"),
            owner_id: Uuid::parse_str(&row.owner_id).expect("invalid owner id in database"),
            title: row.title,
            content: row.content,
            folder_id: row
                .folder_id
                .map(|f| Uuid::parse_str(&f).expect("invalid folder id in database")),
            tags: serde_json::from_str(&row.tags).expect("invalid tag list in database"),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn tags_json(tags: &[String]) -> String {
    serde_json::to_string(tags).expect("tag list is always serializable")
}

const NOTE_COLUMNS: &str = "id, owner_id, title, content, folder_id, tags, created_at, updated_at";

impl Database {
    pub async fn create_note(&self, new: NewNote) -> Result<NoteRecord, sqlx::Error> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        sqlx::query(
            r#"
            INSERT INTO notes (id, owner_id, title, content, folder_id, tags, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id.to_string())
        .bind(new.owner_id.to_string())
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.folder_id.map(|f| f.to_string()))
        .bind(tags_json(&new.tags))
        .bind(now)
        .bind(now)
        .execute(&**self)
        .await?;

        Ok(NoteRecord {
            id,
            owner_id: new.owner_id,
            title: new.title,
            content: new.content,
            folder_id: new.folder_id,
            tags: new.tags,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn note_by_id(&self, id: Uuid) -> Result<Option<NoteRecord>, sqlx::Error> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT id, owner_id, title, content, folder_id, tags, created_at, updated_at
            FROM notes
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&**self)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Notes belonging to any of the scoped owners, newest change first.
    /// Optional folder and tag filters; the tag filter walks the stored
    /// JSON array with json_each.
    pub async fn notes_for_owners(
        &self,
        owners: &[Uuid],
        folder_id: Option<Uuid>,
        tag: Option<&str>,
    ) -> Result<Vec<NoteRecord>, sqlx::Error> {
        if owners.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = sqlx::QueryBuilder::new(format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE owner_id IN ("
        ));

        let mut separated = builder.separated(", ");
        for owner in owners {
            separated.push_bind(owner.to_string());
        }
        builder.push(")");

        if let Some(folder_id) = folder_id {
            builder.push(" AND folder_id = ");
            builder.push_bind(folder_id.to_string());
        }

        if let Some(tag) = tag {
            builder.push(" AND EXISTS (SELECT 1 FROM json_each(notes.tags) WHERE json_each.value = ");
            builder.push_bind(tag);
            builder.push(")");
        }

        builder.push(" ORDER BY updated_at DESC");

        let rows: Vec<NoteRow> = builder.build_query_as().fetch_all(&**self).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Distinct tags across the scoped owners' notes, sorted.
    pub async fn tags_for_owners(&self, owners: &[Uuid]) -> Result<Vec<String>, sqlx::Error> {
        if owners.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = sqlx::QueryBuilder::new(
            "SELECT DISTINCT json_each.value FROM notes, json_each(notes.tags) WHERE owner_id IN (",
        );

        let mut separated = builder.separated(", ");
        for owner in owners {
            separated.push_bind(owner.to_string());
        }
        builder.push(") ORDER BY json_each.value ASC");

        builder.build_query_scalar().fetch_all(&**self).await
    }

    /// Apply a partial update to an already-fetched note and persist the
    /// merged row. Callers authorize against the fetched record first.
    pub async fn update_note(
        &self,
        mut note: NoteRecord,
        changes: UpdateNote,
    ) -> Result<NoteRecord, sqlx::Error> {
        if let Some(title) = changes.title {
            note.title = title;
        }
        if let Some(content) = changes.content {
            note.content = content;
        }
        if let Some(folder_id) = changes.folder_id {
            note.folder_id = folder_id;
        }
        if let Some(tags) = changes.tags {
            note.tags = tags;
        }
        note.updated_at = OffsetDateTime::now_utc();

        sqlx::query(
            r#"
            UPDATE notes
            SET title = $1, content = $2, folder_id = $3, tags = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.folder_id.map(|f| f.to_string()))
        .bind(tags_json(&note.tags))
        .bind(note.updated_at)
        .bind(note.id.to_string())
        .execute(&**self)
        .await?;

        Ok(note)
    }

    pub async fn delete_note(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id.to_string())
            .execute(&**self)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
