use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use common::prelude::{FamilyView, Identity, Relationship, RelationshipStore, Role};

use common::family::RelationshipStoreError;

use super::Database;

#[derive(Debug, sqlx::FromRow)]
struct RelationshipRow {
    parent_id: String,
    child_id: String,
    created_at: OffsetDateTime,
}

impl From<RelationshipRow> for Relationship {
    fn from(row: RelationshipRow) -> Self {
        Relationship {
            parent_id: Uuid::parse_str(&row.parent_id).expect("invalid parent id in database"),
            child_id: Uuid::parse_str(&row.child_id).expect("invalid child id in database"),
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl RelationshipStore for Database {
    type Error = sqlx::Error;

    async fn link(
        &self,
        parent_id: Uuid,
        child_id: Uuid,
    ) -> Result<Relationship, RelationshipStoreError<Self::Error>> {
        let created_at = OffsetDateTime::now_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO relationships (child_id, parent_id, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(child_id.to_string())
        .bind(parent_id.to_string())
        .bind(created_at)
        .execute(&**self)
        .await;

        match result {
            Ok(_) => Ok(Relationship {
                parent_id,
                child_id,
                created_at,
            }),
            // child_id primary key: the child already has an edge
            Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
                Err(RelationshipStoreError::ChildTaken)
            }
            Err(e) => Err(RelationshipStoreError::Provider(e)),
        }
    }

    async fn unlink_child(
        &self,
        child_id: Uuid,
    ) -> Result<bool, RelationshipStoreError<Self::Error>> {
        let result = sqlx::query("DELETE FROM relationships WHERE child_id = $1")
            .bind(child_id.to_string())
            .execute(&**self)
            .await
            .map_err(RelationshipStoreError::Provider)?;

        Ok(result.rows_affected() > 0)
    }

    async fn unlink_edge(
        &self,
        parent_id: Uuid,
        child_id: Uuid,
    ) -> Result<bool, RelationshipStoreError<Self::Error>> {
        // both endpoints in the WHERE clause; never a read-then-delete
        let result = sqlx::query(
            "DELETE FROM relationships WHERE child_id = $1 AND parent_id = $2",
        )
        .bind(child_id.to_string())
        .bind(parent_id.to_string())
        .execute(&**self)
        .await
        .map_err(RelationshipStoreError::Provider)?;

        Ok(result.rows_affected() > 0)
    }

    async fn unlink_parent(
        &self,
        parent_id: Uuid,
    ) -> Result<usize, RelationshipStoreError<Self::Error>> {
        let result = sqlx::query("DELETE FROM relationships WHERE parent_id = $1")
            .bind(parent_id.to_string())
            .execute(&**self)
            .await
            .map_err(RelationshipStoreError::Provider)?;

        Ok(result.rows_affected() as usize)
    }

    async fn parent_of(
        &self,
        child_id: Uuid,
    ) -> Result<Option<Relationship>, RelationshipStoreError<Self::Error>> {
        let row = sqlx::query_as::<_, RelationshipRow>(
            r#"
            SELECT parent_id, child_id, created_at
            FROM relationships
            WHERE child_id = $1
            "#,
        )
        .bind(child_id.to_string())
        .fetch_optional(&**self)
        .await
        .map_err(RelationshipStoreError::Provider)?;

        Ok(row.map(Into::into))
    }

    async fn children_of(
        &self,
        parent_id: Uuid,
    ) -> Result<Vec<Relationship>, RelationshipStoreError<Self::Error>> {
        let rows = sqlx::query_as::<_, RelationshipRow>(
            r#"
            SELECT parent_id, child_id, created_at
            FROM relationships
            WHERE parent_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(parent_id.to_string())
        .fetch_all(&**self)
        .await
        .map_err(RelationshipStoreError::Provider)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

impl Database {
    /// Load the requester's relationship snapshot for this request.
    /// Computed fresh every time; authorization decisions must never
    /// reuse a view across requests.
    pub async fn family_view(&self, requester: &Identity) -> Result<FamilyView, sqlx::Error> {
        match requester.role {
            Role::Parent => {
                let edges = self.children_of(requester.id).await.map_err(flatten)?;
                Ok(FamilyView::for_parent(
                    edges.into_iter().map(|e| e.child_id),
                ))
            }
            Role::Child => {
                let edge = self.parent_of(requester.id).await.map_err(flatten)?;
                Ok(FamilyView::for_child(edge.map(|e| e.parent_id)))
            }
        }
    }
}

// reads never hit the ChildTaken arm
fn flatten(e: RelationshipStoreError<sqlx::Error>) -> sqlx::Error {
    match e {
        RelationshipStoreError::Provider(e) => e,
        RelationshipStoreError::ChildTaken => sqlx::Error::RowNotFound,
    }
}
