use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use common::invite::{InviteCode, InviteRecord, InviteStatus, InviteStore, InviteStoreError};

use super::Database;

#[derive(Debug, sqlx::FromRow)]
struct InviteRow {
    code: String,
    parent_id: String,
    status: String,
    created_at: OffsetDateTime,
    expires_at: Option<OffsetDateTime>,
}

impl From<InviteRow> for InviteRecord {
    fn from(row: InviteRow) -> Self {
        InviteRecord {
            parent_id: Uuid::parse_str(&row.parent_id).expect("invalid parent id in database"),
            code: InviteCode::parse(&row.code).expect("invalid invite code in database"),
            status: match row.status.as_str() {
                "active" => InviteStatus::Active,
                "superseded" => InviteStatus::Superseded,
                other => panic!("invalid invite status in database: {}", other),
            },
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

fn status_str(status: InviteStatus) -> &'static str {
    match status {
        InviteStatus::Active => "active",
        InviteStatus::Superseded => "superseded",
    }
}

#[async_trait]
impl InviteStore for Database {
    type Error = sqlx::Error;

    async fn put_active(&self, record: InviteRecord) -> Result<(), InviteStoreError<Self::Error>> {
        // Supersede-then-insert as one transaction, so concurrent
        // generators serialize and no instant ever shows two active
        // rows (or an active row that is also superseded).
        let mut tx = self
            .begin()
            .await
            .map_err(InviteStoreError::Provider)?;

        sqlx::query(
            r#"
            UPDATE invite_codes
            SET status = 'superseded'
            WHERE parent_id = $1 AND status = 'active'
            "#,
        )
        .bind(record.parent_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(InviteStoreError::Provider)?;

        let insert = sqlx::query(
            r#"
            INSERT INTO invite_codes (code, parent_id, status, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.code.as_str())
        .bind(record.parent_id.to_string())
        .bind(status_str(record.status))
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&mut *tx)
        .await;

        match insert {
            Ok(_) => {}
            Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
                // code value taken; the transaction rolls back on drop
                return Err(InviteStoreError::Collision);
            }
            Err(e) => return Err(InviteStoreError::Provider(e)),
        }

        tx.commit().await.map_err(InviteStoreError::Provider)?;
        Ok(())
    }

    async fn lookup(
        &self,
        code: &InviteCode,
    ) -> Result<Option<InviteRecord>, InviteStoreError<Self::Error>> {
        let row = sqlx::query_as::<_, InviteRow>(
            r#"
            SELECT code, parent_id, status, created_at, expires_at
            FROM invite_codes
            WHERE code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&**self)
        .await
        .map_err(InviteStoreError::Provider)?;

        Ok(row.map(Into::into))
    }

    async fn current_for(
        &self,
        parent_id: Uuid,
    ) -> Result<Option<InviteRecord>, InviteStoreError<Self::Error>> {
        let row = sqlx::query_as::<_, InviteRow>(
            r#"
            SELECT code, parent_id, status, created_at, expires_at
            FROM invite_codes
            WHERE parent_id = $1 AND status = 'active'
            "#,
        )
        .bind(parent_id.to_string())
        .fetch_optional(&**self)
        .await
        .map_err(InviteStoreError::Provider)?;

        // lazy expiry: a lapsed active row reads as absent
        let now = OffsetDateTime::now_utc();
        Ok(row
            .map(InviteRecord::from)
            .filter(|r| r.is_redeemable(now)))
    }
}
