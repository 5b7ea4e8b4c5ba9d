use time::OffsetDateTime;
use uuid::Uuid;

use common::prelude::{LinkedAccount, Role};

use super::Database;

/// A stored account row.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_hash: String,
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: String,
    email: String,
    name: String,
    role: String,
    password_hash: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: Uuid::parse_str(&row.id).expect("invalid account id in database"),
            email: row.email,
            name: row.name,
            role: row.role.parse().expect("invalid role in database"),
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Database {
    /// Insert a new account. Email uniqueness is enforced by the schema;
    /// a duplicate surfaces as a unique-violation database error.
    pub async fn create_account(&self, new: NewAccount) -> Result<Account, sqlx::Error> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        let email = new.email.trim().to_ascii_lowercase();

        sqlx::query(
            r#"
            INSERT INTO accounts (id, email, name, role, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id.to_string())
        .bind(&email)
        .bind(&new.name)
        .bind(new.role.as_str())
        .bind(&new.password_hash)
        .bind(now)
        .bind(now)
        .execute(&**self)
        .await?;

        Ok(Account {
            id,
            email,
            name: new.name,
            role: new.role,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn account_by_email(&self, email: &str) -> Result<Option<Account>, sqlx::Error> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, name, role, password_hash, created_at, updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email.trim().to_ascii_lowercase())
        .fetch_optional(&**self)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn account_by_id(&self, id: Uuid) -> Result<Option<Account>, sqlx::Error> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, name, role, password_hash, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&**self)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Public views of the children linked to a parent, oldest link
    /// first. Powers the dashboard and parent-side profile composition.
    pub async fn linked_children(
        &self,
        parent_id: Uuid,
    ) -> Result<Vec<LinkedAccount>, sqlx::Error> {
        #[derive(sqlx::FromRow)]
        struct ChildRow {
            id: String,
            name: String,
            email: String,
            linked_at: OffsetDateTime,
        }

        let rows = sqlx::query_as::<_, ChildRow>(
            r#"
            SELECT a.id, a.name, a.email, r.created_at AS linked_at
            FROM relationships r
            INNER JOIN accounts a ON a.id = r.child_id
            WHERE r.parent_id = $1
            ORDER BY r.created_at ASC
            "#,
        )
        .bind(parent_id.to_string())
        .fetch_all(&**self)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LinkedAccount {
                id: Uuid::parse_str(&r.id).expect("invalid account id in database"),
                name: r.name,
                email: r.email,
                linked_at: r.linked_at,
            })
            .collect())
    }

    /// Public view of the parent a child is linked to, if any.
    pub async fn linked_parent(
        &self,
        child_id: Uuid,
    ) -> Result<Option<LinkedAccount>, sqlx::Error> {
        #[derive(sqlx::FromRow)]
        struct ParentRow {
            id: String,
            name: String,
            email: String,
            linked_at: OffsetDateTime,
        }

        let row = sqlx::query_as::<_, ParentRow>(
            r#"
            SELECT a.id, a.name, a.email, r.created_at AS linked_at
            FROM relationships r
            INNER JOIN accounts a ON a.id = r.parent_id
            WHERE r.child_id = $1
            "#,
        )
        .bind(child_id.to_string())
        .fetch_optional(&**self)
        .await?;

        Ok(row.map(|r| LinkedAccount {
            id: Uuid::parse_str(&r.id).expect("invalid account id in database"),
            name: r.name,
            email: r.email,
            linked_at: r.linked_at,
        }))
    }
}
