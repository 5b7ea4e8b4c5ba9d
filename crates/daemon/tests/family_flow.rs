//! Integration tests for the invitation and linking flow against a real
//! sqlite store.

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use common::invite::{InviteCode, InviteRecord, InviteStatus, InviteStore, InviteStoreError};
use common::prelude::{Identity, LinkError, LinkingEngine, RelationshipStore, Role};

use nestnote_daemon::database::NewAccount;
use nestnote_daemon::Database;

/// Create an in-memory test database
async fn setup_test_db() -> Database {
    let db_url = url::Url::parse("sqlite::memory:").unwrap();
    Database::connect(&db_url).await.unwrap()
}

async fn create_account(db: &Database, role: Role) -> Identity {
    let account = db
        .create_account(NewAccount {
            email: format!("{}@example.com", Uuid::new_v4()),
            name: "Test Account".to_string(),
            role,
            password_hash: "$argon2id$fake$fake".to_string(),
        })
        .await
        .unwrap();

    Identity::new(account.id, account.role)
}

fn engine(db: &Database) -> LinkingEngine<Database, Database> {
    LinkingEngine::new(db.clone(), db.clone())
}

#[tokio::test]
async fn test_generate_supersedes_previous_code() {
    let db = setup_test_db().await;
    let engine = engine(&db);
    let parent = create_account(&db, Role::Parent).await;

    let first = engine.generate_code(&parent, None).await.unwrap();
    let second = engine.generate_code(&parent, None).await.unwrap();
    assert_ne!(first.code, second.code);

    // only the fresh code is current
    let current = db.current_for(parent.id).await.unwrap().unwrap();
    assert_eq!(current.code, second.code);

    // the old row survives for history, marked superseded
    let old = db.lookup(&first.code).await.unwrap().unwrap();
    assert_eq!(old.status, InviteStatus::Superseded);
}

#[tokio::test]
async fn test_redeem_links_child_and_populates_views() {
    let db = setup_test_db().await;
    let engine = engine(&db);
    let parent = create_account(&db, Role::Parent).await;
    let child = create_account(&db, Role::Child).await;

    let record = engine
        .generate_code(&parent, Some(Duration::days(7)))
        .await
        .unwrap();
    let (redeemed, edge) = engine
        .redeem_code(&child, record.code.as_str())
        .await
        .unwrap();
    assert_eq!(redeemed.parent_id, parent.id);
    assert_eq!(edge.child_id, child.id);

    let children = db.linked_children(parent.id).await.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, child.id);

    let linked_parent = db.linked_parent(child.id).await.unwrap().unwrap();
    assert_eq!(linked_parent.id, parent.id);
}

#[tokio::test]
async fn test_same_code_links_multiple_children_in_order() {
    let db = setup_test_db().await;
    let engine = engine(&db);
    let parent = create_account(&db, Role::Parent).await;

    let record = engine.generate_code(&parent, None).await.unwrap();

    let first = create_account(&db, Role::Child).await;
    let second = create_account(&db, Role::Child).await;
    engine
        .redeem_code(&first, record.code.as_str())
        .await
        .unwrap();
    engine
        .redeem_code(&second, record.code.as_str())
        .await
        .unwrap();

    // dashboard ordering is oldest link first
    let children = db.linked_children(parent.id).await.unwrap();
    assert_eq!(children.len(), 2);
    assert!(children[0].linked_at <= children[1].linked_at);
}

#[tokio::test]
async fn test_single_parent_constraint_is_storage_enforced() {
    let db = setup_test_db().await;
    let parent_a = create_account(&db, Role::Parent).await;
    let parent_b = create_account(&db, Role::Parent).await;
    let child = create_account(&db, Role::Child).await;

    db.link(parent_a.id, child.id).await.unwrap();

    // a second insert for the same child loses at the primary key
    let result = db.link(parent_b.id, child.id).await;
    assert!(matches!(
        result,
        Err(common::family::RelationshipStoreError::ChildTaken)
    ));

    let edge = db.parent_of(child.id).await.unwrap().unwrap();
    assert_eq!(edge.parent_id, parent_a.id);
}

#[tokio::test]
async fn test_expired_code_reads_as_absent_and_unredeemable() {
    let db = setup_test_db().await;
    let engine = engine(&db);
    let parent = create_account(&db, Role::Parent).await;
    let child = create_account(&db, Role::Child).await;

    let now = OffsetDateTime::now_utc();
    let code = InviteCode::generate();
    db.put_active(InviteRecord {
        parent_id: parent.id,
        code: code.clone(),
        status: InviteStatus::Active,
        created_at: now - Duration::days(8),
        expires_at: Some(now - Duration::days(1)),
    })
    .await
    .unwrap();

    // lazy expiry: still stored, but never surfaced as current
    assert!(db.current_for(parent.id).await.unwrap().is_none());
    assert!(db.lookup(&code).await.unwrap().is_some());

    let result = engine.redeem_code(&child, code.as_str()).await;
    assert!(matches!(result, Err(LinkError::Expired)));
}

#[tokio::test]
async fn test_code_value_collision_is_detected() {
    let db = setup_test_db().await;
    let parent_a = create_account(&db, Role::Parent).await;
    let parent_b = create_account(&db, Role::Parent).await;

    let now = OffsetDateTime::now_utc();
    let code = InviteCode::generate();
    let record = InviteRecord {
        parent_id: parent_a.id,
        code: code.clone(),
        status: InviteStatus::Active,
        created_at: now,
        expires_at: None,
    };
    db.put_active(record.clone()).await.unwrap();

    let clash = InviteRecord {
        parent_id: parent_b.id,
        ..record
    };
    let result = db.put_active(clash).await;
    assert!(matches!(result, Err(InviteStoreError::Collision)));

    // the losing transaction rolled back; the winner is untouched
    let current = db.current_for(parent_a.id).await.unwrap().unwrap();
    assert_eq!(current.code, code);
    assert!(db.current_for(parent_b.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_remove_child_only_deletes_the_callers_edge() {
    let db = setup_test_db().await;
    let engine = engine(&db);
    let old_parent = create_account(&db, Role::Parent).await;
    let new_parent = create_account(&db, Role::Parent).await;
    let child = create_account(&db, Role::Child).await;

    // the edge names new_parent; a delete keyed on child id alone
    // would let old_parent sever it
    db.link(new_parent.id, child.id).await.unwrap();

    assert!(!db.unlink_edge(old_parent.id, child.id).await.unwrap());
    let result = engine.remove_child(&old_parent, child.id).await;
    assert!(matches!(result, Err(LinkError::Forbidden(_))));

    let edge = db.parent_of(child.id).await.unwrap().unwrap();
    assert_eq!(edge.parent_id, new_parent.id);

    assert!(db.unlink_edge(new_parent.id, child.id).await.unwrap());
    assert!(db.parent_of(child.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_leave_and_remove_child() {
    let db = setup_test_db().await;
    let engine = engine(&db);
    let parent = create_account(&db, Role::Parent).await;
    let first = create_account(&db, Role::Child).await;
    let second = create_account(&db, Role::Child).await;

    let record = engine.generate_code(&parent, None).await.unwrap();
    engine
        .redeem_code(&first, record.code.as_str())
        .await
        .unwrap();
    engine
        .redeem_code(&second, record.code.as_str())
        .await
        .unwrap();

    // parent removes one child; the other stays linked
    engine.remove_child(&parent, first.id).await.unwrap();
    assert!(db.parent_of(first.id).await.unwrap().is_none());
    assert!(db.parent_of(second.id).await.unwrap().is_some());

    // a removed child can relink with the still-active code
    engine
        .redeem_code(&first, record.code.as_str())
        .await
        .unwrap();

    // parent leave severs every remaining edge, idempotently
    engine.leave(&parent).await.unwrap();
    engine.leave(&parent).await.unwrap();
    assert!(db.children_of(parent.id).await.unwrap().is_empty());
}
