//! Integration tests for role-scoped note and folder access against a
//! real sqlite store.

use uuid::Uuid;

use common::prelude::{
    authorize, scope_for, AccessMode, Decision, Identity, Operation, RelationshipStore, Role,
};

use nestnote_daemon::database::{NewAccount, NewFolder, NewNote, UpdateNote};
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

fn note(owner: &Identity, title: &str, tags: &[&str]) -> NewNote {
    NewNote {
        owner_id: owner.id,
        title: title.to_string(),
        content: "body".to_string(),
        folder_id: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

#[tokio::test]
async fn test_note_round_trip_and_partial_update() {
    let db = setup_test_db().await;
    let owner = create_account(&db, Role::Child).await;

    let folder = db
        .create_folder(NewFolder {
            owner_id: owner.id,
            name: "School".to_string(),
            parent_folder_id: None,
        })
        .await
        .unwrap();

    let created = db
        .create_note(NewNote {
            folder_id: Some(folder.id),
            ..note(&owner, "Homework", &["math"])
        })
        .await
        .unwrap();

    let fetched = db.note_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.title, "Homework");
    assert_eq!(fetched.folder_id, Some(folder.id));
    assert_eq!(fetched.tags, vec!["math".to_string()]);

    // partial update: change the title, clear the folder, keep tags
    let updated = db
        .update_note(
            fetched,
            UpdateNote {
                title: Some("Homework (done)".to_string()),
                folder_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Homework (done)");
    assert_eq!(updated.folder_id, None);
    assert_eq!(updated.tags, vec!["math".to_string()]);
    assert!(updated.updated_at >= updated.created_at);

    assert!(db.delete_note(updated.id).await.unwrap());
    assert!(db.note_by_id(updated.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_parent_scope_covers_children_but_not_strangers() {
    let db = setup_test_db().await;
    let parent = create_account(&db, Role::Parent).await;
    let child = create_account(&db, Role::Child).await;
    let stranger = create_account(&db, Role::Child).await;

    db.link(parent.id, child.id).await.unwrap();

    db.create_note(note(&parent, "Groceries", &[])).await.unwrap();
    db.create_note(note(&child, "Diary", &[])).await.unwrap();
    db.create_note(note(&stranger, "Secret", &[])).await.unwrap();

    let view = db.family_view(&parent).await.unwrap();
    let scope = scope_for(&parent, &view);
    let notes = db.notes_for_owners(&scope, None, None).await.unwrap();

    let titles: Vec<_> = notes.iter().map(|n| n.title.as_str()).collect();
    assert!(titles.contains(&"Groceries"));
    assert!(titles.contains(&"Diary"));
    assert!(!titles.contains(&"Secret"));
}

#[tokio::test]
async fn test_child_scope_is_self_only() {
    let db = setup_test_db().await;
    let parent = create_account(&db, Role::Parent).await;
    let child = create_account(&db, Role::Child).await;

    db.link(parent.id, child.id).await.unwrap();
    db.create_note(note(&parent, "Groceries", &[])).await.unwrap();
    db.create_note(note(&child, "Diary", &[])).await.unwrap();

    let view = db.family_view(&child).await.unwrap();
    let scope = scope_for(&child, &view);
    assert_eq!(scope, vec![child.id]);

    let notes = db.notes_for_owners(&scope, None, None).await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Diary");

    // the child -> parent direction is denied outright
    assert_eq!(
        authorize(&child, &view, parent.id, Operation::Read),
        Decision::Deny
    );
}

#[tokio::test]
async fn test_parent_reads_child_notes_but_never_writes() {
    let db = setup_test_db().await;
    let parent = create_account(&db, Role::Parent).await;
    let child = create_account(&db, Role::Child).await;

    db.link(parent.id, child.id).await.unwrap();
    let diary = db.create_note(note(&child, "Diary", &[])).await.unwrap();

    let view = db.family_view(&parent).await.unwrap();
    assert_eq!(
        authorize(&parent, &view, diary.owner_id, Operation::Read),
        Decision::Allow(AccessMode::ReadOnly)
    );
    assert_eq!(
        authorize(&parent, &view, diary.owner_id, Operation::Write),
        Decision::Deny
    );

    // severing the link revokes read access on the next snapshot
    db.unlink_child(child.id).await.unwrap();
    let view = db.family_view(&parent).await.unwrap();
    assert_eq!(
        authorize(&parent, &view, diary.owner_id, Operation::Read),
        Decision::Deny
    );
}

#[tokio::test]
async fn test_list_filters_by_folder_and_tag() {
    let db = setup_test_db().await;
    let owner = create_account(&db, Role::Child).await;

    let folder = db
        .create_folder(NewFolder {
            owner_id: owner.id,
            name: "School".to_string(),
            parent_folder_id: None,
        })
        .await
        .unwrap();

    db.create_note(NewNote {
        folder_id: Some(folder.id),
        ..note(&owner, "Homework", &["math", "urgent"])
    })
    .await
    .unwrap();
    db.create_note(note(&owner, "Diary", &["personal"]))
        .await
        .unwrap();

    let in_folder = db
        .notes_for_owners(&[owner.id], Some(folder.id), None)
        .await
        .unwrap();
    assert_eq!(in_folder.len(), 1);
    assert_eq!(in_folder[0].title, "Homework");

    let tagged = db
        .notes_for_owners(&[owner.id], None, Some("personal"))
        .await
        .unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].title, "Diary");

    let none = db
        .notes_for_owners(&[owner.id], Some(folder.id), Some("personal"))
        .await
        .unwrap();
    assert!(none.is_empty());

    // distinct tags, sorted
    let tags = db.tags_for_owners(&[owner.id]).await.unwrap();
    assert_eq!(tags, vec!["math", "personal", "urgent"]);
}

#[tokio::test]
async fn test_on_disk_database_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nestnote.db");
    let db_url = url::Url::parse(&format!("sqlite://{}", path.display())).unwrap();

    let db = Database::connect(&db_url).await.unwrap();
    let owner = create_account(&db, Role::Child).await;
    db.create_note(note(&owner, "Persistent", &[])).await.unwrap();
    db.close().await;

    // a fresh pool over the same file sees the committed rows
    let db = Database::connect(&db_url).await.unwrap();
    let notes = db.notes_for_owners(&[owner.id], None, None).await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Persistent");
}

#[tokio::test]
async fn test_folder_delete_detaches_contents() {
    let db = setup_test_db().await;
    let owner = create_account(&db, Role::Child).await;

    let parent_folder = db
        .create_folder(NewFolder {
            owner_id: owner.id,
            name: "Archive".to_string(),
            parent_folder_id: None,
        })
        .await
        .unwrap();
    let sub_folder = db
        .create_folder(NewFolder {
            owner_id: owner.id,
            name: "2025".to_string(),
            parent_folder_id: Some(parent_folder.id),
        })
        .await
        .unwrap();
    let filed = db
        .create_note(NewNote {
            folder_id: Some(parent_folder.id),
            ..note(&owner, "Old", &[])
        })
        .await
        .unwrap();

    assert!(db.delete_folder(parent_folder.id).await.unwrap());

    // contents survive, detached
    let orphan_note = db.note_by_id(filed.id).await.unwrap().unwrap();
    assert_eq!(orphan_note.folder_id, None);
    let orphan_folder = db.folder_by_id(sub_folder.id).await.unwrap().unwrap();
    assert_eq!(orphan_folder.parent_folder_id, None);

    // deleting again reports nothing removed
    assert!(!db.delete_folder(parent_folder.id).await.unwrap());
}
