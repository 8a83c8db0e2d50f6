//! Integration tests for orgrel-db
//!
//! Tests the SeaORM membership store with a real SQLite in-memory database

use std::sync::Arc;

use orgrel_core::{
    ImportCommitter, ImportErrorType, ImportFailure, ImportOptions, ManagerEdge, MemberProfile,
    MembershipState, MembershipStore, NewMember, RelationshipType, StoreError,
};
use orgrel_db::{
    connect,
    entities::{manager_edge, org_member},
    migrate,
    store::EDGE_INSERT_BATCH,
    SeaOrmMembershipStore,
};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};
use uuid::Uuid;

/// Helper to create a migrated test database
async fn setup_store() -> SeaOrmMembershipStore {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    migrate(&db).await.expect("Failed to run migrations");

    SeaOrmMembershipStore::new(db)
}

#[tokio::test]
async fn test_database_connection() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let backend = db.get_database_backend();
    assert!(matches!(backend, sea_orm::DatabaseBackend::Sqlite));
}

#[tokio::test]
async fn test_migrations_run_successfully() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let result = migrate(&db).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_create_and_find_member() {
    let store = setup_store().await;
    let company = store.create_company("Acme").await.unwrap();

    let created = store
        .create_member(
            company.id,
            NewMember::new("Alice@Acme.com").with_name("Alice"),
            MembershipState::Registered,
        )
        .await
        .expect("Failed to create member");

    assert_eq!(created.email, "alice@acme.com");
    assert_eq!(created.membership_state, MembershipState::Registered);

    let found = store
        .find_member_by_email(company.id, "ALICE@acme.com")
        .await
        .unwrap()
        .expect("Member not found");
    assert_eq!(found.id, created.id);
    assert_eq!(found.name.as_deref(), Some("Alice"));

    let by_id = store.find_member(company.id, created.id).await.unwrap();
    assert!(by_id.is_some());

    // Scoped to the company
    let other = store.create_company("Globex").await.unwrap();
    assert!(store
        .find_member(other.id, created.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let store = setup_store().await;
    let company = store.create_company("Acme").await.unwrap();

    store
        .create_member(company.id, NewMember::new("a@acme.com"), MembershipState::Pending)
        .await
        .unwrap();
    let result = store
        .create_member(company.id, NewMember::new("A@acme.com"), MembershipState::Invited)
        .await;

    assert!(matches!(result, Err(StoreError::Conflict(_))));
}

#[tokio::test]
async fn test_create_member_in_unknown_company() {
    let store = setup_store().await;

    let result = store
        .create_member(Uuid::new_v4(), NewMember::new("a@acme.com"), MembershipState::Invited)
        .await;

    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn test_update_profile_keeps_unset_fields() {
    let store = setup_store().await;
    let company = store.create_company("Acme").await.unwrap();
    let member = store
        .create_member(
            company.id,
            NewMember::new("a@acme.com").with_name("Ann"),
            MembershipState::Registered,
        )
        .await
        .unwrap();

    let updated = store
        .update_profile(
            company.id,
            member.id,
            MemberProfile {
                title: Some("Engineer".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name.as_deref(), Some("Ann"));
    assert_eq!(updated.title.as_deref(), Some("Engineer"));
}

#[tokio::test]
async fn test_replace_manager_edges_is_full_replace() {
    let store = setup_store().await;
    let company = store.create_company("Acme").await.unwrap();

    let mut ids = Vec::new();
    for email in ["alice@acme.com", "bob@acme.com", "carol@acme.com"] {
        let member = store
            .create_member(company.id, NewMember::new(email), MembershipState::Registered)
            .await
            .unwrap();
        ids.push(member.id);
    }
    let (alice, bob, carol) = (ids[0], ids[1], ids[2]);

    store
        .replace_manager_edges(
            company.id,
            &[
                ManagerEdge { member_id: bob, manager_id: alice },
                ManagerEdge { member_id: carol, manager_id: bob },
            ],
        )
        .await
        .unwrap();

    let graph = store.load_graph(company.id).await.unwrap();
    let result = graph.classify(alice, carol).unwrap();
    assert_eq!(result.relationship_type, RelationshipType::SkipLevelManager);
    assert_eq!(result.distance, 2);

    store
        .replace_manager_edges(
            company.id,
            &[ManagerEdge { member_id: carol, manager_id: alice }],
        )
        .await
        .unwrap();

    let count = manager_edge::Entity::find()
        .count(store.connection())
        .await
        .unwrap();
    assert_eq!(count, 1);

    let graph = store.load_graph(company.id).await.unwrap();
    assert_eq!(graph.member(bob).unwrap().manager_id, None);
    assert_eq!(graph.member(carol).unwrap().manager_id, Some(alice));
}

#[tokio::test]
async fn test_rejected_edge_replace_keeps_old_edges() {
    let store = setup_store().await;
    let company = store.create_company("Acme").await.unwrap();
    let other = store.create_company("Globex").await.unwrap();

    let boss = store
        .create_member(company.id, NewMember::new("boss@acme.com"), MembershipState::Registered)
        .await
        .unwrap();
    let worker = store
        .create_member(company.id, NewMember::new("worker@acme.com"), MembershipState::Registered)
        .await
        .unwrap();
    let outsider = store
        .create_member(other.id, NewMember::new("x@globex.com"), MembershipState::Registered)
        .await
        .unwrap();

    store
        .replace_manager_edges(
            company.id,
            &[ManagerEdge { member_id: worker.id, manager_id: boss.id }],
        )
        .await
        .unwrap();

    let result = store
        .replace_manager_edges(
            company.id,
            &[ManagerEdge { member_id: worker.id, manager_id: outsider.id }],
        )
        .await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    let worker = store
        .find_member(company.id, worker.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(worker.manager_id, Some(boss.id));
}

#[tokio::test]
async fn test_replace_manager_edges_spans_several_inserts() {
    let store = setup_store().await;
    let company = store.create_company("Acme").await.unwrap();

    let mut ids = Vec::new();
    for i in 0..EDGE_INSERT_BATCH + 2 {
        let member = store
            .create_member(
                company.id,
                NewMember::new(format!("m{}@acme.com", i)),
                MembershipState::Registered,
            )
            .await
            .unwrap();
        ids.push(member.id);
    }
    let edges: Vec<ManagerEdge> = ids
        .windows(2)
        .map(|pair| ManagerEdge { member_id: pair[1], manager_id: pair[0] })
        .collect();
    assert_eq!(edges.len(), EDGE_INSERT_BATCH + 1);

    store.replace_manager_edges(company.id, &edges).await.unwrap();

    let count = manager_edge::Entity::find()
        .count(store.connection())
        .await
        .unwrap();
    assert_eq!(count as usize, EDGE_INSERT_BATCH + 1);

    let graph = store.load_graph(company.id).await.unwrap();
    let last = *ids.last().unwrap();
    let chain = graph.manager_chain(last).unwrap();
    assert_eq!(chain.len(), EDGE_INSERT_BATCH + 1);
    assert_eq!(chain.distance_to(ids[0]), Some((EDGE_INSERT_BATCH + 1) as u32));
}

#[tokio::test]
async fn test_import_into_unknown_company_is_not_found() {
    let store = Arc::new(setup_store().await);
    let committer = ImportCommitter::new(store.clone(), ImportOptions::default());

    let result = committer
        .import_csv(Uuid::new_v4(), "email,managerEmail
a@acme.com,
")
        .await;
    assert!(matches!(
        result,
        Err(ImportFailure::Store(StoreError::NotFound(_)))
    ));

    let count = org_member::Entity::find()
        .count(store.connection())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_import_commit_against_database() {
    let store = setup_store().await;
    let company = store.create_company("Acme").await.unwrap();
    store
        .create_member(
            company.id,
            NewMember::new("ceo@acme.com").with_name("Cee"),
            MembershipState::Registered,
        )
        .await
        .unwrap();

    let store = Arc::new(store);
    let committer = ImportCommitter::new(store.clone(), ImportOptions::default());
    let csv = "email,managerEmail,name,title,role\n\
               ceo@acme.com,,,CEO,exec\n\
               vp@acme.com,ceo@acme.com,Vic,VP,manager\n\
               dev@acme.com,vp@acme.com,Dee,Engineer,ic\n\
               lost@acme.com,nobody@acme.com,,,\n";

    let summary = committer.import_csv(company.id, csv).await.unwrap();
    assert_eq!(summary.users_added, 3);
    assert_eq!(summary.relationships_created, 2);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].row, 4);
    assert_eq!(summary.errors[0].error_type, ImportErrorType::UserNotFound);

    let graph = store.load_graph(company.id).await.unwrap();
    let ceo = graph.member_by_email("ceo@acme.com").unwrap();
    assert_eq!(ceo.membership_state, MembershipState::Registered);
    assert_eq!(ceo.name.as_deref(), Some("Cee"));
    assert_eq!(ceo.title.as_deref(), Some("CEO"));

    let result = graph
        .classify_by_email("dev@acme.com", "ceo@acme.com")
        .unwrap();
    assert_eq!(result.relationship_type, RelationshipType::SkipLevelReport);
    assert_eq!(result.description, "Dee is a skip-level report of Cee (2 levels down)");
}
