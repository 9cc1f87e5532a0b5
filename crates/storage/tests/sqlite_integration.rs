use funnel_core::model::IdentityDraft;
use storage::repository::{IdentityStore, Storage};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_roundtrip_persists_identity() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_identity_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.load().await.expect("load empty"), None);

    let identity = IdentityDraft::new("Dr. João", "11999999999")
        .validate()
        .unwrap();
    repo.save(&identity).await.expect("save");

    let loaded = repo.load().await.expect("load").expect("identity present");
    assert_eq!(loaded, identity);
}

#[tokio::test]
async fn sqlite_save_overwrites_previous_identity() {
    let storage = Storage::sqlite("sqlite:file:memdb_identity_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect + migrate");

    let first = IdentityDraft::new("Ana", "21988887777").validate().unwrap();
    let second = IdentityDraft::new("Ana Paula", "(21) 98888-6666")
        .validate()
        .unwrap();
    storage.identities.save(&first).await.unwrap();
    storage.identities.save(&second).await.unwrap();

    let loaded = storage.identities.load().await.unwrap().unwrap();
    assert_eq!(loaded.name(), "Ana Paula");
    assert_eq!(loaded.whatsapp(), "21988886666");
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_identity_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(applied, 1);
}
