use goodhuman_core::domain::comment::CommentId;
use goodhuman_core::domain::dedup::{DedupKind, DedupRecord};
use goodhuman_db::repositories::{DedupRepository, SqlDedupRepository};
use goodhuman_db::{connect_with_settings, migrations};
use tempfile::TempDir;

fn database_url(dir: &TempDir) -> String {
    format!("sqlite://{}", dir.path().join("good-human.db").display())
}

#[tokio::test]
async fn database_file_is_created_on_first_connect() {
    let dir = TempDir::new().expect("tempdir");
    let pool = connect_with_settings(&database_url(&dir), 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrations");
    pool.close().await;

    assert!(dir.path().join("good-human.db").exists());
}

#[tokio::test]
async fn records_survive_closing_and_reopening_the_store() {
    let dir = TempDir::new().expect("tempdir");
    let url = database_url(&dir);
    let record = DedupRecord {
        comment_id: CommentId::new("g7h2k"),
        author: "human_bob".to_string(),
        subreddit: "x".to_string(),
        kind: DedupKind::Replied,
    };

    {
        let pool = connect_with_settings(&url, 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = SqlDedupRepository::new(pool.clone());
        assert!(repo.insert(&record).await.expect("insert"));
        pool.close().await;
    }

    let pool = connect_with_settings(&url, 1, 30).await.expect("reconnect");
    migrations::run_pending(&pool).await.expect("migrations on restart");
    let repo = SqlDedupRepository::new(pool.clone());

    assert!(repo.exists(DedupKind::Replied, &record.comment_id).await.expect("exists"));
    assert!(!repo.exists(DedupKind::Thanked, &record.comment_id).await.expect("exists"));
    assert_eq!(repo.count(DedupKind::Replied).await.expect("count"), 1);
    pool.close().await;
}
