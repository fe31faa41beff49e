use std::future::Future;
use std::path::{Path, PathBuf};
use std::thread;

use sqlx::PgPool;
use tokio::runtime::Runtime;

use abi::config::DbConfig;

/// A throwaway database on a real server. It is created and migrated on
/// construction and dropped, connections included, with the value.
pub struct TestDb {
    config: DbConfig,
}

// runs setup and teardown off the caller's runtime, which may be current-thread
fn block_on<F>(fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    thread::spawn(move || Runtime::new().unwrap().block_on(fut))
        .join()
        .unwrap();
}

impl TestDb {
    /// same server and credentials as `config`, fresh database name
    pub fn from_config(config: &DbConfig, migrations: impl AsRef<Path>) -> TestDb {
        let config = DbConfig {
            database: format!("test_{}", uuid::Uuid::new_v4().simple()),
            ..config.clone()
        };
        let server_url = config.server_url();
        let url = config.url();
        let database = config.database.clone();
        let migrations: PathBuf = migrations.as_ref().to_path_buf();

        block_on(async move {
            let server = PgPool::connect(&server_url).await.unwrap();
            sqlx::query(&format!(r#"CREATE DATABASE "{database}""#))
                .execute(&server)
                .await
                .unwrap();
            server.close().await;

            let pool = PgPool::connect(&url).await.unwrap();
            sqlx::migrate::Migrator::new(migrations.as_path())
                .await
                .unwrap()
                .run(&pool)
                .await
                .unwrap();
            pool.close().await;
        });
        TestDb { config }
    }

    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        migrations: impl AsRef<Path>,
    ) -> TestDb {
        let config = DbConfig {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: String::new(),
            max_connections: 5,
        };
        Self::from_config(&config, migrations)
    }

    pub fn url(&self) -> String {
        self.config.url()
    }

    pub async fn pool(&self) -> PgPool {
        PgPool::connect(&self.url()).await.unwrap()
    }

    pub fn dbname(&self) -> &str {
        &self.config.database
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let server_url = self.config.server_url();
        let database = self.config.database.clone();
        block_on(async move {
            let server = PgPool::connect(&server_url).await.unwrap();
            // open pool connections would make DROP DATABASE fail
            sqlx::query(
                "SELECT pg_terminate_backend(pid) FROM pg_stat_activity
                 WHERE datname = $1 AND pid <> pg_backend_pid()",
            )
            .bind(&database)
            .execute(&server)
            .await
            .unwrap();
            sqlx::query(&format!(r#"DROP DATABASE "{database}""#))
                .execute(&server)
                .await
                .unwrap();
        });
    }
}
