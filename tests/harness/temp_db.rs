use std::path::{Path, PathBuf};

use regimewatch::adapter::outbound::sqlite::{create_pool, run_migrations, DbPool};

/// Temporary SQLite database for integration tests.
///
/// The backing directory is removed when the value is dropped.
pub struct TempDb {
    dir: tempfile::TempDir,
    path: PathBuf,
    pool: DbPool,
}

impl TempDb {
    pub fn create(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(format!("regimewatch-{name}.db"));

        let pool = create_pool(path.to_str().expect("utf-8 temp path")).expect("create sqlite pool");
        run_migrations(&pool).expect("run migrations");

        Self { dir, path, pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}
