use diesel::{
    r2d2::{ConnectionManager, Pool, PoolError, PooledConnection},
    result::Error as DieselError,
    SqliteConnection,
};

pub mod model;
pub mod schema;

pub type Connection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub type ConnectionPool = Pool<ConnectionManager<SqliteConnection>>;

#[derive(Clone)]
pub struct Guard(std::sync::Arc<std::sync::Mutex<()>>);

impl Guard {
    pub fn new() -> Self {
        Self(std::sync::Arc::new(std::sync::Mutex::new(())))
    }
}

impl std::ops::Deref for Guard {
    type Target = std::sync::Mutex<()>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NewSystemError {
    #[error("Failed to connect to database")]
    DatabaseConnectionError(#[from] diesel::r2d2::PoolError),
    #[error("Failed to perform database migration")]
    DatabaseMigrationFailed(#[from] diesel_migrations::RunMigrationsError),
}

/// Handle on the submissions store. Cheap to clone; every clone shares the
/// same connection pool and insertion guard.
#[derive(Clone)]
pub struct System {
    connection_pool: ConnectionPool,
    submissions_guard: Guard,
}

impl System {
    pub fn new(db_file_path: &std::path::Path) -> Result<Self, NewSystemError> {
        #[derive(Debug)]
        struct ConnectionCustomiser;

        impl diesel::r2d2::CustomizeConnection<diesel::SqliteConnection, diesel::r2d2::Error>
            for ConnectionCustomiser
        {
            fn on_acquire(
                &self,
                conn: &mut diesel::SqliteConnection,
            ) -> Result<(), diesel::r2d2::Error> {
                use diesel::connection::SimpleConnection;
                conn.batch_execute("PRAGMA busy_timeout = 2000;")
                    .and_then(|_| conn.batch_execute("PRAGMA journal_mode = WAL;"))
                    .and_then(|_| conn.batch_execute("PRAGMA synchronous = NORMAL;"))
                    .and_then(|_| conn.batch_execute("PRAGMA foreign_keys = ON;"))
                    .map_err(diesel::r2d2::Error::QueryError)
            }
        }

        let connection_pool = diesel::r2d2::Pool::builder()
            .connection_customizer(Box::new(ConnectionCustomiser))
            .build(
                diesel::r2d2::ConnectionManager::<diesel::SqliteConnection>::new(
                    db_file_path.to_string_lossy(),
                ),
            )?;

        crate::embedded_migrations::run(&connection_pool.get()?)?;

        Ok(Self {
            connection_pool,
            submissions_guard: Guard::new(),
        })
    }

    /// Runs `f` with a pooled connection on the blocking thread pool.
    pub async fn run_query<F, T>(&self, f: F) -> Result<T, QueryError>
    where
        F: FnOnce(Connection) -> Result<T, DieselError> + Send + 'static,
        T: Send + 'static,
    {
        use actix_web::error::BlockingError;

        let connection = self.connection_pool.get()?;

        actix_web::web::block(move || f(connection))
            .await
            .map_err(|err| match err {
                BlockingError::Error(err) => QueryError::QueryError(err),
                BlockingError::Canceled => QueryError::OperationCancelled,
            })
    }

    /// Runs `f` inside a transaction while holding the insertion guard.
    ///
    /// SQLite allows a single writer, and two deferred transactions racing to
    /// upgrade would fail with `SQLITE_BUSY` instead of waiting. Every write
    /// goes through here so they queue on the guard. Any error from `f` rolls
    /// the whole transaction back.
    pub async fn run_insertion<F, T>(&self, f: F) -> Result<T, QueryError>
    where
        F: FnOnce(&SqliteConnection) -> Result<T, DieselError> + Send + 'static,
        T: Send + 'static,
    {
        let guard = self.submissions_guard.clone();
        self.run_query(move |db_connection| {
            use diesel::Connection as _;

            let _lock = guard.lock();
            db_connection.transaction::<_, DieselError, _>(|| f(&*db_connection))
        })
        .await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Failed to connect to the database")]
    ConnectionError(#[from] PoolError),
    #[error(transparent)]
    QueryError(DieselError),
    #[error("Operation cancelled")]
    OperationCancelled,
}
