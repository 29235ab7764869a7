use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use diesel::migration::{Migration, MigrationName, MigrationSource};
use diesel::prelude::*;
use diesel::result::ConnectionError;
use diesel::sqlite::Sqlite;
use diesel_migrations::MigrationHarness;
use tracing::info;

use crate::{MIGRATIONS, establish_connection};

pub type MigrationError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("failed to connect to database: {0}")]
    Connection(#[from] ConnectionError),
    #[error("failed to run migrations: {0}")]
    Migration(MigrationError),
    #[error("database error: {0}")]
    Query(#[from] diesel::result::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MigrationStatus {
    pub name: String,
    pub applied: bool,
}

/// Runs `f` with foreign key enforcement off, switching it back on afterwards.
///
/// The table rebuilds in the migrations drop tables that other tables still
/// reference. SQLite ignores this pragma inside a transaction, so it has to be
/// set around the harness rather than inside the migration scripts.
fn without_foreign_keys<T>(
    conn: &mut SqliteConnection,
    f: impl FnOnce(&mut SqliteConnection) -> Result<T, MigrationError>,
) -> Result<T, MigrationError> {
    diesel::sql_query("PRAGMA foreign_keys = OFF").execute(conn)?;
    let result = f(conn);
    diesel::sql_query("PRAGMA foreign_keys = ON").execute(conn)?;
    result
}

/// Applies every pending migration and returns the versions that ran.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<Vec<String>, MigrationError> {
    without_foreign_keys(conn, |conn| {
        let versions = conn.run_pending_migrations(MIGRATIONS)?;
        Ok(versions.into_iter().map(|v| v.to_string()).collect())
    })
}

pub fn run_next_migration(conn: &mut SqliteConnection) -> Result<String, MigrationError> {
    without_foreign_keys(conn, |conn| {
        let version = conn.run_next_migration(MIGRATIONS)?;
        Ok(version.to_string())
    })
}

pub fn revert_last_migration(conn: &mut SqliteConnection) -> Result<String, MigrationError> {
    without_foreign_keys(conn, |conn| {
        let version = conn.revert_last_migration(MIGRATIONS)?;
        Ok(version.to_string())
    })
}

pub fn migration_status(conn: &mut SqliteConnection) -> Result<Vec<MigrationStatus>, MigrationError> {
    let applied = conn.applied_migrations()?;
    let migrations = MigrationSource::<Sqlite>::migrations(&MIGRATIONS)?;

    Ok(migrations
        .iter()
        .map(|m| {
            let version = m.name().version();
            MigrationStatus {
                name: m.name().to_string(),
                applied: applied.iter().any(|v| *v == version),
            }
        })
        .collect())
}

/// Shared handle to the catalog database.
///
/// A single connection sits behind a mutex; callers hold the guard for the
/// duration of one operation.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<SqliteConnection>>,
}

impl Database {
    /// Connects, brings the schema up to date and makes sure foreign key
    /// enforcement is on for the rest of the connection's life.
    pub fn open(database_url: &str) -> Result<Self, DatabaseError> {
        let mut conn = establish_connection(database_url)?;

        let applied = run_migrations(&mut conn).map_err(DatabaseError::Migration)?;
        if !applied.is_empty() {
            info!(?applied, "applied pending migrations");
        }

        diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn connection(&self) -> MutexGuard<'_, SqliteConnection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::sql_types::{Bool, Text};

    #[derive(QueryableByName, Debug, PartialEq)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Bool)]
        notnull: bool,
    }

    fn restaurant_columns(conn: &mut SqliteConnection) -> Vec<ColumnInfo> {
        diesel::sql_query(
            "SELECT name, \"notnull\" FROM pragma_table_info('restaurants') ORDER BY cid",
        )
        .load(conn)
        .unwrap()
    }

    fn nullable(columns: &[ColumnInfo], column: &str) -> bool {
        !columns.iter().find(|c| c.name == column).unwrap().notnull
    }

    #[derive(QueryableByName)]
    struct ForeignKeys {
        #[diesel(sql_type = Bool)]
        foreign_keys: bool,
    }

    fn foreign_keys_enabled(conn: &mut SqliteConnection) -> bool {
        diesel::sql_query("PRAGMA foreign_keys")
            .get_result::<ForeignKeys>(conn)
            .unwrap()
            .foreign_keys
    }

    fn count(conn: &mut SqliteConnection, table: &str) -> i64 {
        #[derive(QueryableByName)]
        struct Count {
            #[diesel(sql_type = diesel::sql_types::BigInt)]
            n: i64,
        }

        diesel::sql_query(format!("SELECT COUNT(*) AS n FROM {table}"))
            .get_result::<Count>(conn)
            .unwrap()
            .n
    }

    /// A restaurant with one priced pizza, written with plain SQL so it works
    /// against any schema version.
    fn insert_catalog_rows(conn: &mut SqliteConnection) {
        diesel::sql_query(
            "INSERT INTO restaurants (id, name, address) VALUES (7, 'Sanjay''s Pizza', 'Main St')",
        )
        .execute(conn)
        .unwrap();
        diesel::sql_query("INSERT INTO pizzas (id, name, ingredients) VALUES (3, 'Geri', 'Dough')")
            .execute(conn)
            .unwrap();
        diesel::sql_query(
            "INSERT INTO restaurant_pizzas (price, restaurant_id, pizza_id) VALUES (12, 7, 3)",
        )
        .execute(conn)
        .unwrap();
    }

    #[test]
    fn test_run_migrations_applies_whole_chain() {
        let conn = &mut establish_connection(":memory:").unwrap();

        let applied = run_migrations(conn).unwrap();
        assert_eq!(applied.len(), 2);

        let status = migration_status(conn).unwrap();
        assert!(status.iter().all(|m| m.applied));

        assert!(run_migrations(conn).unwrap().is_empty());
    }

    #[test]
    fn test_upgrade_then_downgrade_restores_nullability() {
        let conn = &mut establish_connection(":memory:").unwrap();

        run_next_migration(conn).unwrap();
        let before = restaurant_columns(conn);
        assert!(nullable(&before, "name"));
        assert!(nullable(&before, "address"));

        run_next_migration(conn).unwrap();
        let upgraded = restaurant_columns(conn);
        assert!(!nullable(&upgraded, "name"));
        assert!(!nullable(&upgraded, "address"));

        revert_last_migration(conn).unwrap();
        assert_eq!(restaurant_columns(conn), before);
    }

    #[test]
    fn test_upgrade_keeps_existing_rows() {
        let conn = &mut establish_connection(":memory:").unwrap();
        run_next_migration(conn).unwrap();
        insert_catalog_rows(conn);

        run_next_migration(conn).unwrap();

        let restaurant = crate::schema::restaurants::table
            .find(7)
            .select(crate::models::Restaurant::as_select())
            .first(conn)
            .unwrap();
        assert_eq!(restaurant.name, "Sanjay's Pizza");
        assert_eq!(restaurant.address, "Main St");

        let associations: i64 = crate::schema::restaurant_pizzas::table
            .filter(crate::schema::restaurant_pizzas::restaurant_id.eq(7))
            .count()
            .get_result(conn)
            .unwrap();
        assert_eq!(associations, 1);
        assert!(foreign_keys_enabled(conn));
    }

    #[test]
    fn test_revert_populated_database() {
        let conn = &mut establish_connection(":memory:").unwrap();
        run_migrations(conn).unwrap();
        insert_catalog_rows(conn);

        revert_last_migration(conn).unwrap();

        let columns = restaurant_columns(conn);
        assert!(nullable(&columns, "name"));
        assert!(nullable(&columns, "address"));
        assert_eq!(count(conn, "restaurants"), 1);
        assert_eq!(count(conn, "restaurant_pizzas"), 1);
        assert!(foreign_keys_enabled(conn));

        // And forward again over the same rows.
        assert_eq!(run_migrations(conn).unwrap().len(), 1);
        assert!(!nullable(&restaurant_columns(conn), "name"));
        assert_eq!(count(conn, "restaurant_pizzas"), 1);
    }

    #[test]
    fn test_open_upgrades_populated_v1_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        let url = path.to_str().unwrap();

        {
            let conn = &mut establish_connection(url).unwrap();
            run_next_migration(conn).unwrap();
            insert_catalog_rows(conn);
        }

        let db = Database::open(url).unwrap();
        let conn = &mut *db.connection();

        assert!(migration_status(conn).unwrap().iter().all(|m| m.applied));
        assert!(!nullable(&restaurant_columns(conn), "address"));
        assert!(foreign_keys_enabled(conn));

        let restaurant = crate::service::get_restaurant(conn, 7).unwrap();
        assert_eq!(restaurant.restaurant_pizzas.len(), 1);
        assert_eq!(restaurant.restaurant_pizzas[0].price, 12);
    }

    #[test]
    fn test_upgrade_fails_on_null_restaurant_name() {
        let conn = &mut establish_connection(":memory:").unwrap();
        run_next_migration(conn).unwrap();

        diesel::sql_query("INSERT INTO restaurants (name, address) VALUES (NULL, 'Nowhere')")
            .execute(conn)
            .unwrap();

        assert!(run_next_migration(conn).is_err());

        let columns = restaurant_columns(conn);
        assert!(nullable(&columns, "name"));
        let status = migration_status(conn).unwrap();
        assert_eq!(status.iter().filter(|m| m.applied).count(), 1);
    }

    #[test]
    fn test_open_enables_foreign_keys() {
        let db = Database::open(":memory:").unwrap();
        let conn = &mut *db.connection();

        let result = diesel::insert_into(crate::schema::restaurant_pizzas::table)
            .values(&crate::models::NewRestaurantPizza {
                price: 10,
                restaurant_id: 404,
                pizza_id: 404,
            })
            .execute(conn);
        assert!(result.is_err());
    }
}
