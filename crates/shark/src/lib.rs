//! `shark`: a native, type-safe PostgreSQL/MySQL entity connector.
//!
//! `Database<B>` is the public CRUD facade — generic over any
//! [`shark_core::Backend`], driving the abstract schema/CRUD translator in
//! `shark-schema` with the WHERE/ORDER/LIMIT clause tree from
//! `shark-query`. The two wire protocol clients, [`shark_postgres::PgConnection`]
//! and [`shark_mysql::MySqlConnection`], are the concrete backends; each
//! gets its own `Database::connect` since the startup handshake is
//! backend-specific, but every CRUD operation past that point is shared.
//!
//! ```ignore
//! use shark::{Database, Entity, Select, var};
//!
//! #[derive(Entity, Default)]
//! #[shark(table = "widgets")]
//! struct Widget {
//!     #[shark(primary_key, auto_increment)]
//!     id: Option<i32>,
//!     name: String,
//! }
//!
//! let mut db = Database::connect("mydb", "postgres", "secret")?;
//! db.init::<Widget>()?;
//! let mut w = Widget { id: None, name: "gadget".into() };
//! db.insert(&mut w, true)?;
//! let found: Vec<Widget> = db.select(&[], &Select::new().filter(var("name").eq(&"gadget".into())))?;
//! # Ok::<(), shark_core::Error>(())
//! ```

use std::collections::HashMap;

use tracing::warn;

use shark_core::{Backend, Entity, Error, Result};
use shark_schema::{build_delete_sql, build_select_sql, build_update_sql, reconcile, render_cell_literal};

pub use shark_core::{Cell, Column, FieldSpec, TableInfo};
pub use shark_macros::Entity;
pub use shark_mysql::{MySqlConfig, MySqlConnection};
pub use shark_postgres::{PgConfig, PgConnection};
pub use shark_query::{Direction, Glue, Limit, Operator, Order, Select, Where, var};

/// The CRUD facade: one live connection plus the generic translator
/// operations driven against it. Not `Clone`/`Sync` — per the spec's
/// concurrency model each instance owns one socket and is not safe to
/// share across threads.
pub struct Database<B> {
    backend: B,
}

impl<B: Backend> Database<B> {
    /// Wrap an already-connected backend. Prefer the backend-specific
    /// `connect` constructors (e.g. `Database::<PgConnection>::connect`)
    /// unless you need to hand in a backend built by other means.
    pub fn new(backend: B) -> Self {
        Database { backend }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Release the socket. The connection is not resumable afterward;
    /// callers must reconnect.
    pub fn close(&mut self) {
        self.backend.close();
    }

    /// Create `T`'s table if it doesn't exist, otherwise reconcile its
    /// live columns against the declared fields (add/alter/drop as
    /// needed). See `shark_schema::diff::reconcile` for the algorithm.
    pub fn init<T: Entity + Default>(&mut self) -> Result<()> {
        let table = T::default().table_name();
        reconcile(&mut self.backend, &table, &T::fields(), &T::primary_keys())
    }

    /// `select <cols> from T [where] [order by] [limit]`. An empty
    /// `columns` list projects `*`.
    pub fn select<T: Entity + Default>(&mut self, columns: &[String], select: &Select) -> Result<Vec<T>> {
        let table = T::default().table_name();
        let quote = self.backend.quote_char();
        let sql = build_select_sql(&table, columns, select, &self.backend, quote);
        self.backend.query_select(&sql)?.bind_all()
    }

    /// Like [`Self::select`], but forces `limit 1` and returns at most one
    /// row regardless of what `select.limit` already carried.
    pub fn select_one<T: Entity + Default>(&mut self, columns: &[String], select: Select) -> Result<Option<T>> {
        let top_one = select.limit(Limit::top(1).expect("limit(0, 1) is always a valid window"));
        let table = T::default().table_name();
        let quote = self.backend.quote_char();
        let sql = build_select_sql(&table, columns, &top_one, &self.backend, quote);
        self.backend.query_select(&sql)?.bind_one()
    }

    /// Select the row matching `entity`'s primary key. Fails with
    /// `Error::Database` if `T` declares no primary key.
    pub fn select_id<T: Entity + Default>(&mut self, entity: &T) -> Result<Option<T>> {
        let table = entity.table_name();
        let filter = Where::all_equal(&entity.primary_key_values())
            .ok_or_else(|| Error::Database(format!("'{table}' has no primary key to select by id")))?;
        let select = Select::new().filter(filter);
        let quote = self.backend.quote_char();
        let sql = build_select_sql(&table, &[], &select, &self.backend, quote);
        self.backend.query_select(&sql)?.bind_one()
    }

    /// Insert `entity`'s present fields. When `update_id` is true and `T`
    /// declares primary keys, the backend is asked to return the inserted
    /// key values (PostgreSQL: `returning`; MySQL: `last_insert_id`) and
    /// they're written back onto `entity`.
    pub fn insert<T: Entity>(&mut self, entity: &mut T, update_id: bool) -> Result<()> {
        let table = entity.table_name();
        let present = entity.present_fields();
        let names: Vec<String> = present.iter().map(|(name, _)| name.clone()).collect();
        let values: Vec<String> = present.iter().map(|(_, cell)| render_cell_literal(cell, &self.backend)).collect();
        let primary_keys = if update_id { T::primary_keys() } else { Vec::new() };

        let returned = self.backend.insert_into(&table, &names, &values, &primary_keys)?;
        if update_id {
            if let Some(result) = returned {
                if let Some(row) = result.views().next() {
                    entity.apply_returned(&row)?;
                }
            }
        }
        Ok(())
    }

    /// `update T set f1=v1,... [where ...]`. `fields` names which of
    /// `entity`'s present fields to assign; a name with no matching
    /// present field is skipped. When `filter` is `None`, an id-based
    /// `Where` is synthesized from `entity`'s primary key if it has one;
    /// otherwise the update runs unfiltered, logging a warning rather
    /// than failing.
    pub fn update<T: Entity>(&mut self, entity: &T, fields: &[String], filter: Option<Where>) -> Result<()> {
        let table = entity.table_name();
        let present: HashMap<String, Cell> = entity.present_fields().into_iter().collect();
        let assignments: Vec<(String, Cell)> =
            fields.iter().filter_map(|name| present.get(name).map(|cell| (name.clone(), cell.clone()))).collect();

        let filter = filter.or_else(|| Where::all_equal(&entity.primary_key_values()));
        if filter.is_none() {
            warn!(table = %table, "update has no WHERE clause; every row will be modified");
        }

        let quote = self.backend.quote_char();
        let sql = build_update_sql(&table, &assignments, filter.as_ref(), &self.backend, quote);
        self.backend.query(&sql)
    }

    /// `delete from table where ...`, addressed by table name rather than
    /// an entity instance.
    pub fn del(&mut self, table: &str, filter: Where) -> Result<()> {
        let quote = self.backend.quote_char();
        let sql = build_delete_sql(table, Some(&filter), &self.backend, quote);
        self.backend.query(&sql)
    }

    /// Delete the row matching `entity`'s primary key. With no declared
    /// primary key this deletes the entire table, logging a warning
    /// rather than failing.
    pub fn del_entity<T: Entity>(&mut self, entity: &T) -> Result<()> {
        let table = entity.table_name();
        let filter = Where::all_equal(&entity.primary_key_values());
        if filter.is_none() {
            warn!(table = %table, "delete has no WHERE clause; every row will be removed");
        }
        let quote = self.backend.quote_char();
        let sql = build_delete_sql(&table, filter.as_ref(), &self.backend, quote);
        self.backend.query(&sql)
    }

    pub fn drop_if_exists(&mut self, table: &str) -> Result<()> {
        self.backend.drop_table(table, true)
    }

    pub fn drop(&mut self, table: &str) -> Result<()> {
        self.backend.drop_table(table, false)
    }
}

impl Database<PgConnection> {
    /// `Database.connect(db, user, password)`: host is always
    /// `localhost`/`5432` here — build a [`PgConfig`] directly and call
    /// `Database::new(PgConnection::connect(config)?)` for anything else.
    pub fn connect(database: &str, user: &str, password: &str) -> Result<Self> {
        let config = PgConfig::new("localhost", user, database).password(password);
        Ok(Database::new(PgConnection::connect(config)?))
    }

    /// `Database.connect(password)` short form: empty db/user.
    pub fn connect_with_password(password: &str) -> Result<Self> {
        Self::connect("", "", password)
    }
}

impl Database<MySqlConnection> {
    /// `Database.connect(db, user, password)`, MySQL default port 3306.
    pub fn connect(database: &str, user: &str, password: &str) -> Result<Self> {
        let mut config = MySqlConfig::new().host("localhost").user(user).password(password);
        if !database.is_empty() {
            config = config.database(database);
        }
        Ok(Database::new(MySqlConnection::connect(config)?))
    }

    /// `Database.connect(password)` short form: empty db/user.
    pub fn connect_with_password(password: &str) -> Result<Self> {
        Self::connect("", "", password)
    }
}
