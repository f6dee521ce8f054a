use chrono::NaiveTime;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::auth;
use crate::error::{AppError, AppResult};
use crate::models::{
    Item, NewItem, NewTransaction, NewUser, NewWeighing, Transaction, TransactionFilter,
    TransactionRow, User, Weighing, WeighingRow,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT UNIQUE NOT NULL,
    password TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user'
);

CREATE TABLE IF NOT EXISTS inventory (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    unit TEXT,
    quantity REAL NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    type TEXT CHECK(type IN ('purchase','sale')) NOT NULL,
    item_id INTEGER NOT NULL,
    qty REAL NOT NULL,
    rate REAL,
    total REAL,
    party TEXT,
    notes TEXT,
    timestamp DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY(item_id) REFERENCES inventory(id)
);

CREATE TABLE IF NOT EXISTS weighings (
    id INTEGER PRIMARY KEY,
    vehicle_no TEXT,
    gross REAL NOT NULL DEFAULT 0,
    tare REAL NOT NULL DEFAULT 0,
    net REAL NOT NULL DEFAULT 0,
    item_id INTEGER,
    party TEXT,
    timestamp DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

/// The live store file and the single connection to it.
pub struct Store {
    path: PathBuf,
    conn: Option<SqliteConnection>,
}

impl Store {
    /// Opens (creating if needed) the store at `path`. A store file that did
    /// not exist before this call gets the default administrator account.
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let first_init = !path.exists();

        let mut conn = connect(&path)?;
        conn.batch_execute(SCHEMA)
            .map_err(|err| AppError::failed(format!("Could not create schema: {err}")))?;

        if first_init {
            match auth::seed_admin(&mut conn) {
                Ok(()) => info!(path = %path.display(), "created store with default admin"),
                Err(err) => warn!(error = %err, "seeding default admin failed"),
            }
        }

        Ok(Self {
            path,
            conn: Some(conn),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn conn(&mut self) -> AppResult<&mut SqliteConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| AppError::failed("Store is closed"))
    }

    /// Drops the connection so the file can be replaced underneath.
    pub fn close(&mut self) {
        self.conn = None;
    }

    /// Reconnects to the store file as it is now, without schema checks.
    pub fn reopen(&mut self) -> AppResult<()> {
        self.conn = Some(connect(&self.path)?);
        Ok(())
    }
}

fn connect(path: &Path) -> AppResult<SqliteConnection> {
    let database_url = path
        .to_str()
        .ok_or_else(|| AppError::failed(format!("Non UTF-8 store path {}", path.display())))?;
    let mut conn = SqliteConnection::establish(database_url)
        .map_err(|err| AppError::failed(format!("Error connecting to {database_url}: {err}")))?;
    // item references are soft: a transaction for a missing item is still recorded
    conn.batch_execute("PRAGMA foreign_keys = OFF")
        .map_err(|err| AppError::failed(format!("Could not configure {database_url}: {err}")))?;
    Ok(conn)
}

pub fn query_user_by_username(conn: &mut SqliteConnection, name: &str) -> AppResult<Option<User>> {
    use crate::schema::users::dsl::*;

    users
        .filter(username.eq(name))
        .select(User::as_select())
        .first(conn)
        .optional()
        .map_err(|err| AppError::failed(format!("Could not load user {name}: {err}")))
}

pub fn create_user(conn: &mut SqliteConnection, new_user: &NewUser) -> QueryResult<i32> {
    use crate::schema::users;

    diesel::insert_into(users::table)
        .values(new_user)
        .returning(users::id)
        .get_result(conn)
}

pub fn list_items(conn: &mut SqliteConnection) -> AppResult<Vec<Item>> {
    use crate::schema::inventory::dsl::*;

    inventory
        .order(id.desc())
        .select(Item::as_select())
        .load(conn)
        .map_err(|err| AppError::failed(format!("Could not load inventory: {err}")))
}

pub fn create_item(conn: &mut SqliteConnection, new_item: &NewItem) -> AppResult<i32> {
    use crate::schema::inventory;

    let item_id = diesel::insert_into(inventory::table)
        .values(new_item)
        .returning(inventory::id)
        .get_result(conn)
        .map_err(|err| AppError::failed(format!("Could not insert item {new_item:?}: {err}")))?;
    info!(item_id, name = new_item.name, "item added");
    Ok(item_id)
}

/// Overwrites every column of item `item_id`; returns the number of rows
/// changed, which is 0 for an unknown id.
pub fn update_item(
    conn: &mut SqliteConnection,
    item_id: i32,
    new_name: &str,
    new_unit: Option<&str>,
    new_quantity: f64,
) -> AppResult<usize> {
    use crate::schema::inventory::dsl::*;

    let changes = diesel::update(inventory.find(item_id))
        .set((name.eq(new_name), unit.eq(new_unit), quantity.eq(new_quantity)))
        .execute(conn)
        .map_err(|err| AppError::failed(format!("Could not update item {item_id}: {err}")))?;
    info!(item_id, changes, "item updated");
    Ok(changes)
}

/// Records a transaction, then moves the referenced item's quantity by the
/// signed amount. An unknown item leaves inventory untouched. The two writes
/// are separate statements, not one database transaction.
pub fn create_transaction(conn: &mut SqliteConnection, new_tx: &NewTransaction) -> AppResult<i32> {
    use crate::schema::{inventory, transactions};

    let tx_id = diesel::insert_into(transactions::table)
        .values(new_tx)
        .returning(transactions::id)
        .get_result(conn)
        .map_err(|err| AppError::failed(format!("Could not insert transaction: {err}")))?;

    let current: Option<f64> = inventory::table
        .find(new_tx.item_id)
        .select(inventory::quantity)
        .first(conn)
        .optional()
        .map_err(|err| AppError::failed(format!("Could not load item {}: {err}", new_tx.item_id)))?;

    match current {
        Some(stock) => {
            let new_stock = stock + new_tx.kind.signed(new_tx.qty);
            diesel::update(inventory::table.find(new_tx.item_id))
                .set(inventory::quantity.eq(new_stock))
                .execute(conn)
                .map_err(|err| {
                    AppError::failed(format!("Could not adjust item {}: {err}", new_tx.item_id))
                })?;
            info!(tx_id, item_id = new_tx.item_id, kind = %new_tx.kind, stock, new_stock, "transaction recorded");
        }
        None => {
            info!(tx_id, item_id = new_tx.item_id, "transaction recorded for unknown item, stock unchanged");
        }
    }
    Ok(tx_id)
}

pub fn list_transactions(
    conn: &mut SqliteConnection,
    filter: &TransactionFilter,
) -> AppResult<Vec<TransactionRow>> {
    use crate::schema::{inventory, transactions};

    let mut query = transactions::table
        .left_join(inventory::table)
        .select((Transaction::as_select(), inventory::name.nullable()))
        .into_boxed();

    if let Some(kind) = filter.kind {
        query = query.filter(transactions::kind.eq(kind));
    }
    if let Some(from) = filter.from {
        query = query.filter(transactions::timestamp.ge(from.and_time(NaiveTime::MIN)));
    }
    // `to` is inclusive: everything before the start of the following day.
    if let Some(next_day) = filter.to.and_then(|to| to.succ_opt()) {
        query = query.filter(transactions::timestamp.lt(next_day.and_time(NaiveTime::MIN)));
    }

    let rows: Vec<(Transaction, Option<String>)> = query
        .order((transactions::timestamp.desc(), transactions::id.desc()))
        .load(conn)
        .map_err(|err| AppError::failed(format!("Could not load transactions: {err}")))?;
    debug!(count = rows.len(), ?filter, "transactions listed");

    Ok(rows
        .into_iter()
        .map(|(transaction, item_name)| TransactionRow {
            transaction,
            item_name,
        })
        .collect())
}

pub fn query_transaction(conn: &mut SqliteConnection, tx_id: i32) -> AppResult<Option<TransactionRow>> {
    use crate::schema::{inventory, transactions};

    transactions::table
        .left_join(inventory::table)
        .filter(transactions::id.eq(tx_id))
        .select((Transaction::as_select(), inventory::name.nullable()))
        .first::<(Transaction, Option<String>)>(conn)
        .optional()
        .map_err(|err| AppError::failed(format!("Could not load transaction {tx_id}: {err}")))
        .map(|opt| {
            opt.map(|(transaction, item_name)| TransactionRow {
                transaction,
                item_name,
            })
        })
}

/// Every transaction in insertion order, as stored.
pub fn all_transactions(conn: &mut SqliteConnection) -> AppResult<Vec<Transaction>> {
    use crate::schema::transactions::dsl::*;

    transactions
        .order(id.asc())
        .select(Transaction::as_select())
        .load(conn)
        .map_err(|err| AppError::failed(format!("Could not load transactions: {err}")))
}

/// Stores a weighbridge reading; missing gross or tare count as 0. Returns
/// the new id and the computed net weight.
pub fn create_weighing(
    conn: &mut SqliteConnection,
    vehicle_no: Option<&str>,
    gross: Option<f64>,
    tare: Option<f64>,
    item_id: Option<i32>,
    party: Option<&str>,
) -> AppResult<(i32, f64)> {
    use crate::schema::weighings;

    let gross = gross.unwrap_or(0.0);
    let tare = tare.unwrap_or(0.0);
    let new_weighing = NewWeighing {
        vehicle_no,
        gross,
        tare,
        net: gross - tare,
        item_id,
        party,
    };

    let weighing_id = diesel::insert_into(weighings::table)
        .values(&new_weighing)
        .returning(weighings::id)
        .get_result(conn)
        .map_err(|err| AppError::failed(format!("Could not insert weighing {new_weighing:?}: {err}")))?;
    info!(weighing_id, net = new_weighing.net, "weighing recorded");
    Ok((weighing_id, new_weighing.net))
}

pub fn list_weighings(conn: &mut SqliteConnection) -> AppResult<Vec<WeighingRow>> {
    use crate::schema::{inventory, weighings};

    let rows: Vec<(Weighing, Option<String>)> = weighings::table
        .left_join(inventory::table)
        .select((Weighing::as_select(), inventory::name.nullable()))
        .order((weighings::timestamp.desc(), weighings::id.desc()))
        .load(conn)
        .map_err(|err| AppError::failed(format!("Could not load weighings: {err}")))?;

    Ok(rows
        .into_iter()
        .map(|(weighing, item_name)| WeighingRow {
            weighing,
            item_name,
        })
        .collect())
}
