use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::db::{self, Store};
use crate::dialog::{CSV_FILES, Dialogs};
use crate::error::{AppError, AppResult};
use crate::models::NewItem;

/// Writes `rows` to `path`. Headers come from the first row's field names,
/// so an empty slice yields an empty file.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> AppResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Dumps the inventory (`kind == "inventory"`) or the transactions table
/// (anything else) to a file the user picks.
pub fn export(store: &mut Store, dialogs: &dyn Dialogs, kind: &str) -> AppResult<PathBuf> {
    let conn = store.conn()?;
    let path = if kind == "inventory" {
        let rows = db::list_items(conn)?;
        let path = dialogs
            .save_file("inventory.csv")
            .ok_or(AppError::UserCanceled)?;
        write_rows(&path, &rows)?;
        info!(path = %path.display(), rows = rows.len(), "inventory exported");
        path
    } else {
        let rows = db::all_transactions(conn)?;
        let path = dialogs
            .save_file("transactions.csv")
            .ok_or(AppError::UserCanceled)?;
        write_rows(&path, &rows)?;
        info!(path = %path.display(), rows = rows.len(), "transactions exported");
        path
    };
    Ok(path)
}

/// One parsed CSV record mapped onto the inventory shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedItem {
    pub name: String,
    pub unit: String,
    pub quantity: f64,
}

fn first_non_empty<'a>(record: &'a HashMap<String, String>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .map(String::as_str)
        .find(|value| !value.is_empty())
}

impl ImportedItem {
    fn from_record(record: &HashMap<String, String>) -> Self {
        let name = first_non_empty(record, &["name", "item"]).unwrap_or("Unknown");
        let unit = first_non_empty(record, &["unit"]).unwrap_or("");
        let quantity = first_non_empty(record, &["quantity", "qty"])
            .and_then(|value| value.parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .unwrap_or(0.0);
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            quantity,
        }
    }
}

/// Parses a headed CSV file in full before anything is stored.
pub fn read_items(path: &Path) -> AppResult<Vec<ImportedItem>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    reader
        .deserialize::<HashMap<String, String>>()
        .map(|record| Ok(ImportedItem::from_record(&record?)))
        .collect()
}

/// Adds one inventory item per record of a CSV file the user picks. Existing
/// items are never merged. Returns how many rows were inserted.
pub fn import_inventory(store: &mut Store, dialogs: &dyn Dialogs) -> AppResult<usize> {
    let path = dialogs.open_file(CSV_FILES).ok_or(AppError::UserCanceled)?;
    let items = read_items(&path)?;

    let conn = store.conn()?;
    conn.transaction::<_, AppError, _>(|conn| {
        for item in &items {
            db::create_item(
                conn,
                &NewItem {
                    name: &item.name,
                    unit: Some(&item.unit),
                    quantity: item.quantity,
                },
            )?;
        }
        Ok(())
    })?;
    info!(path = %path.display(), imported = items.len(), "inventory imported");
    Ok(items.len())
}
