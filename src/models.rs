use chrono::{NaiveDate, NaiveDateTime};
use diesel::backend::Backend;
use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::serialize::{IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use diesel::{deserialize, serialize};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, NoneAsEmptyString, serde_as};
use std::fmt;
use std::str::FromStr;

use crate::schema::{inventory, transactions, users, weighings};

#[derive(Debug, Clone, Copy, FromSqlRow, AsExpression, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Purchase,
    Sale,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Purchase => "purchase",
            TransactionKind::Sale => "sale",
        }
    }

    /// Signed quantity change this kind applies to the stocked item.
    pub fn signed(self, qty: f64) -> f64 {
        match self {
            TransactionKind::Purchase => qty,
            TransactionKind::Sale => -qty,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "purchase" => Ok(TransactionKind::Purchase),
            "sale" => Ok(TransactionKind::Sale),
            other => Err(format!("unknown transaction type: {other:?}")),
        }
    }
}

impl ToSql<Text, Sqlite> for TransactionKind {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for TransactionKind {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let raw = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        raw.parse().map_err(Into::into)
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub role: &'a str,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = inventory)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub unit: Option<String>,
    pub quantity: f64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = inventory)]
pub struct NewItem<'a> {
    pub name: &'a str,
    pub unit: Option<&'a str>,
    pub quantity: f64,
}

#[serde_as]
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = transactions)]
pub struct Transaction {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub item_id: i32,
    pub qty: f64,
    pub rate: Option<f64>,
    pub total: Option<f64>,
    pub party: Option<String>,
    pub notes: Option<String>,
    #[serde_as(as = "DisplayFromStr")]
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = transactions)]
pub struct NewTransaction<'a> {
    pub kind: TransactionKind,
    pub item_id: i32,
    pub qty: f64,
    pub rate: Option<f64>,
    pub total: Option<f64>,
    pub party: Option<&'a str>,
    pub notes: Option<&'a str>,
}

/// A transaction together with the name of the item it refers to, if that
/// item still exists.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRow {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub item_name: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = weighings)]
pub struct Weighing {
    pub id: i32,
    pub vehicle_no: Option<String>,
    pub gross: f64,
    pub tare: f64,
    pub net: f64,
    pub item_id: Option<i32>,
    pub party: Option<String>,
    #[serde_as(as = "DisplayFromStr")]
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = weighings)]
pub struct NewWeighing<'a> {
    pub vehicle_no: Option<&'a str>,
    pub gross: f64,
    pub tare: f64,
    pub net: f64,
    pub item_id: Option<i32>,
    pub party: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeighingRow {
    #[serde(flatten)]
    pub weighing: Weighing,
    pub item_name: Option<String>,
}

/// Optional restrictions for transaction listings. Empty strings count as
/// absent; `from`/`to` are inclusive calendar dates.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct TransactionFilter {
    #[serde(default, rename = "type")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub kind: Option<TransactionKind>,
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub to: Option<NaiveDate>,
}
