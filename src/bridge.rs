//! Channel dispatch between the UI process and the handlers.
//!
//! Every channel takes a JSON payload and answers with a JSON value. Failures
//! never escape: they come back as `{ "error": message }`, and a dismissed
//! file dialog as `{ "canceled": true }`.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info_span, warn};

use crate::config::AppConfig;
use crate::db::{self, Store};
use crate::dialog::Dialogs;
use crate::error::{AppError, AppResult};
use crate::models::{NewItem, NewTransaction, TransactionFilter, TransactionKind};
use crate::{auth, backup, codes, csv_io, invoice};

/// One line of the host protocol.
#[derive(Debug, Deserialize)]
pub struct Request {
    pub channel: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct ItemInput {
    name: String,
    unit: Option<String>,
    quantity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ItemUpdate {
    id: i32,
    name: String,
    unit: Option<String>,
    quantity: f64,
}

#[derive(Debug, Deserialize)]
struct TransactionInput {
    #[serde(rename = "type")]
    kind: TransactionKind,
    item_id: i32,
    qty: f64,
    rate: Option<f64>,
    total: Option<f64>,
    party: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WeighingInput {
    vehicle_no: Option<String>,
    gross: Option<f64>,
    tare: Option<f64>,
    item_id: Option<i32>,
    party: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ExportRequest {
    #[serde(default, rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceRequest {
    transaction_id: i32,
}

#[derive(Debug, Default, Deserialize)]
struct CodeRequest {
    text: Option<String>,
}

fn parse<T: DeserializeOwned>(payload: Value) -> AppResult<T> {
    serde_json::from_value(payload)
        .map_err(|err| AppError::failed(format!("Invalid request payload: {err}")))
}

fn parse_or_default<T: DeserializeOwned + Default>(payload: Value) -> AppResult<T> {
    if payload.is_null() {
        Ok(T::default())
    } else {
        parse(payload)
    }
}

/// The live store plus the dialogs handlers use to ask for file paths.
pub struct App {
    store: Store,
    dialogs: Box<dyn Dialogs>,
}

impl App {
    pub fn new(store: Store, dialogs: Box<dyn Dialogs>) -> Self {
        Self { store, dialogs }
    }

    pub fn open(config: &AppConfig, dialogs: Box<dyn Dialogs>) -> AppResult<Self> {
        Ok(Self::new(Store::open(config.db_path())?, dialogs))
    }

    /// Runs one request to completion and renders its outcome.
    pub fn handle(&mut self, channel: &str, payload: Value) -> Value {
        let _span = info_span!("request", channel).entered();
        match self.dispatch(channel, payload) {
            Ok(value) => value,
            Err(AppError::UserCanceled) => {
                debug!("dialog dismissed");
                json!({ "canceled": true })
            }
            Err(err) => {
                warn!(error = %err, "request failed");
                json!({ "error": err.to_string() })
            }
        }
    }

    pub fn handle_request(&mut self, request: Request) -> Value {
        self.handle(&request.channel, request.payload)
    }

    fn dispatch(&mut self, channel: &str, payload: Value) -> AppResult<Value> {
        let dialogs = self.dialogs.as_ref();
        let store = &mut self.store;

        let value = match channel {
            "auth-login" => {
                let creds: Credentials = parse(payload)?;
                let session = auth::login(store.conn()?, &creds.username, &creds.password)?;
                serde_json::to_value(session)?
            }
            "auth-register" => {
                let creds: Credentials = parse(payload)?;
                let id = auth::register(store.conn()?, &creds.username, &creds.password)?;
                json!({ "id": id })
            }
            "inventory-list" => serde_json::to_value(db::list_items(store.conn()?)?)?,
            "inventory-add" => {
                let input: ItemInput = parse(payload)?;
                let new_item = NewItem {
                    name: &input.name,
                    unit: input.unit.as_deref(),
                    quantity: input.quantity.unwrap_or(0.0),
                };
                let id = db::create_item(store.conn()?, &new_item)?;
                json!({ "id": id })
            }
            "inventory-update" => {
                let input: ItemUpdate = parse(payload)?;
                let changes = db::update_item(
                    store.conn()?,
                    input.id,
                    &input.name,
                    input.unit.as_deref(),
                    input.quantity,
                )?;
                json!({ "changes": changes })
            }
            "transaction-add" => {
                let input: TransactionInput = parse(payload)?;
                let new_tx = NewTransaction {
                    kind: input.kind,
                    item_id: input.item_id,
                    qty: input.qty,
                    rate: input.rate,
                    total: input.total,
                    party: input.party.as_deref(),
                    notes: input.notes.as_deref(),
                };
                let id = db::create_transaction(store.conn()?, &new_tx)?;
                json!({ "id": id })
            }
            "transactions-list" => {
                let filter: TransactionFilter = parse_or_default(payload)?;
                serde_json::to_value(db::list_transactions(store.conn()?, &filter)?)?
            }
            "weighing-add" => {
                let input: WeighingInput = parse(payload)?;
                let (id, net) = db::create_weighing(
                    store.conn()?,
                    input.vehicle_no.as_deref(),
                    input.gross,
                    input.tare,
                    input.item_id,
                    input.party.as_deref(),
                )?;
                json!({ "id": id, "net": net })
            }
            "weighings-list" => serde_json::to_value(db::list_weighings(store.conn()?)?)?,
            "export-csv" => {
                let request: ExportRequest = parse_or_default(payload)?;
                let path = csv_io::export(store, dialogs, &request.kind)?;
                json!({ "saved": true, "path": path.display().to_string() })
            }
            "import-inventory-csv" => {
                let imported = csv_io::import_inventory(store, dialogs)?;
                json!({ "imported": imported })
            }
            "generate-invoice" => {
                let request: InvoiceRequest = parse(payload)?;
                let path = invoice::generate_invoice(store, dialogs, request.transaction_id)?;
                json!({ "saved": true, "path": path.display().to_string() })
            }
            "backup-db" => {
                let path = backup::backup(store, dialogs)?;
                json!({ "saved": true, "path": path.display().to_string() })
            }
            "restore-db" => {
                let path = backup::restore(store, dialogs)?;
                json!({ "restored": true, "path": path.display().to_string() })
            }
            "generate-qr" => {
                let request: CodeRequest = parse_or_default(payload)?;
                let data_url = codes::generate_qr(request.text.as_deref().unwrap_or(""))?;
                json!({ "dataUrl": data_url })
            }
            "generate-barcode" => {
                let request: CodeRequest = parse_or_default(payload)?;
                let data_url = codes::generate_barcode(request.text.as_deref().unwrap_or(""))?;
                json!({ "dataUrl": data_url })
            }
            "app-db-path" => json!({ "path": store.path().display().to_string() }),
            other => return Err(AppError::failed(format!("Unknown channel {other}"))),
        };
        Ok(value)
    }
}
