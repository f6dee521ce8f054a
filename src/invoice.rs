use chrono::{Datelike, Duration, Local, NaiveDateTime, Utc};
use derive_typst_intoval::{IntoDict, IntoValue};
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::info;
use typst::diag::{FileError, FileResult, SourceDiagnostic};
use typst::foundations::{Bytes, Datetime, Dict, IntoValue};
use typst::layout::PagedDocument;
use typst::syntax::{FileId, Source, VirtualPath};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_kit::fonts::{FontSearcher, FontSlot, Fonts};
use typst_pdf::PdfOptions;

use crate::db::{self, Store};
use crate::dialog::Dialogs;
use crate::error::{AppError, AppResult};
use crate::models::TransactionRow;

const TEMPLATE: &str = include_str!("invoice.typ");

/// Values exposed to the template as `sys.inputs`.
#[derive(Debug, Clone, IntoValue, IntoDict)]
pub struct InvoiceFields {
    pub id: i64,
    pub kind: String,
    pub item: String,
    pub qty: String,
    pub rate: String,
    pub total: String,
    pub party: String,
    pub date: String,
}

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl From<&TransactionRow> for InvoiceFields {
    fn from(row: &TransactionRow) -> Self {
        let tx = &row.transaction;
        Self {
            id: i64::from(tx.id),
            kind: tx.kind.to_string(),
            item: row.item_name.clone().unwrap_or_default(),
            qty: tx.qty.to_string(),
            rate: number(tx.rate),
            total: number(tx.total),
            party: tx.party.clone().unwrap_or_default(),
            date: tx.timestamp.to_string(),
        }
    }
}

fn fonts() -> &'static Fonts {
    static FONTS: OnceLock<Fonts> = OnceLock::new();
    FONTS.get_or_init(|| FontSearcher::new().include_system_fonts(false).search())
}

/// Single-file world: the invoice template plus the embedded fonts.
struct InvoiceWorld {
    library: LazyHash<Library>,
    book: LazyHash<FontBook>,
    fonts: &'static [FontSlot],
    source: Source,
}

impl InvoiceWorld {
    fn new(fields: InvoiceFields) -> Self {
        let fonts = fonts();
        let inputs: Dict = fields.into_dict();
        let id = FileId::new(None, VirtualPath::new("invoice.typ"));
        Self {
            library: LazyHash::new(Library::builder().with_inputs(inputs).build()),
            book: LazyHash::new(fonts.book.clone()),
            fonts: &fonts.fonts,
            source: Source::new(id, TEMPLATE.to_string()),
        }
    }
}

impl World for InvoiceWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.source.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.source.id() {
            Ok(self.source.clone())
        } else {
            Err(FileError::AccessDenied)
        }
    }

    fn file(&self, _id: FileId) -> FileResult<Bytes> {
        Err(FileError::AccessDenied)
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index)?.get()
    }

    fn today(&self, offset: Option<i64>) -> Option<Datetime> {
        let now: NaiveDateTime = match offset {
            None => Local::now().naive_local(),
            Some(hours) => Utc::now().naive_utc() + Duration::hours(hours),
        };
        Datetime::from_ymd(now.year(), now.month() as u8, now.day() as u8)
    }
}

fn diagnostics_error(diagnostics: &[SourceDiagnostic]) -> AppError {
    let messages = diagnostics
        .iter()
        .map(|diag| diag.message.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    AppError::failed(format!("Could not render invoice: {messages}"))
}

fn compile_invoice(fields: InvoiceFields) -> AppResult<PagedDocument> {
    let world = InvoiceWorld::new(fields);
    typst::compile(&world)
        .output
        .map_err(|diags| diagnostics_error(&diags))
}

/// Lays out the single-page invoice and returns the PDF bytes.
pub fn render_pdf(fields: InvoiceFields) -> AppResult<Vec<u8>> {
    let document = compile_invoice(fields)?;
    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|diags| diagnostics_error(&diags))
}

pub fn generate_invoice(store: &mut Store, dialogs: &dyn Dialogs, tx_id: i32) -> AppResult<PathBuf> {
    let row = db::query_transaction(store.conn()?, tx_id)?
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;
    let path = dialogs
        .save_file(&format!("invoice-{tx_id}.pdf"))
        .ok_or(AppError::UserCanceled)?;

    let pdf = render_pdf(InvoiceFields::from(&row))?;
    fs::write(&path, pdf)?;
    info!(tx_id, path = %path.display(), "invoice written");
    Ok(path)
}
