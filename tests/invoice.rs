mod common;

use common::Fixture;
use ricemill::AppError;
use ricemill::db;
use ricemill::invoice;
use ricemill::models::{NewItem, NewTransaction, TransactionKind};
use std::fs;

fn sale(fx: &mut Fixture) -> i32 {
    let conn = fx.store.conn().unwrap();
    let item_id = db::create_item(
        conn,
        &NewItem {
            name: "Rice Bag",
            unit: Some("kg"),
            quantity: 100.0,
        },
    )
    .unwrap();
    db::create_transaction(
        conn,
        &NewTransaction {
            kind: TransactionKind::Sale,
            item_id,
            qty: 30.0,
            rate: Some(45.5),
            total: Some(1365.0),
            party: Some("Gupta Stores"),
            notes: None,
        },
    )
    .unwrap()
}

#[test]
fn writes_pdf_to_chosen_path() {
    let mut fx = Fixture::new();
    let tx_id = sale(&mut fx);
    let out = fx.path("invoice.pdf");
    fx.dialogs.answer(&out);

    let saved = invoice::generate_invoice(&mut fx.store, &fx.dialogs, tx_id).unwrap();
    assert_eq!(saved, out);
    assert_eq!(fx.dialogs.asked(), vec![format!("invoice-{tx_id}.pdf")]);
    let bytes = fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn unknown_transaction_is_not_found() {
    let mut fx = Fixture::new();
    let err = invoice::generate_invoice(&mut fx.store, &fx.dialogs, 404).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(err.to_string(), "Transaction not found");
}

#[test]
fn dismissing_the_dialog_cancels() {
    let mut fx = Fixture::new();
    let tx_id = sale(&mut fx);
    fx.dialogs.dismiss();
    assert!(matches!(
        invoice::generate_invoice(&mut fx.store, &fx.dialogs, tx_id),
        Err(AppError::UserCanceled)
    ));
}
