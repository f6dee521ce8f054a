mod common;

use common::Fixture;
use ricemill::csv_io;
use ricemill::db;
use ricemill::models::{NewItem, NewTransaction, TransactionKind};
use ricemill::AppError;
use std::fs;

fn add_item(fx: &mut Fixture, name: &str, quantity: f64) -> i32 {
    db::create_item(
        fx.store.conn().unwrap(),
        &NewItem {
            name,
            unit: Some("kg"),
            quantity,
        },
    )
    .unwrap()
}

#[test]
fn empty_inventory_exports_empty_file_and_imports_nothing() {
    let mut fx = Fixture::new();
    let out = fx.path("inventory.csv");
    fx.dialogs.answer(&out);

    let path = csv_io::export(&mut fx.store, &fx.dialogs, "inventory").unwrap();
    assert_eq!(path, out);
    assert_eq!(fs::read_to_string(&out).unwrap(), "");

    fx.dialogs.answer(&out);
    let imported = csv_io::import_inventory(&mut fx.store, &fx.dialogs).unwrap();
    assert_eq!(imported, 0);
    assert!(db::list_items(fx.store.conn().unwrap()).unwrap().is_empty());
    assert_eq!(fx.dialogs.asked(), vec!["inventory.csv", "CSV"]);
}

#[test]
fn inventory_round_trip_preserves_names_and_quantities() {
    let mut fx = Fixture::new();
    add_item(&mut fx, "Basmati", 120.0);
    add_item(&mut fx, "Sona Masuri, polished", 42.5);
    add_item(&mut fx, "Bran", 0.0);

    let out = fx.path("inventory.csv");
    fx.dialogs.answer(&out);
    csv_io::export(&mut fx.store, &fx.dialogs, "inventory").unwrap();
    let header = fs::read_to_string(&out).unwrap();
    assert!(header.starts_with("id,name,unit,quantity\n"));

    fx.dialogs.answer(&out);
    let imported = csv_io::import_inventory(&mut fx.store, &fx.dialogs).unwrap();
    assert_eq!(imported, 3);

    let items = db::list_items(fx.store.conn().unwrap()).unwrap();
    assert_eq!(items.len(), 6);
    let mut originals: Vec<(String, f64)> = items[3..].iter().map(|i| (i.name.clone(), i.quantity)).collect();
    let mut copies: Vec<(String, f64)> = items[..3].iter().map(|i| (i.name.clone(), i.quantity)).collect();
    originals.sort_by(|a, b| a.0.cmp(&b.0));
    copies.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(originals, copies);
}

#[test]
fn transactions_export_imports_as_unknown_items() {
    let mut fx = Fixture::new();
    let paddy = add_item(&mut fx, "Paddy", 50.0);
    for qty in [5.0, 7.5] {
        db::create_transaction(
            fx.store.conn().unwrap(),
            &NewTransaction {
                kind: TransactionKind::Sale,
                item_id: paddy,
                qty,
                rate: None,
                total: None,
                party: None,
                notes: Some("gate 2"),
            },
        )
        .unwrap();
    }

    let out = fx.path("transactions.csv");
    fx.dialogs.answer(&out);
    csv_io::export(&mut fx.store, &fx.dialogs, "transactions").unwrap();
    let content = fs::read_to_string(&out).unwrap();
    assert!(content.starts_with("id,type,item_id,qty,rate,total,party,notes,timestamp\n"));
    assert_eq!(content.lines().count(), 3);

    fx.dialogs.answer(&out);
    assert_eq!(csv_io::import_inventory(&mut fx.store, &fx.dialogs).unwrap(), 2);
    let items = db::list_items(fx.store.conn().unwrap()).unwrap();
    let imported: Vec<(&str, f64)> = items
        .iter()
        .filter(|item| item.id != paddy)
        .map(|item| (item.name.as_str(), item.quantity))
        .collect();
    assert_eq!(imported, vec![("Unknown", 7.5), ("Unknown", 5.0)]);
}

#[test]
fn import_maps_alternate_columns() {
    let mut fx = Fixture::new();
    let src = fx.path("stock.csv");
    fs::write(&src, "item , qty, unit\n Broken rice , 12 ,kg\n, abc,\n").unwrap();
    fx.dialogs.answer(&src);

    assert_eq!(csv_io::import_inventory(&mut fx.store, &fx.dialogs).unwrap(), 2);
    let items = db::list_items(fx.store.conn().unwrap()).unwrap();
    assert_eq!(items[1].name, "Broken rice");
    assert_eq!(items[1].quantity, 12.0);
    assert_eq!(items[1].unit.as_deref(), Some("kg"));
    assert_eq!(items[0].name, "Unknown");
    assert_eq!(items[0].quantity, 0.0);
    assert_eq!(items[0].unit.as_deref(), Some(""));
}

#[test]
fn dismissed_dialogs_cancel() {
    let mut fx = Fixture::new();
    fx.dialogs.dismiss();
    assert!(matches!(
        csv_io::export(&mut fx.store, &fx.dialogs, "inventory"),
        Err(AppError::UserCanceled)
    ));
    assert!(matches!(
        csv_io::import_inventory(&mut fx.store, &fx.dialogs),
        Err(AppError::UserCanceled)
    ));
}

#[test]
fn unreadable_import_file_fails() {
    let mut fx = Fixture::new();
    fx.dialogs.answer(fx.path("missing.csv"));
    assert!(matches!(
        csv_io::import_inventory(&mut fx.store, &fx.dialogs),
        Err(AppError::OperationFailed(_))
    ));
}
