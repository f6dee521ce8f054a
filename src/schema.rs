// Mirrors the tables created by `db::SCHEMA`.

diesel::table! {
    users (id) {
        id -> Integer,
        username -> Text,
        password -> Text,
        role -> Text,
    }
}

diesel::table! {
    inventory (id) {
        id -> Integer,
        name -> Text,
        unit -> Nullable<Text>,
        quantity -> Double,
    }
}

diesel::table! {
    transactions (id) {
        id -> Integer,
        #[sql_name = "type"]
        kind -> Text,
        item_id -> Integer,
        qty -> Double,
        rate -> Nullable<Double>,
        total -> Nullable<Double>,
        party -> Nullable<Text>,
        notes -> Nullable<Text>,
        timestamp -> Timestamp,
    }
}

diesel::table! {
    weighings (id) {
        id -> Integer,
        vehicle_no -> Nullable<Text>,
        gross -> Double,
        tare -> Double,
        net -> Double,
        item_id -> Nullable<Integer>,
        party -> Nullable<Text>,
        timestamp -> Timestamp,
    }
}

diesel::joinable!(transactions -> inventory (item_id));
diesel::joinable!(weighings -> inventory (item_id));

diesel::allow_tables_to_appear_in_same_query!(users, inventory, transactions, weighings,);
