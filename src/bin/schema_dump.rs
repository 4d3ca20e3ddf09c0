//! Dump the static table definitions as JSON.
//!
//! Development aid for checking the physical schema against DDL.

use serde::Serialize;

use topostore::schema::tables::ALL_TABLES;
use topostore::{AttrType, Config};

#[derive(Serialize)]
struct ColumnView {
    name: &'static str,
    #[serde(rename = "type")]
    attr_type: AttrType,
    capacity: usize,
    primary_key: bool,
}

#[derive(Serialize)]
struct TableView {
    table: &'static str,
    columns: Vec<ColumnView>,
}

fn main() {
    let config = Config::load().unwrap_or_default();
    topostore::logging::init_logging(&config.logging);

    let views: Vec<TableView> = ALL_TABLES
        .iter()
        .map(|kind| {
            let def = kind.def();
            TableView {
                table: def.name,
                columns: def
                    .columns
                    .iter()
                    .map(|&(name, ty)| ColumnView {
                        name: name.as_str(),
                        attr_type: ty,
                        capacity: ty.capacity(),
                        primary_key: def.is_primary_key(name),
                    })
                    .collect(),
            }
        })
        .collect();

    match serde_json::to_string_pretty(&views) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("failed to serialize table definitions: {e}");
            std::process::exit(1);
        }
    }
}
