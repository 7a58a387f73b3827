/// Basic Table Example
///
/// This example demonstrates:
/// - Building a table from columns and JSON records
/// - Sorting, filtering and paging through the rows
/// - Receiving one change event per interaction

use tablepipe::{Column, FilterItem, Key, LeafColumn, PaginationConfig, Record, SortOrder, Sorter, Table};

const PEOPLE: &str = r#"[
    {"key": 1, "name": "Alice", "age": 32, "city": "London"},
    {"key": 2, "name": "Bob", "age": 42, "city": "Paris"},
    {"key": 3, "name": "Carol", "age": 27, "city": "London"},
    {"key": 4, "name": "Dave", "age": 51, "city": "Berlin"},
    {"key": 5, "name": "Eve", "age": 38, "city": "Paris"},
    {"key": 6, "name": "Frank", "age": 23, "city": "London"},
    {"key": 7, "name": "Grace", "age": 45, "city": "Berlin"}
]"#;

fn print_rows(rows: &[Record]) {
    for row in rows {
        println!(
            "   {:<6} {:>3}  {}",
            row.get("name").and_then(|v| v.as_str()).unwrap_or("-"),
            row.get("age").and_then(|v| v.as_i64()).unwrap_or_default(),
            row.get("city").and_then(|v| v.as_str()).unwrap_or("-"),
        );
    }
    println!();
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    println!("=== tablepipe Basic Table Example ===\n");

    // 1. Describe the columns
    println!("1. Defining columns...");
    let columns: Vec<Column> = vec![
        LeafColumn::new("Name").data_index("name").into(),
        LeafColumn::new("Age")
            .data_index("age")
            .sorter(Sorter::by_field("age"))
            .sort_directions(vec![SortOrder::Descend, SortOrder::Ascend])
            .into(),
        LeafColumn::new("City")
            .data_index("city")
            .filters(vec![
                FilterItem::new("London", "London"),
                FilterItem::new("Paris", "Paris"),
                FilterItem::new("Berlin", "Berlin"),
            ])
            .on_filter(|value, record| {
                record.get("city").and_then(|v| v.as_str()) == Some(value.to_string().as_str())
            })
            .into(),
    ];
    println!("   {} columns defined\n", columns.len());

    // 2. Load the records
    println!("2. Loading records from JSON...");
    let records = match Record::list_from_json(PEOPLE) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("   Failed to load records: {}", e);
            return;
        }
    };
    let mut table = Table::builder(columns)
        .data(records)
        .pagination(PaginationConfig::default().default_page_size(3))
        .build();
    table.set_listener(|event| {
        println!(
            "   -> {:?} event, {} row(s) across all pages",
            event.extra.action,
            event.extra.current_data_source.len()
        );
    });
    println!("   {} records loaded\n", table.data().len());

    // 3. First page, unsorted
    println!("3. First page:");
    print_rows(&table.page_data());

    // 4. Sort by age (descending first for this column)
    println!("4. Sorting by age...");
    table.request_sort("age");
    print_rows(&table.page_data());

    // 5. Move to the next page
    println!("5. Page 2:");
    table.request_page(2, None);
    print_rows(&table.page_data());

    // 6. Filter to London and Paris; the page resets to 1
    println!("6. Filtering cities to London and Paris...");
    table.request_filter("city", Some(vec![Key::from("London"), Key::from("Paris")]));
    if let Some(state) = table.pagination_state() {
        println!("   page {} of {} ({} rows)", state.current, state.max_page(), state.total);
    }
    print_rows(&table.page_data());

    // 7. Decorated headers
    println!("7. Header state:");
    for header in table.decorated_columns() {
        println!("   {:<5} classes: {:?}", header.title, header.class_names);
    }

    println!("\n=== Example Complete ===");
}
