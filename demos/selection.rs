/// Row Selection Example
///
/// This example demonstrates:
/// - Checkbox selection with disabled rows
/// - Bulk operations (all, invert, none) and shift-range selection
/// - Selection surviving filtering and paging

use tablepipe::{
    CheckboxProps, Column, FilterItem, Key, LeafColumn, PaginationConfig, Record, SelectionConfig, Table,
};

fn show(table: &Table) {
    let keys: Vec<String> = table.selected_keys().iter().map(|k| k.to_string()).collect();
    println!("   selected: [{}]\n", keys.join(", "));
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    println!("=== tablepipe Selection Example ===\n");

    // 1. Twelve tasks, two of them locked
    println!("1. Creating tasks...");
    let data: Vec<Record> = (1..=12)
        .map(|i| {
            Record::new()
                .with("key", format!("t{}", i))
                .with("title", format!("Task {}", i))
                .with("done", i % 3 == 0)
                .with("locked", i == 2 || i == 7)
        })
        .collect();
    let columns: Vec<Column> = vec![
        LeafColumn::new("Title").data_index("title").into(),
        LeafColumn::new("Done")
            .data_index("done")
            .filters(vec![FilterItem::new("Open", "open"), FilterItem::new("Done", "done")])
            .on_filter(|value, record| {
                let done = record.get("done").and_then(|v| v.as_bool()).unwrap_or(false);
                (value.to_string() == "done") == done
            })
            .into(),
    ];

    let mut table = Table::builder(columns)
        .data(data)
        .pagination(PaginationConfig::default().default_page_size(5))
        .selection(SelectionConfig::default().get_checkbox_props(|record| CheckboxProps {
            disabled: record.get("locked").and_then(|v| v.as_bool()).unwrap_or(false),
        }))
        .build();
    table.set_selection_listener(|change| {
        println!("   -> {:?}: {} key(s) selected", change.method, change.keys.len());
    });
    println!("   {} tasks, page size 5\n", table.data().len());

    // 2. Select everything on the first page; t2 is locked
    println!("2. Select all on page 1...");
    table.select_all();
    show(&table);

    // 3. Invert on page 2
    println!("3. Invert on page 2...");
    table.request_page(2, None);
    table.toggle_row("t6");
    table.select_invert();
    show(&table);

    // 4. Shift-range from t6 to t9
    println!("4. Range select up to t9...");
    table.toggle_row("t6");
    table.select_range("t9");
    show(&table);

    // 5. Filter to open tasks; hidden selections are kept
    println!("5. Filtering to open tasks...");
    table.request_filter("done", Some(vec![Key::from("open")]));
    println!("   {} rows visible", table.filtered_data().len());
    show(&table);

    // 6. Clear the selection
    println!("6. Select none...");
    table.select_none();
    show(&table);

    if let Some(cell) = table.selection_cell(&Key::from("t2")) {
        println!("   t2 disabled: {}", cell.disabled);
    }

    println!("\n=== Example Complete ===");
}
