/// Tree Filter Example
///
/// This example demonstrates:
/// - Filtering tree-shaped records, keeping ancestors of matches
/// - Driving a filter dropdown through staging, search and confirm
/// - Looking up nested rows by key

use tablepipe::{Column, FilterItem, FilterMode, FilterSearch, Key, LeafColumn, Record, Table};

fn department(key: &str, name: &str, members: Vec<Record>) -> Record {
    Record::new()
        .with("key", key)
        .with("name", name)
        .with("role", "department")
        .with("children", members)
}

fn member(key: &str, name: &str, role: &str) -> Record {
    Record::new().with("key", key).with("name", name).with("role", role)
}

fn print_tree(rows: &[Record], depth: usize) {
    for row in rows {
        println!(
            "   {}{} ({})",
            "  ".repeat(depth),
            row.get("name").and_then(|v| v.as_str()).unwrap_or("-"),
            row.get("role").and_then(|v| v.as_str()).unwrap_or("-"),
        );
        if let Some(children) = row.children("children") {
            print_tree(children, depth + 1);
        }
    }
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    println!("=== tablepipe Tree Filter Example ===\n");

    // 1. Build a two-level organisation
    println!("1. Building organisation tree...");
    let data = vec![
        department(
            "eng",
            "Engineering",
            vec![
                member("eng-1", "Ada", "engineer"),
                member("eng-2", "Linus", "manager"),
                member("eng-3", "Grace", "engineer"),
            ],
        ),
        department(
            "ops",
            "Operations",
            vec![member("ops-1", "Ken", "manager"), member("ops-2", "Barbara", "analyst")],
        ),
        department("lab", "Research", vec![member("lab-1", "Alan", "analyst")]),
    ];
    print_tree(&data, 0);
    println!();

    let columns: Vec<Column> = vec![
        LeafColumn::new("Name").data_index("name").into(),
        LeafColumn::new("Role")
            .data_index("role")
            .filters(vec![
                FilterItem::new("Staff", "staff").with_children(vec![
                    FilterItem::new("Engineer", "engineer"),
                    FilterItem::new("Analyst", "analyst"),
                ]),
                FilterItem::new("Manager", "manager"),
            ])
            .filter_mode(FilterMode::Tree)
            .filter_search(FilterSearch::Substring)
            .on_filter(|value, record| {
                record.get("role").and_then(|v| v.as_str()) == Some(value.to_string().as_str())
            })
            .into(),
    ];
    let mut table = Table::new(columns, data);

    // 2. Stage a selection in the dropdown
    println!("2. Opening the role dropdown and searching for 'an'...");
    table.open_filter_dropdown("role");
    table.set_filter_search("role", "an");
    if let Some(affordance) = table
        .decorated_columns()
        .iter()
        .find(|h| h.key == "role")
        .and_then(|h| h.filter.clone())
    {
        for option in &affordance.options {
            println!("   option: {} (checked: {})", option.text, option.checked);
        }
    }
    println!();

    // 3. Confirm managers only
    println!("3. Confirming 'manager'...");
    table.toggle_filter_key("role", "manager");
    table.confirm_filter("role");
    print_tree(&table.page_data(), 0);
    println!();

    // 4. Switch to analysts directly
    println!("4. Filtering to analysts...");
    table.request_filter("role", Some(vec![Key::from("analyst")]));
    print_tree(&table.page_data(), 0);
    println!();

    // 5. Nested lookup
    println!("5. Looking up 'ops-2' by key...");
    match table.record_by_key(&Key::from("ops-2")) {
        Some(record) => println!(
            "   found {}",
            record.get("name").and_then(|v| v.as_str()).unwrap_or("-")
        ),
        None => println!("   not found"),
    }

    println!("\n=== Example Complete ===");
}
