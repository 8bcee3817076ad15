//! Plain-text views.

use comfy_table::{ContentArrangement, Table};
use sweets_types::Sweet;

pub const LOGIN_HINT: &str = "You are not logged in. Run `sweets login --username <NAME>` to sign in.";

/// Renders the main inventory view.
pub fn inventory(sweets: &[Sweet]) -> String {
    if sweets.is_empty() {
        return "No sweets in the inventory.".to_string();
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(["ID", "Name", "Category", "Price", "Quantity", "Status"]);

    for sweet in sweets {
        table.add_row([
            sweet.id.to_string(),
            sweet.name.clone(),
            sweet.category.label().to_string(),
            format!("{:.2}", sweet.price),
            sweet.quantity.to_string(),
            status(sweet).to_string(),
        ]);
    }

    table.to_string()
}

/// Renders a single record as a two-column table.
pub fn detail(sweet: &Sweet) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut rows = vec![
        ("ID", sweet.id.to_string()),
        ("Name", sweet.name.clone()),
        ("Category", sweet.category.label().to_string()),
        ("Price", format!("{:.2}", sweet.price)),
        ("Quantity", sweet.quantity.to_string()),
    ];
    if let Some(level) = sweet.stock_level {
        rows.push(("Stock level", level.to_string()));
    }
    rows.push(("Status", status(sweet).to_string()));

    for (label, value) in rows {
        table.add_row([label.to_string(), value]);
    }

    table.to_string()
}

fn status(sweet: &Sweet) -> &'static str {
    match sweet.is_available {
        Some(false) => "Unavailable",
        _ if sweet.quantity == 0 => "Out of stock",
        _ => "In stock",
    }
}
