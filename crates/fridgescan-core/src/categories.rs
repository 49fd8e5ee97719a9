//! Static label-to-category table

use std::collections::HashMap;
use std::sync::LazyLock;

/// Fallback category for labels absent from the table.
pub const OTHER_CATEGORY: &str = "Other";

/// Known food labels with their categories. Keys are lowercase.
pub const CATEGORY_TABLE: &[(&str, &str)] = &[
    ("apple", "Fruits"),
    ("banana", "Fruits"),
    ("orange", "Fruits"),
    ("lemon", "Fruits"),
    ("pear", "Fruits"),
    ("grape", "Fruits"),
    ("strawberry", "Fruits"),
    ("watermelon", "Fruits"),
    ("pineapple", "Fruits"),
    ("mango", "Fruits"),
    ("avocado", "Fruits"),
    ("peach", "Fruits"),
    ("carrot", "Vegetables"),
    ("broccoli", "Vegetables"),
    ("potato", "Vegetables"),
    ("tomato", "Vegetables"),
    ("onion", "Vegetables"),
    ("pepper", "Vegetables"),
    ("cucumber", "Vegetables"),
    ("lettuce", "Vegetables"),
    ("cabbage", "Vegetables"),
    ("corn", "Vegetables"),
    ("celery", "Vegetables"),
    ("mushroom", "Vegetables"),
    ("bottle", "Beverages"),
    ("cup", "Beverages"),
    ("wine glass", "Beverages"),
    ("milk", "Beverages"),
    ("juice", "Beverages"),
    ("soda", "Beverages"),
    ("water bottle", "Beverages"),
    ("beer", "Beverages"),
    ("wine", "Beverages"),
    ("sandwich", "Food"),
    ("pizza", "Food"),
    ("hot dog", "Food"),
    ("hamburger", "Food"),
    ("bread", "Food"),
    ("cheese", "Food"),
    ("egg", "Food"),
    ("meat", "Food"),
    ("chicken", "Food"),
    ("fish", "Food"),
    ("pasta", "Food"),
    ("rice", "Food"),
    ("soup", "Food"),
    ("salad", "Food"),
    ("yogurt", "Dairy"),
    ("cake", "Desserts"),
    ("donut", "Desserts"),
    ("cookie", "Desserts"),
    ("ice cream", "Desserts"),
    ("chocolate", "Desserts"),
    ("candy", "Desserts"),
    ("bowl", "Containers"),
    ("plate", "Containers"),
    ("jar", "Containers"),
    ("can", "Containers"),
    ("box", "Containers"),
    ("spoon", "Utensils"),
    ("knife", "Utensils"),
    ("fork", "Utensils"),
];

static TABLE: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| CATEGORY_TABLE.iter().copied().collect());

/// Category for a label, if it is in the table. Exact (lowercase) match.
pub fn category_for(label: &str) -> Option<&'static str> {
    TABLE.get(label).copied()
}

/// Category for a label, falling back to [`OTHER_CATEGORY`].
pub fn category_or_other(label: &str) -> &'static str {
    category_for(label).unwrap_or(OTHER_CATEGORY)
}

/// Map view of the full table.
pub fn table() -> &'static HashMap<&'static str, &'static str> {
    &TABLE
}

/// Number of labels in the table.
pub fn label_count() -> usize {
    CATEGORY_TABLE.len()
}
