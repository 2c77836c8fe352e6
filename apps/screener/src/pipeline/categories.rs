//! Category resolution — static id → name table of the trained model.

use crate::models::prediction::{CategoryId, CategoryName};

pub const UNKNOWN: CategoryName = CategoryName("Unknown");

/// Category names indexed by id, in the label-encoder order used at training time.
pub static CATEGORIES: [&str; 25] = [
    "Advocate",
    "Arts",
    "Automation Testing",
    "Blockchain",
    "Business Analyst",
    "Civil Engineer",
    "Data Science",
    "Database",
    "DevOps Engineer",
    "DotNet Developer",
    "ETL Developer",
    "Electrical Engineering",
    "HR",
    "Hadoop",
    "Health and fitness",
    "Java Developer",
    "Mechanical Engineer",
    "Network Security Engineer",
    "Operations Manager",
    "PMO",
    "Python Developer",
    "SAP Developer",
    "Sales",
    "Testing",
    "Web Designing",
];

/// Resolves an id to its category name. Total: ids outside the table are `"Unknown"`.
pub fn resolve(id: CategoryId) -> CategoryName {
    usize::try_from(id.0)
        .ok()
        .and_then(|i| CATEGORIES.get(i))
        .map(|name| CategoryName(*name))
        .unwrap_or(UNKNOWN)
}
