//! `{{variable}}` placeholder handling for model content

use std::collections::HashMap;

/// Extract placeholder names from model content, in order of first
/// appearance, without duplicates.
pub fn extract_variables(content: &str) -> Vec<String> {
    let re = regex_lite::Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").unwrap();
    let mut names = Vec::new();
    for cap in re.captures_iter(content) {
        let name = cap[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Replace each `{{name}}` with its value from `values`.
///
/// Placeholders without a value are left intact so the user can still spot
/// and fill them by hand after insertion.
pub fn render(content: &str, values: &HashMap<String, String>) -> String {
    let re = regex_lite::Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").unwrap();
    re.replace_all(content, |cap: &regex_lite::Captures| {
        match values.get(&cap[1]) {
            Some(value) => value.clone(),
            None => cap[0].to_string(),
        }
    })
    .into_owned()
}
