// Placeholder expansion for column names and panel titles
use std::collections::HashMap;

/// Replace `${name}` variables in a template string
pub fn prepare_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
