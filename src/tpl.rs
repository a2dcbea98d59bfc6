use std::collections::HashMap;

/// Template processor for resolving $VARIABLE references in build steps
pub struct Tpl {
    variables: HashMap<String, String>,
}

impl Tpl {
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
        }
    }

    /// Register a variable with its value
    pub fn register<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.variables.insert(key.into(), value.into());
    }

    /// Parse a string and resolve all $VARIABLE references.
    /// Longer names are substituted first so `$PRODUCT` never matches a `$PROD` prefix.
    pub fn parse(&self, input: &str) -> String {
        let mut keys: Vec<&String> = self.variables.keys().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let mut result = input.to_string();
        for key in keys {
            let pattern = format!("${}", key);
            result = result.replace(&pattern, &self.variables[key]);
        }

        result
    }

    /// Split a command line on whitespace and expand each token separately,
    /// so substituted values containing spaces stay a single argument
    pub fn parse_command(&self, command: &str) -> Vec<String> {
        command
            .split_whitespace()
            .map(|token| self.parse(token))
            .collect()
    }
}

impl Default for Tpl {
    fn default() -> Self {
        Self::new()
    }
}
