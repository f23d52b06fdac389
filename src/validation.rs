use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field -> message map produced by [`validate`]. Only the first failing rule
/// per field is recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(pub BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// A single declarative constraint on one field of a JSON body.
#[derive(Debug, Clone)]
pub enum Rule {
    Required,
    MaxLen(usize),
    MinLen(usize),
    Email,
    /// Numeric value (integer or float), optionally bounded below.
    Numeric { min: Option<f64> },
    /// Whole number, optionally bounded below.
    Integer { min: Option<i64> },
    Boolean,
}

struct RuleSpec {
    rule: Rule,
    message: Option<&'static str>,
}

/// Declarative rule list for one field. Rules run in the order they were
/// added; the first failure wins and later rules are skipped.
pub struct Field {
    name: &'static str,
    label: &'static str,
    rules: Vec<RuleSpec>,
}

impl Field {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            label: name,
            rules: Vec::new(),
        }
    }

    /// Override the label used in default messages.
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(RuleSpec {
            rule,
            message: None,
        });
        self
    }

    /// Add a rule with a custom failure message.
    pub fn rule_with(mut self, rule: Rule, message: &'static str) -> Self {
        self.rules.push(RuleSpec {
            rule,
            message: Some(message),
        });
        self
    }
}

/// Evaluate a rule list against a JSON object.
///
/// Null values count as absent. A field that is absent and not `Required`
/// passes without running its remaining rules, so partial-update bodies only
/// validate the fields they actually carry.
pub fn validate(body: &Map<String, Value>, fields: &[Field]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    for field in fields {
        let value = body.get(field.name).filter(|v| !v.is_null());

        for spec in &field.rules {
            if let Some(message) = check(value, &spec.rule, field.label) {
                let message = spec
                    .message
                    .map(str::to_string)
                    .unwrap_or(message);
                errors.add(field.name, message);
                break;
            }
            // Absent optional field: nothing further to check.
            if value.is_none() {
                break;
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Returns the default failure message when the rule is violated.
fn check(value: Option<&Value>, rule: &Rule, label: &str) -> Option<String> {
    match rule {
        Rule::Required => {
            let missing = match value {
                None => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            };
            missing.then(|| format!("{} wajib diisi!", label))
        }
        _ => {
            let value = value?;
            match rule {
                Rule::Required => None,
                Rule::MaxLen(limit) => match value.as_str() {
                    Some(s) if s.chars().count() <= *limit => None,
                    Some(_) => Some(format!("{} maksimal {} karakter!", label, limit)),
                    None => Some(format!("{} harus berupa teks!", label)),
                },
                Rule::MinLen(limit) => match value.as_str() {
                    Some(s) if s.chars().count() >= *limit => None,
                    Some(_) => Some(format!("{} minimal {} karakter!", label, limit)),
                    None => Some(format!("{} harus berupa teks!", label)),
                },
                Rule::Email => match value.as_str() {
                    Some(s) if is_valid_email(s) => None,
                    _ => Some(format!("{} harus berupa email yang valid!", label)),
                },
                Rule::Numeric { min } => match as_number(value) {
                    Some(n) => match min {
                        Some(m) if n < *m => Some(format!("{} minimal {}!", label, m)),
                        _ => None,
                    },
                    None => Some(format!("{} harus berupa angka!", label)),
                },
                Rule::Integer { min } => match as_integer(value) {
                    Some(n) => match min {
                        Some(m) if n < *m => Some(format!("{} minimal {}!", label, m)),
                        _ => None,
                    },
                    None => Some(format!("{} harus berupa angka bulat!", label)),
                },
                Rule::Boolean => match as_boolean(value) {
                    Some(_) => None,
                    None => Some(format!("{} harus berupa boolean!", label)),
                },
            }
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && domain.contains('.') && email.len() <= 255
        }
        None => false,
    }
}

/// Numeric coercion: JSON numbers and numeric strings both count, matching
/// the loose typing of form-encoded clients. NaN and infinities are rejected;
/// they would bind as SQL NULL.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|n: &f64| n.is_finite())
}

pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Boolean coercion: `true`/`false`, `0`/`1`, and the strings `"0"`/`"1"`.
pub fn as_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "0" => Some(false),
            "1" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

pub fn as_text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Drop null entries so a null field behaves exactly like an absent one.
/// There is deliberately no way to clear a column back to null through a
/// partial update.
pub fn strip_nulls(body: &Map<String, Value>) -> Map<String, Value> {
    body.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
