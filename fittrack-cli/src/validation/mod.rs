//! Form validation.
//!
//! Forms derive [`validator::Validate`]; a failed run is folded into
//! [`ValidationErrors`], the same structure the API uses for 422 responses.
//! Fields keep the order of the form, and each field reports only its most
//! basic failure (missing before too short before malformed).

mod forms;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub use forms::{GoalForm, LoginForm, RegisterForm, ResetPasswordForm};

/// Field name → messages, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(Vec<(String, Vec<String>)>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a `validator` report into form order. Fields missing from
    /// `order` (nested structs, typos) follow in name order.
    pub fn from_report(report: &validator::ValidationErrors, order: &[&str]) -> Self {
        let failures = report.field_errors();
        let mut errors = Self::new();

        for name in order {
            if let Some(list) = failures.get(*name) {
                errors.add_first(name, list);
            }
        }

        let mut rest: Vec<(String, &Vec<validator::ValidationError>)> = failures
            .iter()
            .map(|(name, list)| (name.to_string(), *list))
            .filter(|(name, _)| !order.contains(&name.as_str()))
            .collect();
        rest.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, list) in rest {
            errors.add_first(&name, list);
        }

        errors
    }

    fn add_first(&mut self, field: &str, list: &[validator::ValidationError]) {
        if let Some(first) = list.iter().min_by_key(|e| severity(&e.code)) {
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field));
            self.add(field, message);
        }
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        match self.0.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message.into()),
            None => self.0.push((field.to_string(), vec![message.into()])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.field(field).is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    /// Every message, field by field
    pub fn messages(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(_, messages)| messages.iter().cloned())
            .collect()
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.0 {
            for message in messages {
                self.add(&field, message);
            }
        }
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Lower reports first
fn severity(code: &str) -> u8 {
    match code {
        "required" => 0,
        "length" | "range" => 1,
        _ => 2,
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(field, messages)| (field, messages)))
    }
}

impl<'de> Deserialize<'de> for ValidationErrors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldMap;

        impl<'de> Visitor<'de> for FieldMap {
            type Value = ValidationErrors;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to messages")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut errors = ValidationErrors::new();
                while let Some((field, messages)) = map.next_entry::<String, Vec<String>>()? {
                    for message in messages {
                        errors.add(&field, message);
                    }
                }
                Ok(errors)
            }
        }

        deserializer.deserialize_map(FieldMap)
    }
}
