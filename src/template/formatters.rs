use crate::ast::Value;
use ahash::AHashMap;
use itertools::Itertools;

/// Defines the contract for a named formatter usable in `{path:formatter}` tokens.
pub trait TextFormatter: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, value: Value) -> Value;
}

/// Applies a text transform to strings, element-wise to lists, leaving other values alone.
fn map_text(value: Value, f: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(&s)),
        Value::List(items) => Value::List(items.into_iter().map(|v| map_text(v, f)).collect()),
        other => other,
    }
}

fn upper(value: Value) -> Value {
    map_text(value, &|s| s.to_uppercase())
}

fn lower(value: Value) -> Value {
    map_text(value, &|s| s.to_lowercase())
}

fn capitalize(value: Value) -> Value {
    map_text(value, &|s| {
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    })
}

fn trim(value: Value) -> Value {
    map_text(value, &|s| s.trim().to_string())
}

fn join(value: Value) -> Value {
    match value {
        Value::List(items) => Value::String(items.iter().join(", ")),
        other => other,
    }
}

fn length(value: Value) -> Value {
    match value {
        Value::List(items) => Value::Number(items.len() as f64),
        Value::String(s) => Value::Number(s.chars().count() as f64),
        Value::Null => Value::Number(0.0),
        other => other,
    }
}

fn round(value: Value) -> Value {
    match value.as_number() {
        Some(n) => Value::Number(n.round()),
        None => value,
    }
}

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Maps a weekday index (0 = Sunday) or an abbreviation to its full name.
fn weekday_name(value: &Value) -> Option<&'static str> {
    if let Some(n) = value.as_number() {
        if n.fract() == 0.0 && (0.0..7.0).contains(&n) {
            return Some(WEEKDAYS[n as usize]);
        }
        return None;
    }
    let text = value.as_str()?.trim().to_lowercase();
    if text.len() < 2 {
        return None;
    }
    WEEKDAYS
        .iter()
        .find(|day| day.to_lowercase().starts_with(&text))
        .copied()
}

fn active_days(value: Value) -> Value {
    match value {
        Value::List(items) => Value::List(
            items
                .into_iter()
                .map(|item| match weekday_name(&item) {
                    Some(name) => Value::String(name.to_string()),
                    None => item,
                })
                .collect(),
        ),
        single => match weekday_name(&single) {
            Some(name) => Value::String(name.to_string()),
            None => single,
        },
    }
}

/// Master macro to define the built-in formatters, their registration, and their creation.
macro_rules! define_formatters {
    ( $( ($struct_name:ident, $name:expr, $func:path) ),* $(,)? ) => {
        $(
            struct $struct_name;
            impl TextFormatter for $struct_name {
                fn name(&self) -> &str { $name }
                fn apply(&self, value: Value) -> Value { $func(value) }
            }
        )*

        pub(super) fn register_default_formatters(
            registry: &mut AHashMap<String, Box<dyn TextFormatter>>,
        ) {
            $( registry.insert($name.to_string(), Box::new($struct_name)); )*
        }

        pub(super) fn create_formatter_by_name(name: &str) -> Option<Box<dyn TextFormatter>> {
            match name {
                $( $name => Some(Box::new($struct_name)), )*
                _ => None,
            }
        }
    };
}

define_formatters! {
    (UpperFormatter, "upper", upper),
    (LowerFormatter, "lower", lower),
    (CapitalizeFormatter, "capitalize", capitalize),
    (TrimFormatter, "trim", trim),
    (JoinFormatter, "join", join),
    (LengthFormatter, "length", length),
    (RoundFormatter, "round", round),
    (ActiveDaysFormatter, "activeDays", active_days),
}
