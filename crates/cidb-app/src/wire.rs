// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Lenient field decoders for backend rows.
//!
//! The backend renders every cell through a text formatter: all-digit values
//! become JSON numbers, anything else (decimals included) becomes a JSON
//! string, and SQL NULL comes through as the string `"null"`.

use serde::Deserialize;
use serde::de::{self, Deserializer};
use std::fmt;

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

fn is_null_text(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null")
}

fn loose_to_int(value: Loose) -> Result<Option<i64>, String> {
    match value {
        Loose::Int(value) => Ok(Some(value)),
        Loose::Float(value) if value.is_finite() && value.fract() == 0.0 => Ok(Some(value as i64)),
        Loose::Float(value) => Err(format!("expected an integer, got {value}")),
        Loose::Bool(value) => Err(format!("expected an integer, got {value}")),
        Loose::Text(text) if is_null_text(&text) => Ok(None),
        Loose::Text(text) => {
            let trimmed = text.trim();
            if let Ok(value) = trimmed.parse::<i64>() {
                return Ok(Some(value));
            }
            match trimmed.parse::<f64>() {
                Ok(value) if value.is_finite() && value.fract() == 0.0 => Ok(Some(value as i64)),
                _ => Err(format!("expected an integer, got {text:?}")),
            }
        }
    }
}

fn loose_to_float(value: Loose) -> Result<Option<f64>, String> {
    match value {
        Loose::Int(value) => Ok(Some(value as f64)),
        Loose::Float(value) => Ok(Some(value)),
        Loose::Bool(value) => Err(format!("expected a number, got {value}")),
        Loose::Text(text) if is_null_text(&text) => Ok(None),
        Loose::Text(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Some)
            .ok_or_else(|| format!("expected a number, got {text:?}")),
    }
}

fn loose_to_text(value: Loose) -> Option<String> {
    match value {
        Loose::Int(value) => Some(value.to_string()),
        Loose::Float(value) => Some(value.to_string()),
        Loose::Bool(value) => Some(value.to_string()),
        Loose::Text(text) if is_null_text(&text) => None,
        Loose::Text(text) => Some(text),
    }
}

pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Loose>::deserialize(deserializer)?;
    value
        .map(loose_to_int)
        .transpose()
        .map_err(de::Error::custom)?
        .flatten()
        .ok_or_else(|| de::Error::custom("expected an integer, got null"))
}

pub fn optional_int<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
    T::Error: fmt::Display,
{
    let value = Option::<Loose>::deserialize(deserializer)?;
    match value.map(loose_to_int).transpose().map_err(de::Error::custom)? {
        Some(Some(value)) => T::try_from(value).map(Some).map_err(de::Error::custom),
        Some(None) | None => Ok(None),
    }
}

pub fn optional_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(value
        .map(loose_to_float)
        .transpose()
        .map_err(de::Error::custom)?
        .flatten())
}

pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(value.and_then(loose_to_text))
}
