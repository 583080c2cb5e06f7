// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};

use crate::lookups::{LookupCollection, Lookups};
use crate::model::Car;

pub const YEAR_MIN: i32 = 2008;
pub const YEAR_MAX: i32 = 2011;
pub const AMOUNT_MIN: f64 = 0.0;
pub const AMOUNT_STEP: f64 = 5_000.0;

/// Editable car columns after parsing, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CarFormInput {
    pub maker: String,
    pub model: String,
    pub year: Option<i32>,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub currentmarketvalue: Option<f64>,
    pub newvalue: Option<f64>,
}

impl CarFormInput {
    pub fn from_car(car: &Car) -> Self {
        Self {
            maker: car.maker.clone(),
            model: car.model.clone(),
            year: car.year,
            fuel: car.fuel.clone(),
            transmission: car.transmission.clone(),
            currentmarketvalue: car.currentmarketvalue,
            newvalue: car.newvalue,
        }
    }

    pub fn validate(&self, lookups: &Lookups) -> Result<()> {
        if self.model.trim().is_empty() {
            bail!("car model is required -- enter a model and retry");
        }
        validate_choice("maker", Some(self.maker.as_str()), lookups.maker(), true)?;
        let Some(year) = self.year else {
            bail!("car year is required -- enter a year between {YEAR_MIN} and {YEAR_MAX}");
        };
        if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
            bail!("car year must be between {YEAR_MIN} and {YEAR_MAX}, got {year}");
        }
        validate_choice("fuel", self.fuel.as_deref(), &lookups.fuel, false)?;
        validate_choice(
            "transmission",
            self.transmission.as_deref(),
            &lookups.transmission,
            false,
        )?;
        validate_amount("CRP", self.currentmarketvalue)?;
        validate_amount("PSP", self.newvalue)?;
        Ok(())
    }

    /// Writes the form onto `base`, keeping its key.
    pub fn apply_to(&self, base: &Car) -> Car {
        Car {
            cid: base.cid,
            maker: self.maker.trim().to_owned(),
            model: self.model.trim().to_owned(),
            year: self.year,
            fuel: self.fuel.clone(),
            transmission: self.transmission.clone(),
            currentmarketvalue: self.currentmarketvalue,
            newvalue: self.newvalue,
        }
    }
}

/// Select values are only checked against a lookup that has options; with no
/// options loaded the value is left for the server to judge.
fn validate_choice(
    label: &str,
    value: Option<&str>,
    lookup: &LookupCollection,
    required: bool,
) -> Result<()> {
    if lookup.is_empty() {
        return Ok(());
    }
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        None if required => bail!("car {label} is required -- choose a {label} and retry"),
        None => Ok(()),
        Some(value) if lookup.contains(value) => Ok(()),
        Some(value) => bail!("car {label} {value:?} is not in the {label} list -- pick one of the listed values"),
    }
}

fn validate_amount(label: &str, value: Option<f64>) -> Result<()> {
    let Some(value) = value else {
        bail!("car {label} is required -- enter an amount and retry");
    };
    if !value.is_finite() {
        bail!("car {label} must be a number");
    }
    if value < AMOUNT_MIN {
        bail!("car {label} cannot be negative");
    }
    Ok(())
}

pub fn parse_optional_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

pub fn parse_year(input: &str) -> Result<Option<i32>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i32>()
        .map(Some)
        .map_err(|_| anyhow!("year must be a whole number, got {trimmed:?}"))
}

/// Accepts plain amounts with an optional euro sign. `.` is the only decimal
/// separator and there is no grouping separator.
pub fn parse_amount(label: &str, input: &str) -> Result<Option<f64>> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('€')
        .trim_end_matches('€')
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    let value = cleaned
        .parse::<f64>()
        .map_err(|_| anyhow!("{label} must be a number, got {:?}", input.trim()))?;
    if !value.is_finite() {
        bail!("{label} must be a number, got {:?}", input.trim());
    }
    Ok(Some(value))
}

pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
