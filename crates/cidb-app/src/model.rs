// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::*;
use crate::wire;

/// A row type served by one backend table.
///
/// The key is assigned by the server: a record without one is phantom. Keys
/// are never part of the serialized body, so create and update payloads only
/// carry the editable columns.
pub trait Record: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned {
    type Key: Copy + Eq + fmt::Debug + fmt::Display;

    const TABLE: &'static str;
    const PRIMARY_KEY: &'static str;

    fn key(&self) -> Option<Self::Key>;
    fn set_key(&mut self, key: Self::Key);
    fn clear_key(&mut self);

    fn is_phantom(&self) -> bool {
        self.key().is_none()
    }
}

/// Records that hang off a car through a `car_id` foreign key.
pub trait BelongsToCar {
    fn car_id(&self) -> Option<CarId>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuelType {
    Gasoline,
    Diesel,
    Hybrid,
    Electric,
    Hydrogen,
}

impl FuelType {
    pub const ALL: [Self; 5] = [
        Self::Gasoline,
        Self::Diesel,
        Self::Hybrid,
        Self::Electric,
        Self::Hydrogen,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gasoline => "Gasoline",
            Self::Diesel => "Diesel",
            Self::Hybrid => "Hybrid",
            Self::Electric => "Electric",
            Self::Hydrogen => "Hydrogen",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmissionType {
    Automatic,
    Manual,
    SemiAutomatic,
}

impl TransmissionType {
    pub const ALL: [Self; 3] = [Self::Automatic, Self::Manual, Self::SemiAutomatic];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Automatic => "Automatic",
            Self::Manual => "Manual",
            Self::SemiAutomatic => "Semi-Automatic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    #[serde(default, skip_serializing, deserialize_with = "wire::optional_int")]
    pub cid: Option<CarId>,
    #[serde(default, deserialize_with = "wire::text")]
    pub maker: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub model: String,
    #[serde(default, deserialize_with = "wire::optional_int")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub fuel: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub transmission: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_float")]
    pub currentmarketvalue: Option<f64>,
    #[serde(default, deserialize_with = "wire::optional_float")]
    pub newvalue: Option<f64>,
}

impl Car {
    pub const DEFAULT_YEAR: i32 = 2011;

    /// A blank car as created by the grid's Add action.
    pub fn phantom() -> Self {
        Self {
            cid: None,
            maker: String::new(),
            model: String::new(),
            year: Some(Self::DEFAULT_YEAR),
            fuel: None,
            transmission: None,
            currentmarketvalue: None,
            newvalue: None,
        }
    }
}

impl Record for Car {
    type Key = CarId;

    const TABLE: &'static str = "car";
    const PRIMARY_KEY: &'static str = "cid";

    fn key(&self) -> Option<CarId> {
        self.cid
    }

    fn set_key(&mut self, key: CarId) {
        self.cid = Some(key);
    }

    fn clear_key(&mut self) {
        self.cid = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, skip_serializing, deserialize_with = "wire::optional_int")]
    pub id: Option<CommentId>,
    #[serde(default, deserialize_with = "wire::optional_int")]
    pub car_id: Option<CarId>,
    #[serde(rename = "car_comment", alias = "comment", default, deserialize_with = "wire::text")]
    pub comment: String,
}

impl Record for Comment {
    type Key = CommentId;

    const TABLE: &'static str = "comments";
    const PRIMARY_KEY: &'static str = "id";

    fn key(&self) -> Option<CommentId> {
        self.id
    }

    fn set_key(&mut self, key: CommentId) {
        self.id = Some(key);
    }

    fn clear_key(&mut self) {
        self.id = None;
    }
}

impl BelongsToCar for Comment {
    fn car_id(&self) -> Option<CarId> {
        self.car_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    #[serde(default, skip_serializing, deserialize_with = "wire::optional_int")]
    pub id: Option<PictureId>,
    #[serde(default, deserialize_with = "wire::optional_int")]
    pub car_id: Option<CarId>,
    #[serde(default, deserialize_with = "wire::text")]
    pub picture: String,
}

impl Record for Picture {
    type Key = PictureId;

    const TABLE: &'static str = "pictures";
    const PRIMARY_KEY: &'static str = "id";

    fn key(&self) -> Option<PictureId> {
        self.id
    }

    fn set_key(&mut self, key: PictureId) {
        self.id = Some(key);
    }

    fn clear_key(&mut self) {
        self.id = None;
    }
}

impl BelongsToCar for Picture {
    fn car_id(&self) -> Option<CarId> {
        self.car_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(default, skip_serializing, deserialize_with = "wire::optional_int")]
    pub id: Option<BrandId>,
    #[serde(default, deserialize_with = "wire::text")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub realname: String,
}

impl Record for Brand {
    type Key = BrandId;

    const TABLE: &'static str = "maker";
    const PRIMARY_KEY: &'static str = "id";

    fn key(&self) -> Option<BrandId> {
        self.id
    }

    fn set_key(&mut self, key: BrandId) {
        self.id = Some(key);
    }

    fn clear_key(&mut self) {
        self.id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{Car, CarId, Comment, Record};

    #[test]
    fn car_decodes_backend_row_shapes() {
        let car: Car = serde_json::from_str(
            r#"{"cid":1,"maker":"FIAT","model":"500","year":2010,"fuel":"null","transmission":"Manual","created":"null","currentmarketvalue":"19000.00","newvalue":"23.00"}"#,
        )
        .expect("decode car row");
        assert_eq!(car.cid, Some(CarId::new(1)));
        assert_eq!(car.fuel, None);
        assert_eq!(car.transmission.as_deref(), Some("Manual"));
        assert_eq!(car.currentmarketvalue, Some(19_000.0));
        assert_eq!(car.newvalue, Some(23.0));
    }

    #[test]
    fn car_body_never_carries_the_key() {
        let mut car = Car::phantom();
        car.model = "C2".to_owned();
        car.set_key(CarId::new(9));

        let body = serde_json::to_value(&car).expect("encode car");
        assert!(body.get("cid").is_none());
        assert_eq!(body["model"], "C2");
        assert_eq!(body["year"], 2011);
    }

    #[test]
    fn cleared_optional_columns_are_sent_as_null() {
        let mut car = Car::phantom();
        car.year = None;
        let body = serde_json::to_value(&car).expect("encode car");
        for column in ["year", "fuel", "transmission", "currentmarketvalue", "newvalue"] {
            assert_eq!(body.get(column), Some(&serde_json::Value::Null), "{column}");
        }
    }

    #[test]
    fn phantom_car_has_no_key() {
        let car = Car::phantom();
        assert!(car.is_phantom());
        assert_eq!(car.year, Some(Car::DEFAULT_YEAR));
    }

    #[test]
    fn comment_reads_either_column_name_and_writes_backend_column() {
        let legacy: Comment =
            serde_json::from_str(r#"{"id":0,"car_id":2,"car_comment":"Too pricey"}"#)
                .expect("decode car_comment row");
        let renamed: Comment = serde_json::from_str(r#"{"id":1,"car_id":"2","comment":"Nice"}"#)
            .expect("decode comment row");
        assert_eq!(legacy.comment, "Too pricey");
        assert_eq!(renamed.car_id, Some(CarId::new(2)));

        let body = serde_json::to_value(&renamed).expect("encode comment");
        assert_eq!(body["car_comment"], "Nice");
        assert!(body.get("id").is_none());
    }
}
