// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use cidb_app::{Brand, BrandId, Car, CarId, Comment, CommentId, Picture, PictureId};
use serde_json::{Value, json};
use std::io::Read;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Response, Server};

const REQUEST_WAIT: Duration = Duration::from_secs(5);

/// One request as the mock server saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json_body(&self) -> Result<Value> {
        serde_json::from_str(&self.body).context("decode recorded request body")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
    pub content_count: Option<usize>,
}

impl CannedResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            content_count: None,
        }
    }

    /// `{"success":true,"cells":[...]}` with a matching `Content-Count`.
    pub fn rows(rows: Vec<Value>) -> Self {
        let count = rows.len();
        Self {
            status: 200,
            body: success_envelope(rows).to_string(),
            content_count: Some(count),
        }
    }

    pub fn created(row: Value) -> Self {
        Self {
            status: 201,
            ..Self::rows(vec![row])
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            content_count: None,
        }
    }

    pub fn rejected(status: u16, message: &str) -> Self {
        Self::json(status, &error_envelope(message))
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_owned(),
            content_count: None,
        }
    }
}

/// tiny_http backend that answers a fixed script of responses in order and
/// records every request it served.
pub struct MockServer {
    base_url: String,
    handle: JoinHandle<Result<Vec<RecordedRequest>>>,
}

impl MockServer {
    pub fn start(script: Vec<CannedResponse>) -> Result<Self> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let base_url = format!("http://{}", server.server_addr());
        let handle = thread::spawn(move || serve_script(&server, script));
        Ok(Self { base_url, handle })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Waits for the script to run out and returns what was received.
    pub fn finish(self) -> Result<Vec<RecordedRequest>> {
        self.handle
            .join()
            .map_err(|_| anyhow!("mock server thread panicked"))?
    }
}

fn serve_script(server: &Server, script: Vec<CannedResponse>) -> Result<Vec<RecordedRequest>> {
    let mut recorded = Vec::with_capacity(script.len());
    for canned in script {
        let mut request = server
            .recv_timeout(REQUEST_WAIT)
            .context("receive request")?
            .ok_or_else(|| {
                anyhow!(
                    "mock server waited {REQUEST_WAIT:?} for request {}",
                    recorded.len() + 1
                )
            })?;

        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .context("read request body")?;
        recorded.push(RecordedRequest {
            method: request.method().to_string(),
            url: request.url().to_owned(),
            headers: request
                .headers()
                .iter()
                .map(|header| {
                    (
                        header.field.as_str().as_str().to_owned(),
                        header.value.as_str().to_owned(),
                    )
                })
                .collect(),
            body,
        });

        let mut response = Response::from_string(canned.body)
            .with_status_code(canned.status)
            .with_header(header("Content-Type", "application/json")?);
        if let Some(count) = canned.content_count {
            response = response.with_header(header("Content-Count", &count.to_string())?);
        }
        request.respond(response).context("send mock response")?;
    }
    Ok(recorded)
}

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("invalid header {name}: {value}"))
}

pub fn success_envelope(rows: Vec<Value>) -> Value {
    json!({ "success": true, "cells": rows })
}

pub fn error_envelope(message: &str) -> Value {
    json!({
        "success": false,
        "message": message,
        "SQLState": "42S02",
        "SQLCode": "-5501",
    })
}

/// A car row shaped like the backend renders it: whole numbers as JSON
/// numbers, decimals as strings, NULL as `"null"`.
pub fn car_row(car: &Car) -> Value {
    let text = |value: Option<&str>| value.map_or_else(|| "null".to_owned(), str::to_owned);
    let amount = |value: Option<f64>| value.map_or_else(|| "null".to_owned(), |v| format!("{v:.2}"));
    json!({
        "cid": car.cid.map(CarId::get),
        "maker": car.maker,
        "model": car.model,
        "year": car.year,
        "fuel": text(car.fuel.as_deref()),
        "transmission": text(car.transmission.as_deref()),
        "created": "2011-05-01 10:00:00.0",
        "currentmarketvalue": amount(car.currentmarketvalue),
        "newvalue": amount(car.newvalue),
    })
}

pub fn comment_row(comment: &Comment) -> Value {
    json!({
        "id": comment.id.map(CommentId::get),
        "car_id": comment.car_id.map(CarId::get),
        "car_comment": comment.comment,
    })
}

pub fn picture_row(picture: &Picture) -> Value {
    json!({
        "id": picture.id.map(PictureId::get),
        "car_id": picture.car_id.map(CarId::get),
        "picture": picture.picture,
    })
}

pub fn brand_row(brand: &Brand) -> Value {
    json!({
        "id": brand.id.map(BrandId::get),
        "name": brand.name,
        "realname": brand.realname,
    })
}

pub fn car(
    cid: i64,
    maker: &str,
    model: &str,
    year: i32,
    fuel: Option<&str>,
    transmission: &str,
    values: (f64, f64),
) -> Car {
    Car {
        cid: Some(CarId::new(cid)),
        maker: maker.to_owned(),
        model: model.to_owned(),
        year: Some(year),
        fuel: fuel.map(str::to_owned),
        transmission: Some(transmission.to_owned()),
        currentmarketvalue: Some(values.0),
        newvalue: Some(values.1),
    }
}

pub fn sample_cars() -> Vec<Car> {
    vec![
        car(
            0,
            "CITROEN",
            "C2",
            2008,
            Some("Gasoline"),
            "Manual",
            (9_000.0, 13_000.0),
        ),
        car(1, "FIAT", "500", 2010, None, "Manual", (19_000.0, 23.0)),
        car(
            2,
            "BMW",
            "X5",
            2011,
            Some("Diesel"),
            "Automatic",
            (59_000.0, 77_000.0),
        ),
    ]
}

pub fn sample_brands() -> Vec<Brand> {
    [("BMW", "BMW"), ("CITROEN", "Citroën"), ("FIAT", "Fiat")]
        .iter()
        .enumerate()
        .map(|(index, (name, realname))| Brand {
            id: Some(BrandId::new(index as i64)),
            name: (*name).to_owned(),
            realname: (*realname).to_owned(),
        })
        .collect()
}

pub fn comment(id: i64, car: i64, text: &str) -> Comment {
    Comment {
        id: Some(CommentId::new(id)),
        car_id: Some(CarId::new(car)),
        comment: text.to_owned(),
    }
}

pub fn sample_comments() -> Vec<Comment> {
    vec![
        comment(0, 0, "The Citroen C2 is a small car with a great attitude"),
        comment(1, 0, "I Love my C2"),
        comment(2, 2, "BMW's X5 costs too much for what it's worth."),
    ]
}

pub fn picture(id: i64, car: i64, url: &str) -> Picture {
    Picture {
        id: Some(PictureId::new(id)),
        car_id: Some(CarId::new(car)),
        picture: url.to_owned(),
    }
}

pub fn sample_pictures() -> Vec<Picture> {
    vec![
        picture(0, 0, "http://pictures.test/c2/1.jpg"),
        picture(1, 0, "http://pictures.test/c2/2.jpg"),
        picture(2, 1, "http://pictures.test/500/1.jpg"),
        picture(3, 2, "http://pictures.test/x5/1.jpg"),
    ]
}
