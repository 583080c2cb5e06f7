// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use cidb_app::{
    Brand, Car, CarColumn, CarId, Comment, Lookups, Proxy, RemoteCollection, RowEditor, RowState,
};
use cidb_rest::{Client, Endpoint, RestError};
use cidb_testkit::{
    CannedResponse, MockServer, brand_row, car_row, comment_row, sample_brands, sample_cars,
    sample_comments,
};
use serde_json::{Value, json};
use std::time::Duration;

fn client_for(server: &MockServer) -> Result<Client> {
    let endpoint = Endpoint::new(server.base_url(), "amforeas", "demo1")?;
    Client::new(endpoint, Duration::from_secs(2))
}

#[test]
fn unreachable_backend_explains_what_to_do() -> Result<()> {
    let endpoint = Endpoint::new("http://127.0.0.1:1", "amforeas", "demo1")?;
    let client = Client::new(endpoint, Duration::from_millis(50))?;

    let error = client
        .proxy::<Car>()
        .read_all()
        .expect_err("read should fail for unreachable backend");
    let rest = RestError::find(&error).expect("transport error");
    assert_eq!(rest.kind_label(), "offline");
    assert!(error.to_string().contains("start the amforeas backend"));
    Ok(())
}

#[test]
fn read_all_decodes_backend_rows() -> Result<()> {
    let cars = sample_cars();
    let server = MockServer::start(vec![CannedResponse::rows(
        cars.iter().map(car_row).collect(),
    )])?;
    let client = client_for(&server)?;

    let loaded = client.proxy::<Car>().read_all()?;
    assert_eq!(loaded, cars);

    let requests = server.finish()?;
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].url, "/amforeas/demo1/car");
    Ok(())
}

#[test]
fn primary_key_header_only_for_non_default_keys() -> Result<()> {
    let server = MockServer::start(vec![
        CannedResponse::rows(sample_cars().iter().map(car_row).collect()),
        CannedResponse::rows(sample_brands().iter().map(brand_row).collect()),
    ])?;
    let client = client_for(&server)?;

    client.proxy::<Car>().read_all()?;
    let brands: Vec<Brand> = client.proxy::<Brand>().read_all()?;
    assert_eq!(brands.len(), 3);

    let requests = server.finish()?;
    assert_eq!(requests[0].header("Primary-Key"), Some("cid"));
    assert_eq!(requests[1].url, "/amforeas/demo1/maker");
    assert_eq!(requests[1].header("Primary-Key"), None);
    for request in &requests {
        assert_eq!(request.header("Accept"), Some("application/json"));
    }
    Ok(())
}

#[test]
fn create_sends_body_without_key_and_returns_echoed_row() -> Result<()> {
    let mut created = sample_cars()[0].clone();
    created.cid = Some(CarId::new(17));
    let server = MockServer::start(vec![CannedResponse::created(car_row(&created))])?;
    let client = client_for(&server)?;

    let mut draft = sample_cars()[0].clone();
    draft.cid = None;
    let echoed = client.proxy::<Car>().create(&draft)?;
    assert_eq!(echoed.and_then(|car| car.cid), Some(CarId::new(17)));

    let requests = server.finish()?;
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].url, "/amforeas/demo1/car");
    assert!(
        requests[0]
            .header("Content-Type")
            .is_some_and(|value| value.starts_with("application/json"))
    );
    let body = requests[0].json_body()?;
    assert!(body.get("cid").is_none());
    assert_eq!(body["maker"], "CITROEN");
    assert_eq!(body["year"], 2008);
    Ok(())
}

#[test]
fn create_with_empty_body_yields_no_row() -> Result<()> {
    let server = MockServer::start(vec![CannedResponse::empty(201)])?;
    let client = client_for(&server)?;
    let echoed = client.proxy::<Car>().create(&Car::phantom())?;
    assert_eq!(echoed, None);
    server.finish()?;
    Ok(())
}

#[test]
fn create_with_empty_row_leaves_record_clean_without_key() -> Result<()> {
    let server = MockServer::start(vec![CannedResponse::created(json!({}))])?;
    let client = client_for(&server)?;
    let proxy = client.proxy::<Car>();

    let mut draft = Car::phantom();
    draft.maker = "FIAT".to_owned();
    draft.model = "Panda".to_owned();
    let mut collection = RemoteCollection::<Car>::new();
    collection.insert(0, draft);

    let report = collection.sync(&proxy)?;
    assert_eq!(report.created, 1);
    assert_eq!(collection.row_state(0), Some(RowState::Clean));
    let stored = collection.get(0).expect("created row");
    assert_eq!(stored.cid, None);
    assert_eq!(stored.model, "Panda");
    server.finish()?;
    Ok(())
}

#[test]
fn cleared_fuel_is_sent_as_null() -> Result<()> {
    let cars = sample_cars();
    let server = MockServer::start(vec![
        CannedResponse::rows(cars.iter().map(car_row).collect()),
        CannedResponse::empty(200),
    ])?;
    let client = client_for(&server)?;
    let proxy = client.proxy::<Car>();
    let lookups = Lookups::with_brands(sample_brands());

    let mut collection = RemoteCollection::<Car>::new();
    collection.load(&proxy)?;
    assert_eq!(collection.get(0).and_then(|car| car.fuel.as_deref()), Some("Gasoline"));

    let mut editor = RowEditor::start(0, &cars[0], CarColumn::Fuel);
    editor.clear_cell();
    let edited = editor.commit(&lookups)?;
    collection.update(0, edited)?;
    collection.sync(&proxy)?;

    let requests = server.finish()?;
    assert_eq!(requests[1].method, "PUT");
    let body = requests[1].json_body()?;
    assert_eq!(body.get("fuel"), Some(&Value::Null));
    assert_eq!(body["transmission"], "Manual");
    Ok(())
}

#[test]
fn find_uses_column_route_and_treats_404_as_empty() -> Result<()> {
    let comments = sample_comments();
    let server = MockServer::start(vec![
        CannedResponse::rows(vec![comment_row(&comments[0]), comment_row(&comments[1])]),
        CannedResponse::rejected(404, "no rows"),
    ])?;
    let client = client_for(&server)?;
    let proxy = client.proxy::<Comment>();

    let found = proxy.find_by("car_id", "0")?;
    assert_eq!(found.len(), 2);
    assert!(proxy.find_by("car_id", "9")?.is_empty());

    let requests = server.finish()?;
    assert_eq!(requests[0].url, "/amforeas/demo1/comments/car_id/0");
    assert_eq!(requests[1].url, "/amforeas/demo1/comments/car_id/9");
    Ok(())
}

#[test]
fn failed_envelope_surfaces_backend_message() -> Result<()> {
    let server = MockServer::start(vec![
        CannedResponse::rejected(200, "Integrity constraint violation"),
        CannedResponse::rejected(500, "Table CAR not found"),
    ])?;
    let client = client_for(&server)?;
    let proxy = client.proxy::<Car>();

    let error = proxy
        .destroy(CarId::new(0))
        .expect_err("rejected delete");
    let rest = RestError::find(&error).expect("transport error");
    assert_eq!(rest.kind_label(), "rejected");
    assert!(error.to_string().contains("Integrity constraint violation [SQLState 42S02]"));

    let error = proxy.read_all().expect_err("server failure");
    assert_eq!(
        error.to_string(),
        "server error (500): Table CAR not found [SQLState 42S02]"
    );

    let requests = server.finish()?;
    assert_eq!(requests[0].method, "DELETE");
    assert_eq!(requests[0].url, "/amforeas/demo1/car/0");
    Ok(())
}

#[test]
fn malformed_rows_are_decode_errors() -> Result<()> {
    let server = MockServer::start(vec![CannedResponse::raw(
        200,
        r#"{"success":true,"cells":[{"cid":"abc"}]}"#,
    )])?;
    let client = client_for(&server)?;
    let error = client
        .proxy::<Car>()
        .read_all()
        .expect_err("bad key should fail");
    assert_eq!(
        RestError::find(&error).map(RestError::kind_label),
        Some("bad response")
    );
    server.finish()?;
    Ok(())
}

#[test]
fn collection_sync_runs_deletes_updates_then_creates() -> Result<()> {
    let cars = sample_cars();
    let mut created = Car::phantom();
    created.maker = "FIAT".to_owned();
    created.model = "Panda".to_owned();
    let mut echoed = created.clone();
    echoed.cid = Some(CarId::new(3));

    let server = MockServer::start(vec![
        CannedResponse::rows(cars.iter().map(car_row).collect()),
        CannedResponse::empty(200),
        CannedResponse::empty(200),
        CannedResponse::created(car_row(&echoed)),
    ])?;
    let client = client_for(&server)?;
    let proxy = client.proxy::<Car>();

    let mut collection = RemoteCollection::<Car>::new();
    collection.load(&proxy)?;
    assert_eq!(collection.len(), 3);

    collection.insert(0, created);
    let mut edited = cars[0].clone();
    edited.model = "C3".to_owned();
    collection.update(1, edited)?;
    collection.remove_at(3).expect("remove BMW");

    let report = collection.sync(&proxy)?;
    assert_eq!(report.total(), 3);
    assert!(!collection.is_dirty());
    assert_eq!(
        collection.get(0).and_then(|car| car.cid),
        Some(CarId::new(3))
    );

    let requests = server.finish()?;
    let calls = requests
        .iter()
        .map(|request| format!("{} {}", request.method, request.url))
        .collect::<Vec<_>>();
    assert_eq!(
        calls,
        vec![
            "GET /amforeas/demo1/car",
            "DELETE /amforeas/demo1/car/2",
            "PUT /amforeas/demo1/car/0",
            "POST /amforeas/demo1/car",
        ]
    );
    assert_eq!(requests[2].json_body()?["model"], "C3");
    Ok(())
}
