// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use cidb_app::{
    Brand, Car, CarId, Comment, Lookups, Picture, Proxy, RemoteCollection, SyncReport,
    fetch_related,
};
use cidb_rest::{Client, DemoBackend, RestError};
use cidb_tui::{AppRuntime, RelatedRecords};
use tracing::{info, warn};

/// One proxy per table plus the options that shape how the UI talks to them.
pub struct Session {
    cars: Box<dyn Proxy<Car>>,
    brands: Box<dyn Proxy<Brand>>,
    comments: Box<dyn Proxy<Comment>>,
    pictures: Box<dyn Proxy<Picture>>,
    server_filter: bool,
    confirm_save: bool,
}

impl Session {
    pub fn remote(client: &Client, server_filter: bool, confirm_save: bool) -> Self {
        Self {
            cars: Box::new(client.proxy::<Car>()),
            brands: Box::new(client.proxy::<Brand>()),
            comments: Box::new(client.proxy::<Comment>()),
            pictures: Box::new(client.proxy::<Picture>()),
            server_filter,
            confirm_save,
        }
    }

    pub fn demo(backend: DemoBackend, confirm_save: bool) -> Self {
        Self {
            cars: Box::new(backend.cars),
            brands: Box::new(backend.brands),
            comments: Box::new(backend.comments),
            pictures: Box::new(backend.pictures),
            server_filter: true,
            confirm_save,
        }
    }

    pub fn check(&self) -> Result<usize> {
        let mut cars = RemoteCollection::<Car>::new();
        cars.load(self.cars.as_ref()).inspect_err(log_failure)?;
        Ok(cars.len())
    }
}

fn log_failure(error: &anyhow::Error) {
    let kind = RestError::find(error).map_or("local", RestError::kind_label);
    warn!(kind, error = %format!("{error:#}"), "backend call failed");
}

impl AppRuntime for Session {
    fn load_brands(&mut self, lookups: &mut Lookups) -> Result<()> {
        lookups
            .load_brands(self.brands.as_ref())
            .inspect_err(log_failure)
    }

    fn load_cars(&mut self, cars: &mut RemoteCollection<Car>) -> Result<()> {
        cars.load(self.cars.as_ref()).inspect_err(log_failure)
    }

    fn save_cars(&mut self, cars: &mut RemoteCollection<Car>) -> Result<SyncReport> {
        let report = cars.sync(self.cars.as_ref()).inspect_err(log_failure)?;
        info!(
            created = report.created,
            updated = report.updated,
            destroyed = report.destroyed,
            "cars saved"
        );
        Ok(report)
    }

    fn load_related(&mut self, car: CarId) -> Result<RelatedRecords> {
        let comments = fetch_related(self.comments.as_ref(), car, self.server_filter)
            .inspect_err(log_failure)?;
        let pictures = fetch_related(self.pictures.as_ref(), car, self.server_filter)
            .inspect_err(log_failure)?;
        Ok(RelatedRecords { comments, pictures })
    }

    fn confirm_before_save(&self) -> bool {
        self.confirm_save
    }
}
