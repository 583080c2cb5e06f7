// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use tracing::debug;

use crate::collection::{Proxy, RemoteCollection};
use crate::forms::CarFormInput;
use crate::ids::CarId;
use crate::lookups::Lookups;
use crate::model::{BelongsToCar, Car, Comment, Picture, Record};

pub const PICTURE_PLACEHOLDER: &str = "loading…";

/// Keeps the records whose `car_id` matches `car`, in fetch order.
pub fn filter_by_car<R>(records: impl IntoIterator<Item = R>, car: CarId) -> Vec<R>
where
    R: BelongsToCar,
{
    records
        .into_iter()
        .filter(|record| record.car_id() == Some(car))
        .collect()
}

pub fn first_picture(pictures: &[Picture], car: CarId) -> Option<&Picture> {
    pictures.iter().find(|picture| picture.car_id == Some(car))
}

/// Fetches the rows related to `car`. With `server_filter` the backend's
/// column finder narrows the rows; the local filter runs either way.
pub fn fetch_related<R, P>(proxy: &P, car: CarId, server_filter: bool) -> Result<Vec<R>>
where
    R: Record + BelongsToCar,
    P: Proxy<R> + ?Sized,
{
    let rows = if server_filter {
        proxy.find_by("car_id", &car.to_string())
    } else {
        proxy.read_all()
    }
    .with_context(|| format!("load {} for car {car}", R::TABLE))?;
    let fetched = rows.len();
    let related = filter_by_car(rows, car);
    debug!(
        table = R::TABLE,
        %car,
        fetched,
        kept = related.len(),
        "related rows filtered"
    );
    Ok(related)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PictureView {
    Loading,
    Url(String),
}

impl PictureView {
    pub fn for_car(pictures: &[Picture], car: CarId) -> Self {
        match first_picture(pictures, car) {
            Some(picture) if !picture.picture.trim().is_empty() => {
                Self::Url(picture.picture.clone())
            }
            _ => Self::Loading,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Loading => PICTURE_PLACEHOLDER,
            Self::Url(url) => url,
        }
    }
}

/// State behind the details window for one car.
///
/// Comment deletes stay local to the window and are dropped with it.
#[derive(Debug, Clone, PartialEq)]
pub struct CarDetails {
    row: usize,
    car: Car,
    comments: RemoteCollection<Comment>,
    selected_comment: Option<usize>,
    picture: PictureView,
    maker: String,
}

impl CarDetails {
    pub fn open(row: usize, car: &Car) -> Self {
        Self {
            row,
            car: car.clone(),
            comments: RemoteCollection::new(),
            selected_comment: None,
            picture: PictureView::Loading,
            maker: car.maker.clone(),
        }
    }

    pub const fn row(&self) -> usize {
        self.row
    }

    pub fn car(&self) -> &Car {
        &self.car
    }

    /// A phantom car has nothing on the server to look up.
    pub fn car_id(&self) -> Option<CarId> {
        self.car.cid
    }

    pub fn apply_related(&mut self, comments: Vec<Comment>, pictures: &[Picture]) {
        let Some(car) = self.car_id() else {
            return;
        };
        self.comments = RemoteCollection::from_records(filter_by_car(comments, car));
        self.selected_comment = if self.comments.is_empty() {
            None
        } else {
            Some(0)
        };
        self.picture = PictureView::for_car(pictures, car);
    }

    pub fn comments(&self) -> &RemoteCollection<Comment> {
        &self.comments
    }

    pub fn selected_comment(&self) -> Option<usize> {
        self.selected_comment
    }

    pub fn move_comment(&mut self, delta: isize) {
        if self.comments.is_empty() {
            self.selected_comment = None;
            return;
        }
        let last = self.comments.len() as isize - 1;
        let current = self.selected_comment.unwrap_or(0) as isize;
        self.selected_comment = Some((current + delta).clamp(0, last) as usize);
    }

    pub fn delete_selected_comment(&mut self) -> Option<Comment> {
        let index = self.selected_comment?;
        let removed = self.comments.remove_at(index)?;
        self.selected_comment = if self.comments.is_empty() {
            None
        } else {
            Some(index.min(self.comments.len() - 1))
        };
        Some(removed)
    }

    pub fn picture(&self) -> &PictureView {
        &self.picture
    }

    pub fn maker(&self) -> &str {
        &self.maker
    }

    pub fn cycle_maker(&mut self, delta: isize, lookups: &Lookups) -> bool {
        let Some(next) = lookups.maker().cycle(&self.maker, delta) else {
            return false;
        };
        self.maker = next.to_owned();
        true
    }

    pub fn maker_changed(&self) -> bool {
        self.maker != self.car.maker
    }

    /// Car with the edited maker, validated like a grid row. `None` when the
    /// maker was left alone.
    pub fn apply_maker(&mut self, lookups: &Lookups) -> Result<Option<Car>> {
        if !self.maker_changed() {
            return Ok(None);
        }
        let input = CarFormInput {
            maker: self.maker.clone(),
            ..CarFormInput::from_car(&self.car)
        };
        input.validate(lookups)?;
        let car = input.apply_to(&self.car);
        self.car = car.clone();
        Ok(Some(car))
    }
}
