// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};

use crate::forms::{
    AMOUNT_MIN, AMOUNT_STEP, CarFormInput, YEAR_MAX, YEAR_MIN, format_amount, parse_amount,
    parse_optional_text, parse_year,
};
use crate::lookups::{LookupKind, Lookups};
use crate::model::Car;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarColumn {
    Model,
    Maker,
    Year,
    Fuel,
    Transmission,
    CurrentMarketValue,
    NewValue,
}

impl CarColumn {
    pub const ALL: [Self; 7] = [
        Self::Model,
        Self::Maker,
        Self::Year,
        Self::Fuel,
        Self::Transmission,
        Self::CurrentMarketValue,
        Self::NewValue,
    ];

    /// Column the editor lands on after Add.
    pub const FIRST_EDIT: Self = Self::Maker;

    pub const fn index(self) -> usize {
        match self {
            Self::Model => 0,
            Self::Maker => 1,
            Self::Year => 2,
            Self::Fuel => 3,
            Self::Transmission => 4,
            Self::CurrentMarketValue => 5,
            Self::NewValue => 6,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub const fn header(self) -> &'static str {
        match self {
            Self::Model => "Model",
            Self::Maker => "Maker",
            Self::Year => "Year",
            Self::Fuel => "Fuel",
            Self::Transmission => "Transmission",
            Self::CurrentMarketValue => "CRP(€)",
            Self::NewValue => "PSP(€)",
        }
    }

    pub const fn field(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Maker => "maker",
            Self::Year => "year",
            Self::Fuel => "fuel",
            Self::Transmission => "transmission",
            Self::CurrentMarketValue => "currentmarketvalue",
            Self::NewValue => "newvalue",
        }
    }

    pub const fn editor(self) -> EditorSpec {
        match self {
            Self::Model => EditorSpec::Text,
            Self::Maker => EditorSpec::Select(LookupKind::Maker),
            Self::Year => EditorSpec::Number(NumberSpec {
                min: Some(YEAR_MIN as f64),
                max: Some(YEAR_MAX as f64),
                step: 1.0,
                default: Some(Car::DEFAULT_YEAR as f64),
                integer: true,
            }),
            Self::Fuel => EditorSpec::Select(LookupKind::Fuel),
            Self::Transmission => EditorSpec::Select(LookupKind::Transmission),
            Self::CurrentMarketValue | Self::NewValue => EditorSpec::Number(NumberSpec {
                min: Some(AMOUNT_MIN),
                max: None,
                step: AMOUNT_STEP,
                default: None,
                integer: false,
            }),
        }
    }

    /// Text shown in the grid cell.
    pub fn display(self, car: &Car) -> String {
        match self {
            Self::Model => car.model.clone(),
            Self::Maker => car.maker.clone(),
            Self::Year => car.year.map(|year| year.to_string()).unwrap_or_default(),
            Self::Fuel => car.fuel.clone().unwrap_or_default(),
            Self::Transmission => car.transmission.clone().unwrap_or_default(),
            Self::CurrentMarketValue => car
                .currentmarketvalue
                .map(format_amount)
                .unwrap_or_default(),
            Self::NewValue => car.newvalue.map(format_amount).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberSpec {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: f64,
    pub default: Option<f64>,
    pub integer: bool,
}

impl NumberSpec {
    pub fn clamp(&self, value: f64) -> f64 {
        let mut value = value;
        if let Some(min) = self.min
            && value < min
        {
            value = min;
        }
        if let Some(max) = self.max
            && value > max
        {
            value = max;
        }
        value
    }

    /// Moves `current` by `delta` steps. A blank editor jumps to the default
    /// (or the minimum) instead of stepping.
    pub fn step_from(&self, current: Option<f64>, delta: i32) -> f64 {
        match current {
            Some(value) => self.clamp(value + self.step * f64::from(delta)),
            None => self.clamp(self.default.or(self.min).unwrap_or(0.0)),
        }
    }

    pub fn format(&self, value: f64) -> String {
        if self.integer {
            format!("{value:.0}")
        } else {
            format_amount(value)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorSpec {
    Text,
    Number(NumberSpec),
    Select(LookupKind),
}

impl EditorSpec {
    pub const fn accepts_typing(self) -> bool {
        !matches!(self, Self::Select(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Add,
    Details,
    Delete,
    Save,
    Reload,
}

impl ToolbarAction {
    pub const ALL: [Self; 5] = [
        Self::Add,
        Self::Details,
        Self::Delete,
        Self::Save,
        Self::Reload,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Details => "Details",
            Self::Delete => "Delete",
            Self::Save => "Save",
            Self::Reload => "Reload",
        }
    }

    pub const fn requires_selection(self) -> bool {
        matches!(self, Self::Details | Self::Delete)
    }

    pub const fn enabled(self, has_selection: bool) -> bool {
        has_selection || !self.requires_selection()
    }
}

/// In-place editor over one grid row.
///
/// Each column keeps its own text buffer; moving between cells only changes
/// focus. Nothing reaches the collection until [`RowEditor::commit`] succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct RowEditor {
    row: usize,
    column: CarColumn,
    cells: [String; 7],
    base: Car,
    error: Option<String>,
}

impl RowEditor {
    pub fn start(row: usize, car: &Car, column: CarColumn) -> Self {
        let cells = CarColumn::ALL.map(|column| column.display(car));
        Self {
            row,
            column,
            cells,
            base: car.clone(),
            error: None,
        }
    }

    pub const fn row(&self) -> usize {
        self.row
    }

    pub const fn column(&self) -> CarColumn {
        self.column
    }

    pub fn base(&self) -> &Car {
        &self.base
    }

    pub fn cell(&self, column: CarColumn) -> &str {
        &self.cells[column.index()]
    }

    pub fn current(&self) -> &str {
        self.cell(self.column)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn focus(&mut self, column: CarColumn) {
        self.column = column;
    }

    /// Moves focus by `delta` columns, stopping at the first and last one.
    pub fn move_column(&mut self, delta: isize) -> CarColumn {
        let last = CarColumn::ALL.len() as isize - 1;
        let next = (self.column.index() as isize + delta).clamp(0, last) as usize;
        self.column = CarColumn::ALL[next];
        self.column
    }

    pub fn input_char(&mut self, ch: char) -> bool {
        let editor = self.column.editor();
        if !editor.accepts_typing() || ch.is_control() {
            return false;
        }
        if let EditorSpec::Number(spec) = editor {
            let allowed = ch.is_ascii_digit() || (!spec.integer && ch == '.');
            if !allowed {
                return false;
            }
        }
        self.cells[self.column.index()].push(ch);
        self.error = None;
        true
    }

    pub fn backspace(&mut self) -> bool {
        if !self.column.editor().accepts_typing() {
            return false;
        }
        let changed = self.cells[self.column.index()].pop().is_some();
        if changed {
            self.error = None;
        }
        changed
    }

    /// Clears the focused cell. Select cells become blank too.
    pub fn clear_cell(&mut self) {
        self.cells[self.column.index()].clear();
        self.error = None;
    }

    /// Steps a number cell or cycles a select cell. Text cells ignore it.
    pub fn step(&mut self, delta: i32, lookups: &Lookups) -> bool {
        let index = self.column.index();
        match self.column.editor() {
            EditorSpec::Text => false,
            EditorSpec::Number(spec) => {
                let current = if spec.integer {
                    parse_year(&self.cells[index])
                        .ok()
                        .flatten()
                        .map(f64::from)
                } else {
                    parse_amount(self.column.header(), &self.cells[index])
                        .ok()
                        .flatten()
                };
                self.cells[index] = spec.format(spec.step_from(current, delta));
                self.error = None;
                true
            }
            EditorSpec::Select(kind) => {
                let Some(next) = lookups.get(kind).cycle(&self.cells[index], delta as isize) else {
                    return false;
                };
                self.cells[index] = next.to_owned();
                self.error = None;
                true
            }
        }
    }

    pub fn to_input(&self) -> Result<CarFormInput> {
        let cell = |column: CarColumn| self.cell(column);
        Ok(CarFormInput {
            maker: cell(CarColumn::Maker).trim().to_owned(),
            model: cell(CarColumn::Model).to_owned(),
            year: parse_year(cell(CarColumn::Year)).context("car year")?,
            fuel: parse_optional_text(cell(CarColumn::Fuel)),
            transmission: parse_optional_text(cell(CarColumn::Transmission)),
            currentmarketvalue: parse_amount("CRP", cell(CarColumn::CurrentMarketValue))?,
            newvalue: parse_amount("PSP", cell(CarColumn::NewValue))?,
        })
    }

    /// Validates every cell and builds the record to write back.
    pub fn commit(&self, lookups: &Lookups) -> Result<Car> {
        let input = self.to_input()?;
        input.validate(lookups)?;
        Ok(input.apply_to(&self.base))
    }
}

#[cfg(test)]
mod tests {
    use super::{CarColumn, EditorSpec, RowEditor, ToolbarAction};
    use crate::{Brand, BrandId, Car, CarId, LookupKind, Lookups};

    fn lookups() -> Lookups {
        Lookups::with_brands(
            ["BMW", "CITROEN", "FIAT"]
                .iter()
                .enumerate()
                .map(|(index, name)| Brand {
                    id: Some(BrandId::new(index as i64)),
                    name: (*name).to_owned(),
                    realname: (*name).to_owned(),
                })
                .collect(),
        )
    }

    fn citroen() -> Car {
        Car {
            cid: Some(CarId::new(0)),
            maker: "CITROEN".to_owned(),
            model: "C2".to_owned(),
            year: Some(2008),
            fuel: Some("Gasoline".to_owned()),
            transmission: Some("Manual".to_owned()),
            currentmarketvalue: Some(9_000.0),
            newvalue: Some(13_000.0),
        }
    }

    #[test]
    fn columns_match_grid_layout() {
        let headers = CarColumn::ALL.map(CarColumn::header);
        assert_eq!(
            headers,
            ["Model", "Maker", "Year", "Fuel", "Transmission", "CRP(€)", "PSP(€)"]
        );
        assert_eq!(CarColumn::FIRST_EDIT.index(), 1);
        assert_eq!(
            CarColumn::Maker.editor(),
            EditorSpec::Select(LookupKind::Maker)
        );
        assert_eq!(CarColumn::from_index(7), None);
    }

    #[test]
    fn toolbar_needs_selection_for_details_and_delete() {
        let disabled = ToolbarAction::ALL
            .into_iter()
            .filter(|action| !action.enabled(false))
            .collect::<Vec<_>>();
        assert_eq!(disabled, vec![ToolbarAction::Details, ToolbarAction::Delete]);
        assert!(ToolbarAction::ALL.iter().all(|action| action.enabled(true)));
    }

    #[test]
    fn year_steps_clamp_to_range() {
        let lookups = lookups();
        let mut editor = RowEditor::start(0, &citroen(), CarColumn::Year);
        editor.step(-1, &lookups);
        assert_eq!(editor.current(), "2008");
        for _ in 0..10 {
            editor.step(1, &lookups);
        }
        assert_eq!(editor.current(), "2011");

        editor.clear_cell();
        editor.step(-1, &lookups);
        assert_eq!(editor.current(), "2011");
    }

    #[test]
    fn amount_steps_by_five_thousand_and_never_goes_negative() {
        let lookups = lookups();
        let mut editor = RowEditor::start(0, &citroen(), CarColumn::CurrentMarketValue);
        editor.step(1, &lookups);
        assert_eq!(editor.current(), "14000");
        for _ in 0..5 {
            editor.step(-1, &lookups);
        }
        assert_eq!(editor.current(), "0");
    }

    #[test]
    fn select_cells_cycle_and_refuse_typing() {
        let lookups = lookups();
        let mut editor = RowEditor::start(0, &citroen(), CarColumn::Maker);
        assert!(!editor.input_char('x'));
        assert!(!editor.backspace());
        editor.step(1, &lookups);
        assert_eq!(editor.current(), "FIAT");
        editor.step(1, &lookups);
        assert_eq!(editor.current(), "BMW");

        editor.focus(CarColumn::Fuel);
        editor.clear_cell();
        editor.step(1, &lookups);
        assert_eq!(editor.current(), "Gasoline");
    }

    #[test]
    fn number_cells_only_take_digits() {
        let mut editor = RowEditor::start(0, &Car::phantom(), CarColumn::Year);
        editor.clear_cell();
        assert!(!editor.input_char('.'));
        assert!(editor.input_char('2'));
        assert!(!editor.input_char('a'));
        editor.move_column(3);
        assert_eq!(editor.column(), CarColumn::CurrentMarketValue);
        assert!(editor.input_char('.'));
    }

    #[test]
    fn moving_columns_keeps_buffers_and_clamps() {
        let mut editor = RowEditor::start(0, &citroen(), CarColumn::Model);
        editor.input_char('X');
        assert_eq!(editor.move_column(-1), CarColumn::Model);
        assert_eq!(editor.move_column(10), CarColumn::NewValue);
        assert_eq!(editor.cell(CarColumn::Model), "C2X");
    }

    #[test]
    fn commit_validates_every_field() {
        let lookups = lookups();
        let mut editor = RowEditor::start(0, &Car::phantom(), CarColumn::FIRST_EDIT);
        let error = editor.commit(&lookups).expect_err("blank phantom");
        assert!(error.to_string().contains("model is required"));

        editor.focus(CarColumn::Model);
        for ch in "Panda".chars() {
            editor.input_char(ch);
        }
        editor.focus(CarColumn::Maker);
        editor.step(1, &lookups);
        editor.focus(CarColumn::CurrentMarketValue);
        editor.step(1, &lookups);
        editor.focus(CarColumn::NewValue);
        for ch in "12000".chars() {
            editor.input_char(ch);
        }

        let car = editor.commit(&lookups).expect("valid row");
        assert!(car.cid.is_none());
        assert_eq!(car.model, "Panda");
        assert_eq!(car.maker, "BMW");
        assert_eq!(car.year, Some(Car::DEFAULT_YEAR));
        assert_eq!(car.currentmarketvalue, Some(0.0));
        assert_eq!(car.newvalue, Some(12_000.0));
    }

    #[test]
    fn amount_cells_take_a_dot_decimal_only() {
        let mut editor = RowEditor::start(0, &Car::phantom(), CarColumn::CurrentMarketValue);
        editor.clear_cell();
        for ch in "9500".chars() {
            assert!(editor.input_char(ch));
        }
        assert!(!editor.input_char(','));
        assert!(editor.input_char('.'));
        assert!(editor.input_char('5'));
        assert_eq!(editor.current(), "9500.5");
    }

    #[test]
    fn commit_keeps_server_key() {
        let mut editor = RowEditor::start(2, &citroen(), CarColumn::Model);
        editor.input_char('!');
        let car = editor.commit(&lookups()).expect("edited row");
        assert_eq!(car.cid, Some(CarId::new(0)));
        assert_eq!(car.model, "C2!");
        assert_eq!(editor.row(), 2);
    }
}
