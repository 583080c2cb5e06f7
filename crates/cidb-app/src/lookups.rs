// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use tracing::{info, warn};

use crate::collection::{Proxy, RemoteCollection};
use crate::model::{Brand, FuelType, TransmissionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Maker,
    Fuel,
    Transmission,
}

impl LookupKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Maker => "maker",
            Self::Fuel => "fuel",
            Self::Transmission => "transmission",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOption {
    pub value: String,
    pub display: String,
}

impl LookupOption {
    fn same(label: &str) -> Self {
        Self {
            value: label.to_owned(),
            display: label.to_owned(),
        }
    }
}

/// Fixed list of values a select editor may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupCollection {
    kind: LookupKind,
    options: Vec<LookupOption>,
}

impl LookupCollection {
    pub fn empty(kind: LookupKind) -> Self {
        Self {
            kind,
            options: Vec::new(),
        }
    }

    pub fn fuels() -> Self {
        Self {
            kind: LookupKind::Fuel,
            options: FuelType::ALL
                .iter()
                .map(|fuel| LookupOption::same(fuel.as_str()))
                .collect(),
        }
    }

    pub fn transmissions() -> Self {
        Self {
            kind: LookupKind::Transmission,
            options: TransmissionType::ALL
                .iter()
                .map(|transmission| LookupOption::same(transmission.as_str()))
                .collect(),
        }
    }

    /// Brands are keyed and shown by `name`; blank names are skipped.
    pub fn from_brands<'a>(brands: impl IntoIterator<Item = &'a Brand>) -> Self {
        let mut options: Vec<LookupOption> = Vec::new();
        for brand in brands {
            let name = brand.name.trim();
            if name.is_empty() || options.iter().any(|option| option.value == name) {
                continue;
            }
            options.push(LookupOption::same(name));
        }
        Self {
            kind: LookupKind::Maker,
            options,
        }
    }

    pub const fn kind(&self) -> LookupKind {
        self.kind
    }

    pub fn options(&self) -> &[LookupOption] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.position(value).is_some()
    }

    pub fn position(&self, value: &str) -> Option<usize> {
        self.options.iter().position(|option| option.value == value)
    }

    pub fn display_for(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.display.as_str())
    }

    /// Next value after `current` in `delta` direction, wrapping at both ends.
    /// An unknown or blank current value starts from the first option.
    pub fn cycle(&self, current: &str, delta: isize) -> Option<&str> {
        if self.options.is_empty() {
            return None;
        }
        let len = self.options.len() as isize;
        let next = match self.position(current) {
            Some(index) => (index as isize + delta).rem_euclid(len) as usize,
            None if delta < 0 => self.options.len() - 1,
            None => 0,
        };
        Some(self.options[next].value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lookups {
    pub fuel: LookupCollection,
    pub transmission: LookupCollection,
    brands: RemoteCollection<Brand>,
    maker: LookupCollection,
    brands_loaded: bool,
}

impl Default for Lookups {
    fn default() -> Self {
        Self::new()
    }
}

impl Lookups {
    pub fn new() -> Self {
        Self {
            fuel: LookupCollection::fuels(),
            transmission: LookupCollection::transmissions(),
            brands: RemoteCollection::new(),
            maker: LookupCollection::empty(LookupKind::Maker),
            brands_loaded: false,
        }
    }

    pub fn with_brands(brands: Vec<Brand>) -> Self {
        let mut lookups = Self::new();
        lookups.set_brands(brands);
        lookups
    }

    /// Fetches the brand list the first time it is called; later calls are
    /// answered from the cached rows.
    pub fn load_brands<P>(&mut self, proxy: &P) -> Result<()>
    where
        P: Proxy<Brand> + ?Sized,
    {
        if self.brands_loaded {
            return Ok(());
        }
        if let Err(error) = self.brands.load(proxy) {
            warn!(error = %format!("{error:#}"), "brand lookup unavailable");
            self.maker = LookupCollection::empty(LookupKind::Maker);
            return Err(error);
        }
        self.maker = LookupCollection::from_brands(self.brands.iter());
        self.brands_loaded = true;
        info!(options = self.maker.len(), "brand lookup ready");
        Ok(())
    }

    pub fn set_brands(&mut self, brands: Vec<Brand>) {
        self.brands.replace(brands);
        self.maker = LookupCollection::from_brands(self.brands.iter());
        self.brands_loaded = true;
    }

    pub fn brands_loaded(&self) -> bool {
        self.brands_loaded
    }

    pub fn brand(&self, name: &str) -> Option<&Brand> {
        self.brands.iter().find(|brand| brand.name == name)
    }

    pub fn maker(&self) -> &LookupCollection {
        &self.maker
    }

    pub fn get(&self, kind: LookupKind) -> &LookupCollection {
        match kind {
            LookupKind::Maker => &self.maker,
            LookupKind::Fuel => &self.fuel,
            LookupKind::Transmission => &self.transmission,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LookupCollection, LookupKind, Lookups};
    use crate::{Brand, BrandId, Proxy};
    use anyhow::{Result, bail};
    use std::cell::Cell;

    fn brand(id: i64, name: &str, realname: &str) -> Brand {
        Brand {
            id: Some(BrandId::new(id)),
            name: name.to_owned(),
            realname: realname.to_owned(),
        }
    }

    struct BrandProxy {
        reads: Cell<usize>,
        fail: bool,
    }

    impl Proxy<Brand> for BrandProxy {
        fn read_all(&self) -> Result<Vec<Brand>> {
            self.reads.set(self.reads.get() + 1);
            if self.fail {
                bail!("connection refused");
            }
            Ok(vec![
                brand(0, "CITROEN", "Citroën"),
                brand(1, "FIAT", "Fiat"),
                brand(2, "BMW", "BMW"),
            ])
        }

        fn find_by(&self, _column: &str, _value: &str) -> Result<Vec<Brand>> {
            bail!("not used")
        }

        fn create(&self, _record: &Brand) -> Result<Option<Brand>> {
            bail!("not used")
        }

        fn update(&self, _key: BrandId, _record: &Brand) -> Result<()> {
            bail!("not used")
        }

        fn destroy(&self, _key: BrandId) -> Result<()> {
            bail!("not used")
        }
    }

    #[test]
    fn static_lookups_need_no_network() {
        let lookups = Lookups::new();
        assert_eq!(lookups.fuel.len(), 5);
        assert!(lookups.fuel.contains("Hydrogen"));
        assert!(lookups.transmission.contains("Semi-Automatic"));
        assert!(!lookups.transmission.contains("CVT"));
        assert!(lookups.maker().is_empty());
        assert!(!lookups.brands_loaded());
    }

    #[test]
    fn brands_load_once_and_are_queried_locally() {
        let proxy = BrandProxy {
            reads: Cell::new(0),
            fail: false,
        };
        let mut lookups = Lookups::new();
        lookups.load_brands(&proxy).expect("load brands");
        lookups.load_brands(&proxy).expect("cached brands");

        assert_eq!(proxy.reads.get(), 1);
        assert_eq!(lookups.get(LookupKind::Maker).len(), 3);
        assert_eq!(lookups.maker().display_for("CITROEN"), Some("CITROEN"));
        assert_eq!(
            lookups.brand("CITROEN").map(|brand| brand.realname.as_str()),
            Some("Citroën")
        );
    }

    #[test]
    fn failed_brand_load_leaves_empty_maker_options() {
        let proxy = BrandProxy {
            reads: Cell::new(0),
            fail: true,
        };
        let mut lookups = Lookups::new();
        assert!(lookups.load_brands(&proxy).is_err());
        assert!(lookups.maker().is_empty());
        assert!(!lookups.brands_loaded());
    }

    #[test]
    fn cycle_wraps_and_starts_from_either_end() {
        let fuels = LookupCollection::fuels();
        assert_eq!(fuels.cycle("", 1), Some("Gasoline"));
        assert_eq!(fuels.cycle("", -1), Some("Hydrogen"));
        assert_eq!(fuels.cycle("Hydrogen", 1), Some("Gasoline"));
        assert_eq!(fuels.cycle("Gasoline", -1), Some("Hydrogen"));
        assert_eq!(LookupCollection::empty(LookupKind::Maker).cycle("", 1), None);
    }

    #[test]
    fn duplicate_and_blank_brand_names_are_skipped() {
        let brands = [
            brand(0, "MINI", "Mini"),
            brand(1, "MINI", "Mini"),
            brand(2, " ", "blank"),
        ];
        let makers = LookupCollection::from_brands(brands.iter());
        assert_eq!(makers.len(), 1);
        assert_eq!(makers.kind(), LookupKind::Maker);
    }
}
