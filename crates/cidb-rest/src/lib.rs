// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod client;
mod demo;
mod error;
mod memory;

pub use client::{Client, DEFAULT_PRIMARY_KEY, Endpoint, PRIMARY_KEY_HEADER, RestProxy};
pub use demo::{DemoBackend, DemoData, demo_data};
pub use error::RestError;
pub use memory::MemoryBackend;
