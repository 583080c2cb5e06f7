// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod collection;
pub mod details;
pub mod forms;
pub mod grid;
pub mod ids;
pub mod lookups;
pub mod model;
pub mod state;
pub mod wire;

pub use collection::*;
pub use details::*;
pub use forms::*;
pub use grid::*;
pub use ids::*;
pub use lookups::*;
pub use model::*;
pub use state::*;
