// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod date_range;
pub mod debounce;
pub mod filters;
pub mod ids;
pub mod model;
pub mod multi_select;
pub mod pagination;
pub mod query;
pub mod state;
pub mod view;

pub use date_range::*;
pub use debounce::*;
pub use filters::*;
pub use ids::*;
pub use model::*;
pub use multi_select::*;
pub use pagination::*;
pub use query::*;
pub use state::*;
pub use view::*;
