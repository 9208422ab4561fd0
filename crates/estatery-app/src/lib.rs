// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod codec;
pub mod confirm;
pub mod forms;
pub mod ids;
pub mod model;
pub mod page;
pub mod query;
pub mod record;
pub mod selection;
pub mod state;
pub mod store;

pub use codec::*;
pub use confirm::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use page::*;
pub use query::*;
pub use record::*;
pub use selection::*;
pub use state::*;
pub use store::*;
