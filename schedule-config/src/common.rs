pub use anyhow::{ensure, Context, Result};
pub use itertools::Itertools;
pub use noisy_float::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::path::Path;
pub use tracing::debug;
