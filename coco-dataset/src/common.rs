//! Common imports from external crates.

pub use anyhow::{bail, ensure, format_err, Context, Error, Result};
pub use bbox::{prelude::*, HW, TLBR, XYWH};
pub use indexmap::{IndexMap, IndexSet};
pub use itertools::Itertools;
pub use noisy_float::prelude::*;
pub use serde::{Deserialize, Deserializer, Serialize, Serializer};
pub use std::{
    collections::{HashMap, HashSet},
    fmt::{self, Display},
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};
pub use tracing::{debug, info, warn};
