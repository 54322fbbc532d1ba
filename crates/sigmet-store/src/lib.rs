//! SIGMET Store: persistence and publication workflow
//!
//! ## Key Components
//!
//! - `SigmetStore`: storage contract (put/get/list, sequence numbering)
//! - `FsSigmetStore`: one JSON document per record under `<root>/sigmets/`
//! - `MemorySigmetStore`: in-memory store for tests and dry runs
//! - `SigmetDesk`: draft, publish, cancel and amend operations

pub mod desk;
mod error;
pub mod fakes;
pub mod fs;
pub mod storage_traits;

pub use desk::{Amendment, SigmetDesk};
pub use error::{StoreError, StoreResult};
pub use fakes::MemorySigmetStore;
pub use fs::FsSigmetStore;
pub use storage_traits::{sequence_day, SigmetStore};
