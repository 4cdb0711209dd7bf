//! Domain core for dr-pilot
//!
//! Everything the manage-policies flow needs short of a terminal and a
//! cluster: the policy projections, the filter/paginate views, the selection
//! set, the modal state machine, and the unassign fan-out. Keeping this crate
//! free of TUI types lets the whole flow run under plain unit tests.

pub mod constants;
pub mod errors;
pub mod fetch;
pub mod indicators;
pub mod reducer;
pub mod selection;
pub mod store;
pub mod types;
pub mod unassign;

pub use errors::*;
pub use fetch::*;
pub use indicators::*;
pub use reducer::*;
pub use selection::*;
pub use store::*;
pub use types::*;
pub use unassign::*;
