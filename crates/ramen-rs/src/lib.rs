//! ramen-rs: Rust client for Ramen disaster-recovery resources
//!
//! This crate provides typed access to the `ramendr.openshift.io` custom
//! resources (DRPolicy, DRPlacementControl) and a high-level client for the
//! operations the console performs against them.
//!
//! # Example
//!
//! ```no_run
//! use ramen_rs::RamenClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RamenClient::connect().await?;
//!
//!     for policy in client.list_policies().await? {
//!         println!("{:?}", policy.metadata.name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod resources;

pub use client::{RamenClient, SCHEDULING_DISABLE_ANNOTATION};
pub use error::RamenError;
pub use resources::{
    DRPlacementControl, DRPlacementControlSpec, DRPlacementControlStatus, DRPolicy, DRPolicySpec,
    ResourceRef,
};
