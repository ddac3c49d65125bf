//! scalesync-aws: Auto Scaling group membership query
//!
//! Issues a SigV4-signed `DescribeAutoScalingGroups` request and returns the
//! instance ids of one group. An empty or malformed answer is an error: the
//! caller must never treat it as "the fleet is empty".

pub mod client;
pub mod error;
pub mod sigv4;
pub mod traits;
pub mod types;

pub use client::AutoScalingClient;
pub use error::{FleetError, Result};
pub use sigv4::Credentials;
pub use traits::FleetApi;
pub use types::FleetMember;
