//! Test doubles for elastik clients
//!
//! A [`VirtualCluster`] scripts how nodes answer client calls, pings and
//! sniffs; the sealed cluster hands out an [`elastik::ElasticClient`] whose
//! transport runs against it on a [`TestableClock`]. [`Auditor`] and
//! [`UrlTester`] assert what the client did on the wire.

pub mod auditor;
pub mod clock;
pub mod cluster;
pub mod connection;
pub mod fixtures;
pub mod rule;
pub mod url_tester;

pub use auditor::{assert_audit_trail, audit, AuditExpectation, Auditor};
pub use clock::TestableClock;
pub use cluster::{SealedVirtualCluster, VirtualCluster, VirtualNode, VirtualizedCluster};
pub use connection::VirtualClusterConnection;
pub use fixtures::{CommitActivity, Developer, Project};
pub use rule::{FailWith, Rule, Times};
pub use url_tester::UrlTester;
