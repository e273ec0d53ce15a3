//! Domain decomposition and inter-subdomain communication.
//!
//! The global grid is split into a Cartesian arrangement of equally sized
//! subdomains, one per [`Rank`](yee_core::Rank). Each rank owns a
//! [`DomainComm`] that knows its [`Topology`] (face neighbours, periodic
//! wrap) and moves data across subdomain faces through a [`Transport`]:
//!
//! - guard cells of staggered fields ([`DomainComm::exchange_guards`]),
//!   with boundary conditions applied on global faces;
//! - particles that left the interior ([`DomainComm::exchange_particles`]);
//! - small collective reductions used by diagnostics.
//!
//! [`run_cluster`] runs one closure per rank on its own thread over an
//! in-process [`ChannelTransport`] mesh.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod cluster;
pub mod comm;
pub mod decomposition;
pub mod guard;
pub mod particles;
pub mod topology;
pub mod transport;

pub use boundary::{BoundaryKind, Boundaries};
pub use cluster::{current_rank, run_cluster};
pub use comm::DomainComm;
pub use decomposition::Decomposition;
pub use particles::{ParticleRecord, ParticleStats};
pub use topology::Topology;
pub use transport::{ChannelTransport, MessageKind, Payload, Tag, Transport};
