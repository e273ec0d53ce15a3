//! The per-rank communicator.

use std::sync::Arc;

use yee_core::{ConfigError, Rank, Scalar, Side, TopologyError};
use yee_exec::ExecPolicy;
use yee_field::Field;
use yee_grid::Grid;

use crate::boundary::{fill_face, Boundaries};
use crate::guard::{pack, recv_range, send_range, unpack};
use crate::topology::Topology;
use crate::transport::{ChannelTransport, MessageKind, Payload, Tag, Transport};

/// Everything one rank needs to talk to its neighbours.
///
/// Owns the execution policy used for the subdomain, so fields and
/// kernels on this rank go through [`policy`](Self::policy).
#[derive(Debug)]
pub struct DomainComm<P: ExecPolicy, T: Transport = ChannelTransport> {
    policy: P,
    grid: Arc<Grid>,
    topology: Topology,
    boundaries: Boundaries,
    transport: T,
    /// Reusable send buffer per face, `[x-, x+, y-, y+, z-, z+]`.
    buffers: [Vec<Scalar>; 6],
}

impl<P: ExecPolicy> DomainComm<P, ChannelTransport> {
    /// A communicator for an undecomposed domain: one rank, periodic axes
    /// wrap onto itself.
    pub fn single(policy: P, grid: Arc<Grid>, boundaries: Boundaries) -> Result<Self, ConfigError> {
        let topology = Topology::new(Rank(0), [1; 3], boundaries.periodic_axes())?;
        Self::new(policy, grid, topology, boundaries, ChannelTransport::solo())
    }
}

impl<P: ExecPolicy, T: Transport> DomainComm<P, T> {
    /// Assemble a communicator.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidDecomposition`] if the transport and topology
    /// disagree on this rank or the cluster size, if the topology's
    /// periodicity differs from `boundaries`, or if a decomposed axis is
    /// thinner than the guard width.
    pub fn new(
        policy: P,
        grid: Arc<Grid>,
        topology: Topology,
        boundaries: Boundaries,
        transport: T,
    ) -> Result<Self, ConfigError> {
        let mismatch = |reason: String| ConfigError::InvalidDecomposition { reason };
        if transport.rank() != topology.rank() || transport.size() != topology.size() {
            return Err(mismatch(format!(
                "transport is rank {} of {}, topology is rank {} of {}",
                transport.rank(),
                transport.size(),
                topology.rank(),
                topology.size()
            )));
        }
        boundaries.validate(grid.dim())?;
        for axis in 0..grid.dim() {
            if topology.is_periodic(axis) != boundaries.is_periodic(axis) {
                return Err(mismatch(format!(
                    "topology and boundaries disagree on periodicity of axis {axis}"
                )));
            }
            if grid.reso(axis) < grid.guard(axis) {
                return Err(mismatch(format!(
                    "{} interior cells along axis {axis} cannot fill {} guard cells",
                    grid.reso(axis),
                    grid.guard(axis)
                )));
            }
        }
        tracing::info!(
            rank = %topology.rank(),
            coord = ?topology.coord(),
            dims = ?topology.dims(),
            policy = policy.name(),
            "domain communicator ready"
        );
        Ok(Self {
            policy,
            grid,
            topology,
            boundaries,
            transport,
            buffers: Default::default(),
        })
    }

    /// The execution policy of this rank.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// The subdomain geometry.
    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    /// The rank arrangement seen from here.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Global boundary conditions.
    pub fn boundaries(&self) -> &Boundaries {
        &self.boundaries
    }

    /// This rank.
    pub fn rank(&self) -> Rank {
        self.topology.rank()
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Refresh every guard cell of `field`.
    ///
    /// Axes are processed in order; each axis sends both interior slabs,
    /// then receives both guard slabs, so guard corners are filled through
    /// the later axes' full-extent slabs. Faces without a neighbour get the
    /// boundary fill of their [`BoundaryKind`](crate::BoundaryKind).
    ///
    /// # Errors
    ///
    /// Any transport failure, [`TopologyError::PacketSizeMismatch`] when
    /// a neighbour's slab has the wrong length, or
    /// [`TopologyError::ExtentMismatch`] for a field not shaped like this
    /// subdomain (nothing is sent then).
    pub fn exchange_guards<const N: usize>(&mut self, field: &mut Field<N>) -> Result<(), TopologyError> {
        let (field_extent, extent) = (field.grid().extent(), self.grid.extent());
        if field_extent != extent {
            return Err(TopologyError::ExtentMismatch {
                rank: self.rank(),
                field: field_extent.0,
                subdomain: extent.0,
            });
        }
        self.policy.sync()?;
        for array in field.components_mut() {
            self.policy.copy_to_host(array);
        }
        let grid = Arc::clone(&self.grid);
        let staggers = field.staggers();

        for axis in 0..grid.dim() {
            for side in Side::BOTH {
                let Some(dest) = self.topology.neighbor(axis, side) else {
                    continue;
                };
                let range = send_range(&grid, axis, side);
                let mut buf = std::mem::take(&mut self.buffers[side.face(axis)]);
                buf.clear();
                for array in field.components() {
                    pack(array, range, &mut buf);
                }
                self.transport.send(
                    dest,
                    Tag::new(MessageKind::Guard, axis, side),
                    Payload::Scalars(buf),
                )?;
            }
            // The upper neighbour's lower-face message was queued first.
            for side in [Side::Upper, Side::Lower] {
                match self.topology.neighbor(axis, side) {
                    Some(src) => {
                        let tag = Tag::new(MessageKind::Guard, axis, side.opposite());
                        let data = self.transport.recv_scalars(src, tag)?;
                        let range = recv_range(&grid, axis, side);
                        let expected = N * range.len();
                        if data.len() != expected {
                            return Err(TopologyError::PacketSizeMismatch {
                                rank: self.rank(),
                                from: src,
                                axis,
                                side,
                                expected,
                                actual: data.len(),
                            });
                        }
                        let mut at = 0;
                        for array in field.components_mut() {
                            at += unpack(array, range, &data[at..]);
                        }
                        self.buffers[side.face(axis)] = data;
                    }
                    None => {
                        let kind = self.boundaries.face(axis, side);
                        for (array, &stagger) in field.components_mut().iter_mut().zip(&staggers) {
                            fill_face(array, &grid, stagger, axis, side, kind);
                        }
                    }
                }
            }
        }

        for array in field.components_mut() {
            self.policy.copy_to_device(array);
        }
        tracing::trace!(rank = %self.rank(), components = N, "guards exchanged");
        Ok(())
    }

    /// Sum `value` over every rank; every rank receives the same total,
    /// accumulated in rank order.
    pub fn all_reduce_sum(&mut self, value: Scalar) -> Result<Scalar, TopologyError> {
        let size = self.topology.size();
        if size == 1 {
            return Ok(value);
        }
        let up = Tag::new(MessageKind::Reduce, 0, Side::Lower);
        let down = Tag::new(MessageKind::Reduce, 0, Side::Upper);
        let root = Rank(0);
        if self.rank() == root {
            let mut total = value;
            for r in 1..size {
                let part = self.transport.recv_scalars(Rank(r), up)?;
                total += part.iter().sum::<Scalar>();
            }
            for r in 1..size {
                self.transport
                    .send(Rank(r), down, Payload::Scalars(vec![total]))?;
            }
            Ok(total)
        } else {
            self.transport
                .send(root, up, Payload::Scalars(vec![value]))?;
            let total = self.transport.recv_scalars(root, down)?;
            total.first().copied().ok_or(TopologyError::PacketSizeMismatch {
                rank: self.rank(),
                from: root,
                axis: 0,
                side: Side::Lower,
                expected: 1,
                actual: 0,
            })
        }
    }

    /// Exclusive prefix sum of `values` along the open rank chain of `axis`
    /// (periodic wrap ignored): the first rank receives zeros, every later
    /// rank the element-wise sum of all earlier ranks' `values`.
    ///
    /// # Errors
    ///
    /// Transport failures, or [`TopologyError::PacketSizeMismatch`] if the
    /// ranks of a chain pass vectors of different lengths.
    pub fn exclusive_scan(&mut self, axis: usize, values: &[Scalar]) -> Result<Vec<Scalar>, TopologyError> {
        let tag = Tag::new(MessageKind::Scan, axis, Side::Upper);
        let prefix = match self.topology.chain_neighbor(axis, Side::Lower) {
            Some(src) => {
                let prefix = self.transport.recv_scalars(src, tag)?;
                if prefix.len() != values.len() {
                    return Err(TopologyError::PacketSizeMismatch {
                        rank: self.rank(),
                        from: src,
                        axis,
                        side: Side::Lower,
                        expected: values.len(),
                        actual: prefix.len(),
                    });
                }
                prefix
            }
            None => vec![0.0; values.len()],
        };
        if let Some(dest) = self.topology.chain_neighbor(axis, Side::Upper) {
            let next: Vec<Scalar> = prefix.iter().zip(values).map(|(a, b)| a + b).collect();
            self.transport.send(dest, tag, Payload::Scalars(next))?;
        }
        Ok(prefix)
    }
}
