//! Routing of particles that left their subdomain.
//!
//! A particle's cell is counted from the first interior cell of its
//! subdomain: `0..reso` along each axis is inside, anything else sits in
//! the guard region of a neighbour. Routing is per axis; a particle that
//! crossed a corner reaches the diagonal neighbour through consecutive
//! hops along each axis it left through.

use yee_core::{Scalar, Side, TopologyError, AXES};
use yee_exec::ExecPolicy;

use crate::comm::DomainComm;
use crate::transport::{MessageKind, Payload, Tag, Transport};

/// A fixed-size particle payload the communicator can move.
pub trait ParticleRecord: Sized + Send + 'static {
    /// Number of scalars [`pack`](Self::pack) writes.
    const WORDS: usize;

    /// Cell index relative to the first interior cell.
    fn cell(&self) -> [i64; AXES];

    /// Overwrite the cell index (used to rebase into a neighbour's frame).
    fn set_cell(&mut self, cell: [i64; AXES]);

    /// Append exactly [`WORDS`](Self::WORDS) scalars.
    fn pack(&self, out: &mut Vec<Scalar>);

    /// Rebuild a record from exactly [`WORDS`](Self::WORDS) scalars.
    fn unpack(words: &[Scalar]) -> Self;
}

/// Counters of one particle exchange.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParticleStats {
    /// Particles handed to a neighbour.
    pub sent: usize,
    /// Particles received from neighbours.
    pub received: usize,
    /// Particles removed at a non-periodic global face.
    pub escaped: usize,
}

impl std::ops::AddAssign for ParticleStats {
    fn add_assign(&mut self, other: Self) {
        self.sent += other.sent;
        self.received += other.received;
        self.escaped += other.escaped;
    }
}

impl<P: ExecPolicy, T: Transport> DomainComm<P, T> {
    /// Remove every particle outside the interior along `axis` and send it
    /// to the neighbour on that side, rebased into the neighbour's frame.
    ///
    /// A count, then a payload, goes to each existing neighbour (possibly
    /// zero particles) so [`receive_particles`](Self::receive_particles)
    /// always has a matching pair to consume.
    pub fn send_particles<R: ParticleRecord>(
        &mut self,
        axis: usize,
        particles: &mut Vec<R>,
    ) -> Result<ParticleStats, TopologyError> {
        let reso = i64::from(self.grid().reso(axis));
        let topology = self.topology().clone();
        let mut outgoing: [Vec<Scalar>; 2] = Default::default();
        let mut counts = [0u64; 2];
        let mut stats = ParticleStats::default();

        particles.retain_mut(|p| {
            let mut cell = p.cell();
            let side = if cell[axis] < 0 {
                Side::Lower
            } else if cell[axis] >= reso {
                Side::Upper
            } else {
                return true;
            };
            if topology.neighbor(axis, side).is_none() {
                stats.escaped += 1;
                return false;
            }
            cell[axis] -= side.sign() * reso;
            p.set_cell(cell);
            p.pack(&mut outgoing[side.index()]);
            counts[side.index()] += 1;
            false
        });

        for side in Side::BOTH {
            if let Some(dest) = topology.neighbor(axis, side) {
                let tag = Tag::new(MessageKind::ParticleCount, axis, side);
                self.transport()
                    .send(dest, tag, Payload::Count(counts[side.index()]))?;
                stats.sent += counts[side.index()] as usize;
            }
        }
        for side in Side::BOTH {
            if let Some(dest) = topology.neighbor(axis, side) {
                let tag = Tag::new(MessageKind::ParticleData, axis, side);
                let words = std::mem::take(&mut outgoing[side.index()]);
                self.transport().send(dest, tag, Payload::Scalars(words))?;
            }
        }
        if stats.escaped > 0 {
            tracing::debug!(
                rank = %self.rank(),
                axis,
                escaped = stats.escaped,
                "particles left the global domain"
            );
        }
        Ok(stats)
    }

    /// Receive the particles both neighbours along `axis` sent with
    /// [`send_particles`](Self::send_particles).
    ///
    /// # Errors
    ///
    /// [`TopologyError::PacketSizeMismatch`] if a payload does not hold
    /// `count * WORDS` scalars.
    pub fn receive_particles<R: ParticleRecord>(&mut self, axis: usize) -> Result<Vec<R>, TopologyError> {
        // A neighbour sends to its lower side first, which is our upper side.
        let order = [Side::Upper, Side::Lower];
        let mut counts = [0usize; 2];
        for side in order {
            if let Some(src) = self.topology().neighbor(axis, side) {
                let tag = Tag::new(MessageKind::ParticleCount, axis, side.opposite());
                counts[side.index()] = self.transport().recv_count(src, tag)? as usize;
            }
        }
        let mut arrived = Vec::with_capacity(counts.iter().sum());
        for side in order {
            if let Some(src) = self.topology().neighbor(axis, side) {
                let tag = Tag::new(MessageKind::ParticleData, axis, side.opposite());
                let words = self.transport().recv_scalars(src, tag)?;
                let expected = counts[side.index()] * R::WORDS;
                if words.len() != expected {
                    return Err(TopologyError::PacketSizeMismatch {
                        rank: self.rank(),
                        from: src,
                        axis,
                        side,
                        expected,
                        actual: words.len(),
                    });
                }
                if R::WORDS > 0 {
                    arrived.extend(words.chunks_exact(R::WORDS).map(R::unpack));
                }
            }
        }
        Ok(arrived)
    }

    /// Route every particle outside the interior to the subdomain that now
    /// owns it, axis by axis, and append arrivals to `particles`.
    pub fn exchange_particles<R: ParticleRecord>(
        &mut self,
        particles: &mut Vec<R>,
    ) -> Result<ParticleStats, TopologyError> {
        let mut stats = ParticleStats::default();
        for axis in 0..self.grid().dim() {
            stats += self.send_particles(axis, particles)?;
            let arrived: Vec<R> = self.receive_particles(axis)?;
            stats.received += arrived.len();
            particles.extend(arrived);
        }
        tracing::debug!(
            rank = %self.rank(),
            sent = stats.sent,
            received = stats.received,
            escaped = stats.escaped,
            "particle exchange"
        );
        Ok(stats)
    }
}
