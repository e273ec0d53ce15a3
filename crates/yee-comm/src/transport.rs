//! Point-to-point message passing between ranks.
//!
//! Messages between one ordered pair of ranks are delivered and consumed
//! in the order they were sent. Every receive names the tag it expects; a
//! different tag at the head of the queue is a protocol error, not a
//! message to skip.

use std::fmt;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use yee_core::{Rank, Scalar, Side, TopologyError};

/// What a message carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Guard-cell slab of a field.
    Guard,
    /// Number of particles in the following payload.
    ParticleCount,
    /// Packed particle records.
    ParticleData,
    /// Partial value of a collective reduction.
    Reduce,
    /// Running prefix of a chained scan.
    Scan,
}

/// Protocol tag of a message: its kind, exchange axis, and the face of the
/// *sender* it leaves through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Message kind.
    pub kind: MessageKind,
    /// Exchange axis.
    pub axis: u8,
    /// Face of the sender the message leaves through.
    pub side: Side,
}

impl Tag {
    /// Tag from its parts.
    pub fn new(kind: MessageKind, axis: usize, side: Side) -> Self {
        Self {
            kind,
            axis: axis as u8,
            side,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}[axis {}, {}]", self.kind, self.axis, self.side)
    }
}

/// Message body.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// A count.
    Count(u64),
    /// A packed buffer.
    Scalars(Vec<Scalar>),
}

impl Payload {
    fn describe(&self) -> &'static str {
        match self {
            Payload::Count(_) => "count",
            Payload::Scalars(_) => "buffer",
        }
    }
}

/// A tagged message in flight.
#[derive(Debug)]
struct Message {
    tag: Tag,
    payload: Payload,
}

/// Point-to-point channel between the ranks of one cluster.
pub trait Transport: Send {
    /// This rank.
    fn rank(&self) -> Rank;

    /// Number of ranks.
    fn size(&self) -> usize;

    /// Queue `payload` for `to`. Never blocks.
    fn send(&self, to: Rank, tag: Tag, payload: Payload) -> Result<(), TopologyError>;

    /// Next message from `from`, which must carry `tag`.
    fn recv(&self, from: Rank, tag: Tag) -> Result<Payload, TopologyError>;

    /// [`recv`](Self::recv) a buffer.
    fn recv_scalars(&self, from: Rank, tag: Tag) -> Result<Vec<Scalar>, TopologyError> {
        match self.recv(from, tag)? {
            Payload::Scalars(v) => Ok(v),
            other => Err(wrong_payload(self.rank(), from, tag, &other)),
        }
    }

    /// [`recv`](Self::recv) a count.
    fn recv_count(&self, from: Rank, tag: Tag) -> Result<u64, TopologyError> {
        match self.recv(from, tag)? {
            Payload::Count(n) => Ok(n),
            other => Err(wrong_payload(self.rank(), from, tag, &other)),
        }
    }
}

fn wrong_payload(rank: Rank, from: Rank, tag: Tag, got: &Payload) -> TopologyError {
    TopologyError::TagMismatch {
        rank,
        from,
        expected: tag.to_string(),
        actual: format!("{tag} carrying a {}", got.describe()),
    }
}

/// In-process transport over crossbeam channels, one unbounded FIFO per
/// ordered rank pair.
///
/// Receives block until the message arrives or the sending rank's
/// transport is dropped; [`with_timeout`](Self::with_timeout) bounds the
/// wait.
#[derive(Debug)]
pub struct ChannelTransport {
    rank: Rank,
    outbox: Vec<Sender<Message>>,
    inbox: Vec<Receiver<Message>>,
    timeout: Option<Duration>,
}

impl ChannelTransport {
    /// Fully connected transports for `size` ranks, in rank order.
    pub fn mesh(size: usize) -> Vec<ChannelTransport> {
        // channels[src][dst]
        let mut senders: Vec<Vec<Sender<Message>>> = Vec::with_capacity(size);
        let mut receivers: Vec<Vec<Option<Receiver<Message>>>> = Vec::with_capacity(size);
        for _ in 0..size {
            let (tx, rx): (Vec<_>, Vec<_>) = (0..size).map(|_| unbounded()).unzip();
            senders.push(tx);
            receivers.push(rx.into_iter().map(Some).collect());
        }
        senders
            .into_iter()
            .enumerate()
            .map(|(rank, outbox)| ChannelTransport {
                rank: Rank(rank),
                outbox,
                inbox: receivers
                    .iter_mut()
                    .filter_map(|from_src| from_src[rank].take())
                    .collect(),
                timeout: None,
            })
            .collect()
    }

    /// A transport for a lone rank, connected only to itself.
    pub fn solo() -> ChannelTransport {
        let (tx, rx) = unbounded();
        ChannelTransport {
            rank: Rank(0),
            outbox: vec![tx],
            inbox: vec![rx],
            timeout: None,
        }
    }

    /// Fail receives that wait longer than `timeout` with
    /// [`TopologyError::Timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Transport for ChannelTransport {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.outbox.len()
    }

    fn send(&self, to: Rank, tag: Tag, payload: Payload) -> Result<(), TopologyError> {
        let disconnected = || TopologyError::Disconnected {
            rank: self.rank,
            peer: to,
        };
        self.outbox
            .get(to.0)
            .ok_or_else(disconnected)?
            .send(Message { tag, payload })
            .map_err(|_| disconnected())
    }

    fn recv(&self, from: Rank, tag: Tag) -> Result<Payload, TopologyError> {
        let inbox = self.inbox.get(from.0).ok_or(TopologyError::Disconnected {
            rank: self.rank,
            peer: from,
        })?;
        let disconnected = TopologyError::Disconnected {
            rank: self.rank,
            peer: from,
        };
        let msg = match self.timeout {
            None => inbox.recv().map_err(|_| disconnected)?,
            Some(timeout) => inbox.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => TopologyError::Timeout {
                    rank: self.rank,
                    peer: from,
                    millis: timeout.as_millis() as u64,
                },
                RecvTimeoutError::Disconnected => disconnected,
            })?,
        };
        if msg.tag != tag {
            return Err(TopologyError::TagMismatch {
                rank: self.rank,
                from,
                expected: tag.to_string(),
                actual: msg.tag.to_string(),
            });
        }
        Ok(msg.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(side: Side) -> Tag {
        Tag::new(MessageKind::Guard, 0, side)
    }

    #[test]
    fn mesh_delivers_in_order() {
        let mesh = ChannelTransport::mesh(3);
        assert_eq!(mesh[2].rank(), Rank(2));
        assert_eq!(mesh[2].size(), 3);
        mesh[0].send(Rank(2), tag(Side::Lower), Payload::Count(1)).unwrap();
        mesh[0].send(Rank(2), tag(Side::Upper), Payload::Count(2)).unwrap();
        mesh[1].send(Rank(2), tag(Side::Lower), Payload::Count(3)).unwrap();
        assert_eq!(mesh[2].recv_count(Rank(1), tag(Side::Lower)).unwrap(), 3);
        assert_eq!(mesh[2].recv_count(Rank(0), tag(Side::Lower)).unwrap(), 1);
        assert_eq!(mesh[2].recv_count(Rank(0), tag(Side::Upper)).unwrap(), 2);
    }

    #[test]
    fn unexpected_tag_is_an_error() {
        let solo = ChannelTransport::solo();
        solo.send(Rank(0), tag(Side::Upper), Payload::Count(0)).unwrap();
        assert!(matches!(
            solo.recv(Rank(0), tag(Side::Lower)),
            Err(TopologyError::TagMismatch { .. })
        ));
    }

    #[test]
    fn wrong_payload_kind_is_an_error() {
        let solo = ChannelTransport::solo();
        solo.send(Rank(0), tag(Side::Lower), Payload::Count(4)).unwrap();
        assert!(solo.recv_scalars(Rank(0), tag(Side::Lower)).is_err());
    }

    #[test]
    fn silent_peer_times_out() {
        let mesh: Vec<_> = ChannelTransport::mesh(2)
            .into_iter()
            .map(|t| t.with_timeout(Duration::from_millis(10)))
            .collect();
        assert!(matches!(
            mesh[0].recv(Rank(1), tag(Side::Lower)),
            Err(TopologyError::Timeout { millis: 10, .. })
        ));
    }

    #[test]
    fn slow_peer_is_waited_for() {
        let mut mesh = ChannelTransport::mesh(2);
        let late = mesh.pop().unwrap();
        let eager = mesh.pop().unwrap();
        let got = std::thread::scope(|scope| {
            scope.spawn(|| {
                std::thread::sleep(Duration::from_millis(200));
                late.send(Rank(0), tag(Side::Upper), Payload::Count(7)).unwrap();
            });
            eager.recv_count(Rank(1), tag(Side::Upper))
        });
        assert_eq!(got, Ok(7));
    }

    #[test]
    fn dropped_peer_disconnects() {
        let mut mesh = ChannelTransport::mesh(2);
        let lone = mesh.remove(0);
        drop(mesh);
        assert!(matches!(
            lone.recv(Rank(1), tag(Side::Lower)),
            Err(TopologyError::Disconnected { .. })
        ));
    }
}
