//! One thread per rank.

use std::any::Any;
use std::thread;

use yee_core::{Rank, TopologyError};
use yee_exec::ExecPolicy;

use crate::comm::DomainComm;
use crate::transport::Transport;

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Run `f` once per communicator, each on its own named thread
/// (`yee-rank-{rank}`), and collect the results in rank order.
///
/// The thread owns its communicator for the whole run. A rank that panics
/// drops its transport, so peers blocked on it fail with
/// [`TopologyError::Disconnected`] instead of hanging.
///
/// # Errors
///
/// [`TopologyError::ThreadSpawnFailed`] or the first (lowest-rank)
/// [`TopologyError::RankPanicked`].
pub fn run_cluster<P, T, F, R>(comms: Vec<DomainComm<P, T>>, f: F) -> Result<Vec<R>, TopologyError>
where
    P: ExecPolicy,
    T: Transport,
    F: Fn(DomainComm<P, T>) -> R + Sync,
    R: Send,
{
    let f = &f;
    thread::scope(|s| {
        let mut handles = Vec::with_capacity(comms.len());
        for comm in comms {
            let rank = comm.rank();
            let handle = thread::Builder::new()
                .name(format!("yee-rank-{rank}"))
                .spawn_scoped(s, move || f(comm))
                .map_err(|e| TopologyError::ThreadSpawnFailed {
                    rank,
                    reason: e.to_string(),
                })?;
            handles.push((rank, handle));
        }
        let mut results = Vec::with_capacity(handles.len());
        let mut first_panic: Option<TopologyError> = None;
        for (rank, handle) in handles {
            match handle.join() {
                Ok(r) => results.push(r),
                Err(payload) => {
                    let err = TopologyError::RankPanicked {
                        rank,
                        message: panic_message(payload.as_ref()),
                    };
                    tracing::error!(%rank, "{err}");
                    first_panic.get_or_insert(err);
                }
            }
        }
        match first_panic {
            Some(err) => Err(err),
            None => Ok(results),
        }
    })
}

/// Rank of the calling thread, parsed from its `yee-rank-{rank}` name.
pub fn current_rank() -> Option<Rank> {
    thread::current()
        .name()?
        .strip_prefix("yee-rank-")?
        .parse()
        .ok()
        .map(Rank)
}
