//! Uniform split of a global grid over a Cartesian rank grid.

use std::sync::Arc;

use yee_core::{ConfigError, Rank, AXES};
use yee_exec::ExecPolicy;
use yee_grid::Grid;

use crate::boundary::Boundaries;
use crate::comm::DomainComm;
use crate::topology::Topology;
use crate::transport::ChannelTransport;

/// A global grid, a rank grid and the global boundary conditions.
///
/// Every rank receives an equal share of interior cells along each axis.
#[derive(Clone, Debug)]
pub struct Decomposition {
    global: Grid,
    rank_dims: [usize; AXES],
    boundaries: Boundaries,
}

impl Decomposition {
    /// Split `global` into `rank_dims` ranks along its active axes
    /// (missing trailing entries are 1).
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidDecomposition`] if an axis does not divide
    ///   evenly, a subdomain would be thinner than the guard width, or ranks
    ///   are requested along an inactive axis;
    /// - [`ConfigError::InvalidParameter`] if the boundaries are
    ///   inconsistent.
    pub fn new(global: Grid, rank_dims: &[usize], boundaries: Boundaries) -> Result<Self, ConfigError> {
        if rank_dims.len() > AXES {
            return Err(ConfigError::InvalidDecomposition {
                reason: format!("{} rank axes given", rank_dims.len()),
            });
        }
        let mut dims = [1usize; AXES];
        dims[..rank_dims.len()].copy_from_slice(rank_dims);
        boundaries.validate(global.dim())?;
        // Every subdomain has the same shape; checking the first suffices.
        global.subdomain([0; AXES], dims)?;
        Ok(Self {
            global,
            rank_dims: dims,
            boundaries,
        })
    }

    /// The undecomposed grid.
    pub fn global(&self) -> &Grid {
        &self.global
    }

    /// Ranks per axis.
    pub fn rank_dims(&self) -> [usize; AXES] {
        self.rank_dims
    }

    /// Global boundary conditions.
    pub fn boundaries(&self) -> Boundaries {
        self.boundaries
    }

    /// Total number of ranks.
    pub fn size(&self) -> usize {
        self.rank_dims.iter().product()
    }

    /// Geometry and topology of `rank`.
    pub fn subdomain(&self, rank: Rank) -> Result<(Arc<Grid>, Topology), ConfigError> {
        let topology = Topology::new(rank, self.rank_dims, self.boundaries.periodic_axes())?;
        let grid = self.global.subdomain(topology.coord(), self.rank_dims)?;
        Ok((Arc::new(grid), topology))
    }

    /// One ready communicator per rank, in rank order, connected by an
    /// in-process channel mesh.
    pub fn communicators<P: ExecPolicy>(
        &self,
        policy: P,
    ) -> Result<Vec<DomainComm<P, ChannelTransport>>, ConfigError> {
        ChannelTransport::mesh(self.size())
            .into_iter()
            .enumerate()
            .map(|(r, transport)| {
                let (grid, topology) = self.subdomain(Rank(r))?;
                DomainComm::new(policy.clone(), grid, topology, self.boundaries, transport)
            })
            .collect()
    }
}
