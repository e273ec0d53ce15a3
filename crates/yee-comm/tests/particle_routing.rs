//! Integration test: particle routing between subdomains.

use yee_comm::{run_cluster, BoundaryKind, Boundaries, ParticleStats};
use yee_core::{Rank, Scalar};
use yee_exec::ExecSerial;
use yee_test_utils::{decomposition, SeededUniform, TestParticle};

#[test]
fn corner_crossing_reaches_diagonal_rank() {
    // 2x2 ranks of 4x4 cells each.
    let decomp = decomposition(&[8, 8], 1, &[2, 2], Boundaries::periodic());
    let comms = decomp.communicators(ExecSerial).unwrap();
    let out = run_cluster(comms, |mut comm| {
        let mut particles = Vec::new();
        if comm.rank() == Rank(0) {
            particles.push(TestParticle::new([4, 4, 0], 1)); // up-right
            particles.push(TestParticle::new([-1, 2, 0], 2)); // left, wraps
            particles.push(TestParticle::new([1, 1, 0], 3)); // stays
        }
        let stats = comm.exchange_particles(&mut particles).unwrap();
        (particles, stats)
    })
    .unwrap();

    assert_eq!(out[0].0, vec![TestParticle::new([1, 1, 0], 3)]);
    assert_eq!(out[1].0, vec![TestParticle::new([3, 2, 0], 2)]);
    assert!(out[2].0.is_empty());
    assert_eq!(out[3].0, vec![TestParticle::new([0, 0, 0], 1)]);

    // Particle 1 hops twice: rank 0 -> 1 along x, rank 1 -> 3 along y.
    assert_eq!(out[0].1.sent, 2);
    assert_eq!(out[1].1, ParticleStats { sent: 1, received: 2, escaped: 0 });
    assert_eq!(out[3].1.received, 1);
}

#[test]
fn open_faces_count_escapes() {
    let boundaries = Boundaries::uniform(BoundaryKind::Outflow);
    let decomp = decomposition(&[8], 1, &[2], boundaries);
    let comms = decomp.communicators(ExecSerial).unwrap();
    let out = run_cluster(comms, |mut comm| {
        let mut particles = vec![
            TestParticle::new([-1, 0, 0], 10),
            TestParticle::new([4, 0, 0], 11),
        ];
        let stats = comm.exchange_particles(&mut particles).unwrap();
        (particles.len(), stats)
    })
    .unwrap();
    // Rank 0 loses its left mover, rank 1 its right mover; the inner
    // movers swap ranks.
    assert_eq!(out[0], (1, ParticleStats { sent: 1, received: 1, escaped: 1 }));
    assert_eq!(out[1], (1, ParticleStats { sent: 1, received: 1, escaped: 1 }));
}

#[test]
fn periodic_exchange_conserves_particles() {
    let decomp = decomposition(&[12, 8], 1, &[3, 2], Boundaries::periodic());
    let comms = decomp.communicators(ExecSerial).unwrap();
    let counts = run_cluster(comms, |mut comm| {
        let mut rng = SeededUniform::new(comm.rank().0 as u64);
        let reso = [comm.grid().reso(0) as i64, comm.grid().reso(1) as i64];
        let mut particles: Vec<TestParticle> = (0..50)
            .map(|i| {
                // Cells in [-1, reso]: one step beyond either face at most.
                let mut cell = |n: i64| ((rng.sample() + 1.0) * 0.5 * (n + 2) as Scalar) as i64 - 1;
                TestParticle::new([cell(reso[0]), cell(reso[1]), 0], i)
            })
            .collect();
        comm.exchange_particles(&mut particles).unwrap();
        for p in &particles {
            assert!((0..reso[0]).contains(&p.cell[0]), "{p:?}");
            assert!((0..reso[1]).contains(&p.cell[1]), "{p:?}");
        }
        particles.len()
    })
    .unwrap();
    assert_eq!(counts.iter().sum::<usize>(), 6 * 50);
}
