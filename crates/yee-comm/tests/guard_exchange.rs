//! Integration test: guard exchange across multi-rank decompositions.

use yee_comm::{guard, run_cluster, BoundaryKind, Boundaries, MessageKind, Payload, Tag, Transport};
use yee_core::{Rank, Scalar, Side, TopologyError};
use yee_exec::{ExecRayon, ExecSerial};
use yee_field::{ScalarField, VectorField};
use yee_grid::{CellRange, FieldType, Index};
use yee_test_utils::{decomposition, fill_random};

// ── Two-rank chain ───────────────────────────────────────────────────

#[test]
fn two_rank_chain_guards_hold_neighbour_value() {
    let decomp = decomposition(&[16], 1, &[2], Boundaries::periodic());
    let comms = decomp.communicators(ExecSerial).unwrap();
    let out = run_cluster(comms, |mut comm| {
        let grid = comm.grid().clone();
        let mut f = ScalarField::new(grid.clone(), FieldType::CellCentered, comm.policy()).unwrap();
        let rank = comm.rank().0 as Scalar;
        for idx in grid.interior_range() {
            f.component_mut(0).set(idx, rank);
        }
        comm.exchange_guards(&mut f).unwrap();
        let v = f.component(0);
        assert_eq!(v.len(), 10);
        (v.get(Index::new(0, 0, 0)), v.get(Index::new(9, 0, 0)))
    })
    .unwrap();
    // Rank 0: left guard wraps to rank 1, right guard is rank 1.
    assert_eq!(out[0], (1.0, 1.0));
    // Rank 1: left guard is rank 0, right guard wraps to rank 0.
    assert_eq!(out[1], (0.0, 0.0));
}

// ── Periodic 2D torus ───────────────────────────────────────────────

fn global_value(gx: i64, gy: i64, n: i64) -> Scalar {
    let wrap = |g: i64| g.rem_euclid(n);
    (wrap(gx) + 100 * wrap(gy)) as Scalar
}

#[test]
fn torus_guards_including_corners_match_wrapped_global_field() {
    let n = 8i64;
    let decomp = decomposition(&[8, 8], 2, &[2, 2], Boundaries::periodic());
    let comms = decomp.communicators(ExecRayon::new()).unwrap();
    let mismatches = run_cluster(comms, move |mut comm| {
        let grid = comm.grid().clone();
        let mut f = ScalarField::new(grid.clone(), FieldType::CellCentered, comm.policy()).unwrap();
        let global = |idx: Index| {
            let gx = idx.get(0) as i64 - 2 + grid.offset(0) as i64;
            let gy = idx.get(1) as i64 - 2 + grid.offset(1) as i64;
            global_value(gx, gy, n)
        };
        for idx in grid.interior_range() {
            f.component_mut(0).set(idx, global(idx));
        }
        comm.exchange_guards(&mut f).unwrap();
        grid.full_range()
            .iter()
            .filter(|&idx| f.component(0).get(idx) != global(idx))
            .count()
    })
    .unwrap();
    assert_eq!(mismatches, vec![0; 4]);
}

#[test]
fn second_exchange_changes_nothing() {
    let decomp = decomposition(&[8, 4], 1, &[2, 1], Boundaries::periodic());
    let comms = decomp.communicators(ExecSerial).unwrap();
    run_cluster(comms, |mut comm| {
        let grid = comm.grid().clone();
        let mut e = VectorField::new(grid, FieldType::EdgeCentered, comm.policy()).unwrap();
        fill_random(&mut e, 11 + comm.rank().0 as u64, 1.0);
        comm.exchange_guards(&mut e).unwrap();
        let once = e.clone();
        comm.exchange_guards(&mut e).unwrap();
        assert_eq!(e, once);
    })
    .unwrap();
}

// ── Pack / unpack fidelity ──────────────────────────────────────────

#[derive(Debug)]
struct Slabs {
    sent: [Vec<Scalar>; 2],
    received: [Vec<Scalar>; 2],
}

fn slab_round_trip(kind: FieldType) {
    let decomp = decomposition(&[8, 6], 2, &[2, 1], Boundaries::periodic());
    let comms = decomp.communicators(ExecSerial).unwrap();
    let slabs = run_cluster(comms, move |mut comm| {
        let grid = comm.grid().clone();
        let mut f = VectorField::new(grid.clone(), kind, comm.policy()).unwrap();
        fill_random(&mut f, 1000 + comm.rank().0 as u64, 3.0);
        let collect = |f: &VectorField, range: CellRange| {
            let mut out = Vec::new();
            for c in 0..3 {
                guard::pack(f.component(c), range, &mut out);
            }
            out
        };
        // Only y-interior rows: y guards are rewritten by the later y pass.
        let rows = |r: CellRange| r.with_axis(1, grid.guard(1), grid.guard(1) + grid.reso(1));
        let sent = Side::BOTH.map(|s| collect(&f, rows(guard::send_range(&grid, 0, s))));
        comm.exchange_guards(&mut f).unwrap();
        let received = Side::BOTH.map(|s| collect(&f, rows(guard::recv_range(&grid, 0, s))));
        Slabs { sent, received }
    })
    .unwrap();
    // Rank 0's upper guard holds rank 1's lower interior slab, bit for bit.
    let bits = |v: &[Scalar]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&slabs[0].received[1]), bits(&slabs[1].sent[0]));
    assert_eq!(bits(&slabs[1].received[0]), bits(&slabs[0].sent[1]));
    assert_eq!(bits(&slabs[0].received[0]), bits(&slabs[1].sent[1]));
    assert_eq!(bits(&slabs[1].received[1]), bits(&slabs[0].sent[0]));
}

#[test]
fn face_centred_slabs_round_trip() {
    slab_round_trip(FieldType::FaceCentered);
}

#[test]
fn edge_centred_slabs_round_trip() {
    slab_round_trip(FieldType::EdgeCentered);
}

// ── Failure detection ───────────────────────────────────────────────

#[test]
fn short_packet_is_reported_not_truncated() {
    let decomp = decomposition(&[8], 1, &[2], Boundaries::periodic());
    let comms = decomp.communicators(ExecSerial).unwrap();
    let out = run_cluster(comms, |mut comm| {
        if comm.rank() == Rank(1) {
            // A rogue peer sending three words where one is expected.
            for side in Side::BOTH {
                let tag = Tag::new(MessageKind::Guard, 0, side);
                comm.transport()
                    .send(Rank(0), tag, Payload::Scalars(vec![0.0; 3]))
                    .unwrap();
            }
            // Stay connected until rank 0's own slabs have arrived.
            for side in Side::BOTH {
                let tag = Tag::new(MessageKind::Guard, 0, side);
                comm.transport().recv(Rank(0), tag).unwrap();
            }
            return Ok(());
        }
        let grid = comm.grid().clone();
        let mut f = ScalarField::new(grid, FieldType::CellCentered, comm.policy()).unwrap();
        comm.exchange_guards(&mut f)
    })
    .unwrap();
    match &out[0] {
        Err(TopologyError::PacketSizeMismatch {
            rank,
            from,
            expected,
            actual,
            ..
        }) => {
            assert_eq!((*rank, *from, *expected, *actual), (Rank(0), Rank(1), 1, 3));
        }
        other => panic!("expected a size mismatch, got {other:?}"),
    }
}

// ── Global faces ────────────────────────────────────────────────────

#[test]
fn open_chain_applies_conductor_only_at_global_faces() {
    let boundaries = Boundaries::uniform(BoundaryKind::Conductor);
    let decomp = decomposition(&[8], 1, &[2], boundaries);
    let comms = decomp.communicators(ExecSerial).unwrap();
    let out = run_cluster(comms, |mut comm| {
        let grid = comm.grid().clone();
        let mut b = VectorField::new(grid, FieldType::FaceCentered, comm.policy()).unwrap();
        b.assign_all(1.0);
        comm.exchange_guards(&mut b).unwrap();
        // B_x sits on x faces (odd mirror), B_y is x-centred (even mirror).
        let bx = b.component(0).as_slice().to_vec();
        let by = b.component(1).as_slice().to_vec();
        (bx, by)
    })
    .unwrap();
    let (bx0, by0) = &out[0];
    let (bx1, by1) = &out[1];
    // Lower global face on rank 0.
    assert_eq!(bx0[1], 0.0);
    assert_eq!(bx0[0], -1.0);
    assert_eq!(by0[0], 1.0);
    // Internal face: plain copies.
    assert_eq!(bx0[5], 1.0);
    assert_eq!(bx1[0], 1.0);
    // Upper global face on rank 1: its face-plane sample is the guard cell.
    assert_eq!(bx1[5], 0.0);
    assert_eq!(by1[5], 1.0);
}
