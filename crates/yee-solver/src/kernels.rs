//! Per-cell update kernels over the interior of a subdomain.
//!
//! Every kernel reads only fields other than the one it writes (or the
//! written cell's own old value), so cells can be updated in any order.

use yee_core::{Scalar, AXES};
use yee_exec::ExecPolicy;
use yee_field::VectorField;

use crate::pml::{coefficients, PmlProfile};
use crate::stencil::{cyclic, Stencil};

/// `target += sign * h * curl(source) - h * current`.
pub(crate) fn curl_step<P: ExecPolicy>(
    policy: &P,
    stencil: &Stencil,
    target: &mut VectorField,
    source: &VectorField,
    current: Option<&VectorField>,
    h: Scalar,
    sign: Scalar,
) {
    let range = target.grid().interior_range();
    let src = source.slices();
    let st = source.staggers();
    let cur = current.map(VectorField::slices);
    for c in 0..AXES {
        let jc = cur.map(|cur| cur[c]);
        policy.update_cells(target.component_mut(c), range, |_, n, old| {
            let drive = jc.map_or(0.0, |cur| h * cur[n]);
            old + sign * h * stencil.curl(src, st, c, n) - drive
        });
    }
}

/// `out = scale * curl(source)`.
pub(crate) fn curl_into<P: ExecPolicy>(
    policy: &P,
    stencil: &Stencil,
    out: &mut VectorField,
    source: &VectorField,
    scale: Scalar,
) {
    let range = out.grid().interior_range();
    let src = source.slices();
    let st = source.staggers();
    for c in 0..AXES {
        policy.update_cells(out.component_mut(c), range, |_, n, _| {
            scale * stencil.curl(src, st, c, n)
        });
    }
}

/// `target -= v + weight * curl(curl_v)`, with `curl_v` the curl of `v`
/// and its guards filled.
pub(crate) fn subtract_shifted_curl_curl<P: ExecPolicy>(
    policy: &P,
    stencil: &Stencil,
    target: &mut VectorField,
    v: &VectorField,
    curl_v: &VectorField,
    weight: Scalar,
) {
    let range = target.grid().interior_range();
    let vs = v.slices();
    let src = curl_v.slices();
    let st = curl_v.staggers();
    for c in 0..AXES {
        let vc = vs[c];
        policy.update_cells(target.component_mut(c), range, |_, n, old| {
            old - vc[n] - weight * stencil.curl(src, st, c, n)
        });
    }
}

/// `target = a * target + b * source` over the interior. `a = 0` ignores
/// the old contents.
pub(crate) fn combine<P: ExecPolicy>(
    policy: &P,
    target: &mut VectorField,
    source: &VectorField,
    a: Scalar,
    b: Scalar,
) {
    let range = target.grid().interior_range();
    let src = source.slices();
    for c in 0..AXES {
        let sc = src[c];
        policy.update_cells(target.component_mut(c), range, |_, n, old| {
            if a == 0.0 {
                b * sc[n]
            } else {
                a * old + b * sc[n]
            }
        });
    }
}

/// [`curl_step`] with split-field damping inside the absorbing layers.
///
/// In a damped cell of component `c` with `(j, k)` its curl axes:
///
/// ```text
/// s2 ← target - s1
/// s1 ← a_j s1 + sign b_j ∂_j F_k
/// s2 ← a_k s2 - sign b_k ∂_k F_j
/// target ← s1 + s2 - h current
/// ```
///
/// Cells outside the layers get the plain update and leave `s1`, `s2`
/// untouched.
#[allow(clippy::too_many_arguments)]
pub(crate) fn pml_curl_step<P: ExecPolicy>(
    policy: &P,
    stencil: &Stencil,
    profile: &PmlProfile,
    target: &mut VectorField,
    source: &VectorField,
    current: Option<&VectorField>,
    split: (&mut VectorField, &mut VectorField),
    h: Scalar,
    sign: Scalar,
) {
    let (s1, s2) = split;
    let range = target.grid().interior_range();
    let src = source.slices();
    let st = source.staggers();
    let cur = current.map(VectorField::slices);

    for c in 0..AXES {
        let (j, k) = cyclic(c);
        let ts = target.stagger(c);
        let jc = cur.map(|cur| cur[c]);

        {
            let t = target.component(c).as_slice();
            let first = s1.component(c).as_slice();
            policy.update_cells(s2.component_mut(c), range, |idx, n, old| {
                if profile.damped(idx, ts, j, k) {
                    t[n] - first[n]
                } else {
                    old
                }
            });
        }
        policy.update_cells(s1.component_mut(c), range, |idx, n, old| {
            if !profile.damped(idx, ts, j, k) {
                return old;
            }
            let (a, b) = coefficients(profile.sigma(idx, ts, j), h);
            a * old + sign * b * stencil.diff(src[k], st[k], j, n)
        });
        policy.update_cells(s2.component_mut(c), range, |idx, n, old| {
            if !profile.damped(idx, ts, j, k) {
                return old;
            }
            let (a, b) = coefficients(profile.sigma(idx, ts, k), h);
            a * old - sign * b * stencil.diff(src[j], st[j], k, n)
        });

        let first = s1.component(c).as_slice();
        let second = s2.component(c).as_slice();
        policy.update_cells(target.component_mut(c), range, |idx, n, old| {
            let drive = jc.map_or(0.0, |cur| h * cur[n]);
            if profile.damped(idx, ts, j, k) {
                first[n] + second[n] - drive
            } else {
                old + sign * h * stencil.curl(src, st, c, n) - drive
            }
        });
    }
}
