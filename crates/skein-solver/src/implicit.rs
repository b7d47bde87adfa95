//! Backward-Euler velocity solve with a filtered conjugate gradient.
//!
//! Solves `(M − h·dF/dv − h²·dF/dx)·Δv = h·(F + h·dF/dx·v₀)` for `Δv`
//! following Baraff & Witkin, "Large Steps in Cloth Simulation". The
//! per-vertex constraint filters are applied to residuals and search
//! directions every iteration, and the iteration starts from the
//! constraint targets, so constrained components of `Δv` stay exactly
//! at their prescribed values.

use skein_math::sparse::apply_block_diagonal;
use skein_math::vector::{add_scaled, all_finite, dot, norm_squared, scale_add, sub};

use crate::constraints::filter_in_place;
use crate::result::{SolverStatus, SubstepResult};
use crate::state::ImplicitSolverState;

/// Solves for new velocities: `v_new = v + Δv`.
///
/// Stops when the preconditioned residual drops below
/// `tolerance²·‖b‖²` or after `max_iterations`. A non-finite value in
/// the iteration aborts the solve with [`SolverStatus::NUMERICAL_ISSUE`]
/// and falls back to `Δv = z`.
pub fn solve_velocities(
    state: &mut ImplicitSolverState,
    dt: f32,
    max_iterations: u32,
    tolerance: f32,
) -> SubstepResult {
    if state.vertex_count() == 0 {
        return SubstepResult {
            status: SolverStatus::SUCCESS,
            iterations: 0,
            error: 0.0,
        };
    }

    // b = h·(F + h·dF/dx·v)
    state
        .dfdx
        .mul_vec(&state.pattern, &state.v, &mut state.scratch.tmp);
    for ((b, f), dfdx_v) in state
        .scratch
        .b
        .iter_mut()
        .zip(&state.f)
        .zip(&state.scratch.tmp)
    {
        *b = (*f + *dfdx_v * dt) * dt;
    }

    // A = M − h·dF/dv − h²·dF/dx
    state
        .a
        .assign_mass_combination(&state.mass, -dt, &state.dfdv, -dt * dt, &state.dfdx);

    let result = filtered_cg(state, max_iterations, tolerance);

    for ((v_new, v), dv) in state
        .v_new
        .iter_mut()
        .zip(&state.v)
        .zip(&state.scratch.dv)
    {
        *v_new = *v + *dv;
    }

    result
}

/// Projected, block-Jacobi preconditioned conjugate gradient on `A·Δv = b`.
fn filtered_cg(state: &mut ImplicitSolverState, max_iterations: u32, tolerance: f32) -> SubstepResult {
    let ImplicitSolverState {
        pattern,
        a,
        constraints,
        scratch,
        ..
    } = state;

    // Δv starts at the constraint targets z.
    for (dv, c) in scratch.dv.iter_mut().zip(constraints.iter()) {
        *dv = c.target();
    }

    // ‖filter(b)‖² sets the convergence target.
    scratch.tmp.copy_from_slice(&scratch.b);
    filter_in_place(constraints, &mut scratch.tmp);
    let b_norm2 = norm_squared(&scratch.tmp);
    let tol = f64::from(tolerance);
    let delta_target = tol * tol * b_norm2;

    // r = filter(b − A·Δv)
    a.mul_vec(pattern, &scratch.dv, &mut scratch.tmp);
    sub(&scratch.b, &scratch.tmp, &mut scratch.r);
    filter_in_place(constraints, &mut scratch.r);

    // c = filter(P⁻¹·r)
    a.block_jacobi_inverse(&mut scratch.precond);
    apply_block_diagonal(&scratch.precond, &scratch.r, &mut scratch.c);
    filter_in_place(constraints, &mut scratch.c);

    let mut delta_new = dot(&scratch.r, &scratch.c);
    let mut iterations = 0u32;
    let mut numerical_issue = !delta_new.is_finite();

    while !numerical_issue && delta_new > delta_target && iterations < max_iterations {
        // q = filter(A·c)
        a.mul_vec(pattern, &scratch.c, &mut scratch.q);
        filter_in_place(constraints, &mut scratch.q);

        let alpha = (delta_new / dot(&scratch.c, &scratch.q)) as f32;
        if !alpha.is_finite() {
            numerical_issue = true;
            break;
        }

        add_scaled(&mut scratch.dv, alpha, &scratch.c);
        add_scaled(&mut scratch.r, -alpha, &scratch.q);

        // s = P⁻¹·r
        apply_block_diagonal(&scratch.precond, &scratch.r, &mut scratch.s);
        let delta_old = delta_new;
        delta_new = dot(&scratch.r, &scratch.s);

        // c = filter(s + β·c)
        scale_add(&mut scratch.c, &scratch.s, (delta_new / delta_old) as f32);
        filter_in_place(constraints, &mut scratch.c);

        iterations += 1;
        numerical_issue = !delta_new.is_finite();
    }

    if numerical_issue || !all_finite(&scratch.dv) {
        for (dv, c) in scratch.dv.iter_mut().zip(constraints.iter()) {
            *dv = c.target();
        }
        return SubstepResult {
            status: SolverStatus::NUMERICAL_ISSUE,
            iterations,
            error: 0.0,
        };
    }

    let status = if delta_new > delta_target {
        SolverStatus::NO_CONVERGENCE
    } else {
        SolverStatus::SUCCESS
    };
    let error = if b_norm2 > 0.0 {
        (delta_new / b_norm2).sqrt() as f32
    } else {
        0.0
    };

    SubstepResult {
        status,
        iterations,
        error,
    }
}

/// Integrates positions with the new velocities: `x_new = x + h·v_new`.
pub fn solve_positions(state: &mut ImplicitSolverState, dt: f32) {
    for ((x_new, x), v_new) in state.x_new.iter_mut().zip(&state.x).zip(&state.v_new) {
        *x_new = *x + *v_new * dt;
    }
}
