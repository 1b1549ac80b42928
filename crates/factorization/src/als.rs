//! Alternating least squares for implicit feedback.
//!
//! ## Algorithm
//! Each stored weight `w_ui` becomes a preference `p_ui = 1` with confidence
//! `c_ui = 1 + alpha * w_ui`; every unobserved cell has `p = 0, c = 1`.
//! One round then:
//! 1. Fixes item factors `Y` and, for every user, solves
//!    `(YᵀY + Σ_i (c_ui - 1) y_i y_iᵀ + λI) x_u = Σ_i c_ui y_i`
//! 2. Fixes the new user factors and solves the mirrored system per item
//!
//! `YᵀY` is shared by every solve in a half-step, so each solve only touches
//! the entity's own non-zeros. Solves within a half-step are independent and
//! run on the rayon pool; the half-steps themselves are sequential.

use crate::config::AlsConfig;
use crate::error::{FactorizationError, Result};
use crate::model::FactorizationModel;
use interactions::InteractionMatrix;
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, instrument, Level};

/// Scale applied to uniform `[0, 1)` initial factors
const INIT_SCALE: f32 = 0.01;

/// Train a model on a user × item interaction matrix.
#[instrument(skip(matrix, config), fields(users = matrix.num_rows(), items = matrix.num_cols(), nnz = matrix.nnz()))]
pub fn train(matrix: &InteractionMatrix, config: &AlsConfig) -> Result<FactorizationModel> {
    config.validate()?;
    let start = Instant::now();

    let item_user = matrix.transpose();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut user_factors = random_factors(&mut rng, matrix.num_rows(), config.factors);
    let mut item_factors = random_factors(&mut rng, matrix.num_cols(), config.factors);

    for iteration in 0..config.iterations {
        user_factors = solve_side(matrix, &item_factors, config, "user")?;
        item_factors = solve_side(&item_user, &user_factors, config, "item")?;

        if tracing::enabled!(Level::DEBUG) {
            let loss = loss(matrix, &user_factors, &item_factors, config);
            debug!("ALS iteration {}/{}: loss = {:.6}", iteration + 1, config.iterations, loss);
        }
    }

    info!(
        "Trained ALS model ({} factors, {} iterations) in {:.2?}",
        config.factors,
        config.iterations,
        start.elapsed()
    );
    Ok(FactorizationModel::from_factors(user_factors, item_factors))
}

fn random_factors(rng: &mut StdRng, rows: usize, factors: usize) -> DMatrix<f32> {
    // Filled row by row so the draw order does not depend on storage layout
    let values: Vec<f32> = (0..rows * factors)
        .map(|_| rng.random::<f32>() * INIT_SCALE)
        .collect();
    DMatrix::from_row_slice(rows, factors, &values)
}

/// Recompute every row's factors of one side against the fixed `other` side.
///
/// `matrix` has one row per entity being solved for and one column per row
/// of `other`.
fn solve_side(
    matrix: &InteractionMatrix,
    other: &DMatrix<f32>,
    config: &AlsConfig,
    side: &'static str,
) -> Result<DMatrix<f32>> {
    let factors = other.ncols();
    let gram = other.transpose() * other;

    let solved: Vec<DVector<f32>> = (0..matrix.num_rows())
        .into_par_iter()
        .map(|index| solve_one(matrix, other, &gram, config, index).ok_or(FactorizationError::Solver { side, index }))
        .collect::<Result<Vec<_>>>()?;

    Ok(DMatrix::from_fn(matrix.num_rows(), factors, |row, col| solved[row][col]))
}

/// Solve the regularized weighted least-squares system for one entity.
fn solve_one(
    matrix: &InteractionMatrix,
    other: &DMatrix<f32>,
    gram: &DMatrix<f32>,
    config: &AlsConfig,
    index: usize,
) -> Option<DVector<f32>> {
    let factors = other.ncols();
    let row = matrix.row(index)?;
    if row.is_empty() {
        return Some(DVector::zeros(factors));
    }

    let mut a = gram.clone();
    let mut b = DVector::<f32>::zeros(factors);

    for (col, weight) in row.iter() {
        let y: DVector<f32> = other.row(col).transpose();
        let confidence = 1.0 + config.alpha * weight;
        a.ger(confidence - 1.0, &y, &y, 1.0);
        b.axpy(confidence, &y, 1.0);
    }
    for d in 0..factors {
        a[(d, d)] += config.regularization;
    }

    a.cholesky().map(|cholesky| cholesky.solve(&b))
}

/// Weighted squared error plus L2 penalty over the full matrix.
///
/// Unobserved cells contribute `s²`; rather than visiting them, the sum of
/// `s²` over every cell of a user row is taken as `x_uᵀ (YᵀY) x_u` and the
/// observed cells are corrected afterwards.
pub fn loss(
    matrix: &InteractionMatrix,
    user_factors: &DMatrix<f32>,
    item_factors: &DMatrix<f32>,
    config: &AlsConfig,
) -> f32 {
    let gram = item_factors.transpose() * item_factors;
    let mut total = 0.0f32;

    for user in 0..matrix.num_rows() {
        let x: DVector<f32> = user_factors.row(user).transpose();
        total += x.dot(&(&gram * &x));

        if let Some(row) = matrix.row(user) {
            for (item, weight) in row.iter() {
                let score = user_factors.row(user).dot(&item_factors.row(item));
                let confidence = 1.0 + config.alpha * weight;
                total += confidence * (1.0 - score).powi(2) - score * score;
            }
        }
    }

    total + config.regularization * (user_factors.norm_squared() + item_factors.norm_squared())
}
