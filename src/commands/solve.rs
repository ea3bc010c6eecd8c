//! Entry points for solving a batch of images.

use tracing::debug;
use crate::core::{SolveReport, SolveRequest, SolverConfig};
use crate::processing::FieldSolver;
use crate::utils::SolverResult;

/// Plate-solves every image of `request` and returns the renamed outputs.
///
/// Images whose job failed are simply absent from the result. The order of the
/// returned names follows the working directory listing, not the input order.
///
/// # Arguments
/// * `request` - Images plus optional ra/dec/radius/scale hints, suffix and WCS retention
/// * `config` - Executable, working directory, timeout and solver policy
///
/// # Example
/// ```no_run
/// # async fn run() -> field_solver::SolverResult<()> {
/// use field_solver::{SolveRequest, SolverConfig, solve_field};
///
/// let request = SolveRequest::batch(["m51_001.fits", "m51_002.fits"])
///     .ra("13:29:52.7")
///     .dec("+47:11:43")
///     .radius(0.35)
///     .scale(0.6, 0.65)
///     .build()?;
/// let solved = solve_field(&request, SolverConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn solve_field(request: &SolveRequest, config: SolverConfig) -> SolverResult<Vec<String>> {
    solve_field_report(request, config)
        .await
        .map(|report| report.outputs)
}

/// Like [`solve_field`] but also returns failed images and per-job outcomes.
pub async fn solve_field_report(request: &SolveRequest, config: SolverConfig) -> SolverResult<SolveReport> {
    debug!("Received solve request for {} images", request.images().len());
    let solver = FieldSolver::new(config)?;
    solver.solve(request).await
}
