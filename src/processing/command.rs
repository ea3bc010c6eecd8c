//! Builds the solve-field argument list shared by every work group.

use crate::core::{SolveRequest, SolverPolicy};

/// Outputs solve-field writes by default that a batch never wants.
const SUPPRESSED_OUTPUTS: [&str; 5] = ["--match", "--rdls", "--corr", "--index-xyls", "--solved"];

/// Immutable argument prefix: policy flags followed by the request's hints.
///
/// Each work group clones the tokens and appends its own image names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    program: String,
    args: Vec<String>,
}

impl CommandTemplate {
    pub fn build(program: impl Into<String>, policy: &SolverPolicy, request: &SolveRequest) -> Self {
        let mut args = policy_args(policy);

        if let Some(ra) = request.ra() {
            args.push("--ra".to_string());
            args.push(ra.to_string());
        }
        if let Some(dec) = request.dec() {
            args.push("--dec".to_string());
            args.push(dec.to_string());
        }
        if let Some(radius) = request.radius() {
            args.push("--radius".to_string());
            args.push(radius.to_string());
        }
        if let Some(scale) = request.scale() {
            args.extend([
                "--scale-low".to_string(),
                scale.low.to_string(),
                "--scale-high".to_string(),
                scale.high.to_string(),
                "--scale-unit".to_string(),
                "arcsecperpix".to_string(),
            ]);
        }

        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Full argument list for one group of images.
    pub fn with_images(&self, images: &[String]) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + images.len());
        args.extend_from_slice(&self.args);
        args.extend_from_slice(images);
        args
    }
}

fn policy_args(policy: &SolverPolicy) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    let mut flag = |f: &str| args.push(f.to_string());

    if policy.no_plots {
        flag("-p");
    }
    if policy.overwrite {
        flag("-O");
    }
    if !policy.verify {
        flag("--no-verify");
    }
    if !policy.remove_lines {
        flag("--no-remove-lines");
    }
    flag("--depth");
    flag(policy.depth.as_str());
    if policy.resort {
        flag("--resort");
    }
    if let Some(factor) = policy.downsample {
        flag("--downsample");
        flag(factor.to_string().as_str());
    }
    for output in SUPPRESSED_OUTPUTS {
        flag(output);
        flag("none");
    }
    if policy.temp_axy {
        flag("--temp-axy");
    }
    args
}
