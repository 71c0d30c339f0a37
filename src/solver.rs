//! External solver contract.
//!
//! The gallery never solves anything itself. A [`Solver`] takes an example
//! script plus [`SolveOptions`] and reports a [`SolveOutcome`]:
//!
//! - [`SolveOutcome::Solved`]: the solver wrote its results under the options'
//!   output trunk; the [`Problem`] says whether it was time-dependent, which
//!   decides the result file name (see [`crate::naming::result_file_for`]).
//! - [`SolveOutcome::Failed`]: the example is broken. Recoverable: the image
//!   stage reports it and moves on.
//! - [`SolveOutcome::Cancelled`]: the user interrupted the solver. The image
//!   stage aborts the whole run.
//!
//! The production implementation is [`CommandSolver`], which runs a configured
//! command line and reconstructs the problem descriptor from the files it
//! wrote.

use crate::config::SolverConfig;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Options handed to the solver for every example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOptions {
    /// Results are written to `<trunk>.<format>` (or `<trunk>.<step>.<format>`).
    pub output_filename_trunk: PathBuf,
    pub output_format: String,
    pub save_ebc: bool,
    pub save_regions: bool,
    pub save_field_meshes: bool,
    pub save_regions_as_groups: bool,
    pub solve_not: bool,
}

impl SolveOptions {
    /// Gallery defaults: neutral output format, no diagnostic side outputs.
    pub fn gallery(trunk: PathBuf, output_format: &str) -> Self {
        Self {
            output_filename_trunk: trunk,
            output_format: output_format.to_string(),
            save_ebc: false,
            save_regions: false,
            save_field_meshes: false,
            save_regions_as_groups: false,
            solve_not: false,
        }
    }

    /// Command-line switches for the flags that are set.
    fn switches(&self) -> Vec<&'static str> {
        [
            (self.save_ebc, "--save-ebc"),
            (self.save_regions, "--save-regions"),
            (self.save_field_meshes, "--save-field-meshes"),
            (self.save_regions_as_groups, "--save-regions-as-groups"),
            (self.solve_not, "--solve-not"),
        ]
        .into_iter()
        .filter_map(|(on, flag)| on.then_some(flag))
        .collect()
    }
}

/// Time-stepping state of a solved problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeStepping {
    /// Final step the solver wrote.
    pub step: usize,
    /// Zero-padding width of step suffixes.
    pub n_digit: usize,
}

impl TimeStepping {
    /// The step suffix, e.g. `07` for step 7 with two digits.
    pub fn suffix(&self) -> String {
        format!("{:0width$}", self.step, width = self.n_digit)
    }
}

/// What the gallery needs to know about a solved problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    /// `None` for stationary problems.
    pub time_stepping: Option<TimeStepping>,
}

/// Result of one solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Solved(Problem),
    Failed(String),
    Cancelled,
}

/// Trait for solver backends.
pub trait Solver {
    fn solve(&self, example: &Path, options: &SolveOptions) -> SolveOutcome;
}

/// Exit status used by shells for processes killed by SIGINT.
const SIGINT_EXIT_CODE: i32 = 130;

/// Solver backend running an external command.
pub struct CommandSolver {
    program: String,
    args: Vec<String>,
}

impl CommandSolver {
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    /// Arguments for one run, placeholders substituted, switches appended.
    pub fn command_args(&self, example: &Path, options: &SolveOptions) -> Vec<String> {
        let trunk = &options.output_filename_trunk;
        let output_dir = trunk.parent().unwrap_or(Path::new("."));
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                arg.replace("{example}", &example.to_string_lossy())
                    .replace("{trunk}", &trunk.to_string_lossy())
                    .replace("{format}", &options.output_format)
                    .replace("{output_dir}", &output_dir.to_string_lossy())
            })
            .collect();
        args.extend(options.switches().into_iter().map(String::from));
        args
    }
}

impl Solver for CommandSolver {
    fn solve(&self, example: &Path, options: &SolveOptions) -> SolveOutcome {
        let output = match Command::new(&self.program)
            .args(self.command_args(example, options))
            .output()
        {
            Ok(output) => output,
            Err(e) => return SolveOutcome::Failed(format!("cannot run {}: {e}", self.program)),
        };

        if was_interrupted(&output.status) {
            return SolveOutcome::Cancelled;
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty());
            return SolveOutcome::Failed(match last_line {
                Some(line) => format!("{}: {}", output.status, line.trim()),
                None => output.status.to_string(),
            });
        }

        match detect_problem(&options.output_filename_trunk, &options.output_format) {
            Ok(Some(problem)) => SolveOutcome::Solved(problem),
            Ok(None) => SolveOutcome::Failed(format!(
                "no {} output written for trunk {}",
                options.output_format,
                options.output_filename_trunk.display()
            )),
            Err(e) => SolveOutcome::Failed(format!("cannot read solver output: {e}")),
        }
    }
}

#[cfg(unix)]
fn was_interrupted(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal() == Some(2) || status.code() == Some(SIGINT_EXIT_CODE)
}

#[cfg(not(unix))]
fn was_interrupted(status: &ExitStatus) -> bool {
    status.code() == Some(SIGINT_EXIT_CODE)
}

/// Reconstruct the problem descriptor from the files next to `trunk`.
///
/// `<trunk>.<format>` means a stationary problem. Otherwise the highest
/// `<trunk>.<digits>.<format>` is the final step and the digit count is the
/// padding width. Returns `Ok(None)` when neither exists.
pub fn detect_problem(trunk: &Path, format: &str) -> std::io::Result<Option<Problem>> {
    let Some(stem) = trunk.file_name().map(|s| s.to_string_lossy().into_owned()) else {
        return Ok(None);
    };
    let dir = trunk.parent().unwrap_or(Path::new("."));
    if !dir.is_dir() {
        return Ok(None);
    }

    let stationary = format!("{stem}.{format}");
    let prefix = format!("{stem}.");
    let suffix = format!(".{format}");
    let mut last: Option<TimeStepping> = None;

    for entry in std::fs::read_dir(dir)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if name == stationary {
            return Ok(Some(Problem {
                time_stepping: None,
            }));
        }
        let Some(digits) = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(&suffix))
        else {
            continue;
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let Ok(step) = digits.parse::<usize>() else {
            continue;
        };
        if last.is_none_or(|ts| step > ts.step) {
            last = Some(TimeStepping {
                step,
                n_digit: digits.len(),
            });
        }
    }

    Ok(last.map(|ts| Problem {
        time_stepping: Some(ts),
    }))
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Mock solver: scripted outcomes per example file name, records calls.
    ///
    /// A `Solved` outcome also writes the result file the problem implies,
    /// so tests can check the renderer receives an existing file.
    #[derive(Default)]
    pub struct MockSolver {
        pub outcomes: HashMap<String, SolveOutcome>,
        pub calls: Mutex<Vec<(PathBuf, SolveOptions)>>,
    }

    impl MockSolver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_outcome(mut self, file_name: &str, outcome: SolveOutcome) -> Self {
            self.outcomes.insert(file_name.to_string(), outcome);
            self
        }

        pub fn get_calls(&self) -> Vec<(PathBuf, SolveOptions)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Solver for MockSolver {
        fn solve(&self, example: &Path, options: &SolveOptions) -> SolveOutcome {
            self.calls
                .lock()
                .unwrap()
                .push((example.to_path_buf(), options.clone()));

            let name = example
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let outcome = self
                .outcomes
                .get(&name)
                .cloned()
                .unwrap_or(SolveOutcome::Solved(Problem {
                    time_stepping: None,
                }));

            if let SolveOutcome::Solved(problem) = &outcome {
                let file = crate::naming::result_file_for(
                    problem,
                    &options.output_filename_trunk,
                    &options.output_format,
                );
                fs::write(file, "# vtk DataFile Version 2.0\n").unwrap();
            }
            outcome
        }
    }

    fn options(tmp: &TempDir) -> SolveOptions {
        SolveOptions::gallery(tmp.path().join("result"), "vtk")
    }

    #[test]
    fn gallery_options_disable_side_outputs() {
        let opts = SolveOptions::gallery(PathBuf::from("/s/result"), "vtk");
        assert!(!opts.save_ebc);
        assert!(!opts.save_regions);
        assert!(!opts.save_field_meshes);
        assert!(!opts.save_regions_as_groups);
        assert!(!opts.solve_not);
        assert!(opts.switches().is_empty());
    }

    #[test]
    fn switches_follow_flags() {
        let mut opts = SolveOptions::gallery(PathBuf::from("/s/result"), "vtk");
        opts.save_regions = true;
        opts.solve_not = true;
        assert_eq!(opts.switches(), vec!["--save-regions", "--solve-not"]);
    }

    #[test]
    fn command_args_substitute_placeholders() {
        let solver = CommandSolver::new(&SolverConfig::default());
        let opts = SolveOptions::gallery(PathBuf::from("/scratch/result"), "vtk");
        let args = solver.command_args(Path::new("/ex/a/ex1.py"), &opts);
        assert_eq!(
            args,
            vec!["/ex/a/ex1.py", "-o", "/scratch/result", "--format", "vtk"]
        );
    }

    #[test]
    fn command_args_output_dir_placeholder() {
        let solver = CommandSolver::new(&SolverConfig {
            program: "solve".to_string(),
            args: vec!["--dir={output_dir}".to_string()],
            output_format: "h5".to_string(),
        });
        let opts = SolveOptions::gallery(PathBuf::from("/scratch/result"), "h5");
        assert_eq!(
            solver.command_args(Path::new("x.py"), &opts),
            vec!["--dir=/scratch"]
        );
    }

    #[test]
    fn time_stepping_suffix_is_zero_padded() {
        let ts = TimeStepping { step: 7, n_digit: 3 };
        assert_eq!(ts.suffix(), "007");
    }

    #[test]
    fn detect_stationary_problem() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("result.vtk"), "").unwrap();
        let problem = detect_problem(&options(&tmp).output_filename_trunk, "vtk").unwrap();
        assert_eq!(
            problem,
            Some(Problem {
                time_stepping: None
            })
        );
    }

    #[test]
    fn detect_time_stepping_picks_last_step() {
        let tmp = TempDir::new().unwrap();
        for step in ["00", "01", "10", "09"] {
            fs::write(tmp.path().join(format!("result.{step}.vtk")), "").unwrap();
        }
        fs::write(tmp.path().join("result.xx.vtk"), "").unwrap();
        let problem = detect_problem(&tmp.path().join("result"), "vtk").unwrap();
        assert_eq!(
            problem,
            Some(Problem {
                time_stepping: Some(TimeStepping {
                    step: 10,
                    n_digit: 2
                })
            })
        );
    }

    #[test]
    fn detect_nothing_written() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("result.h5"), "").unwrap();
        assert_eq!(detect_problem(&tmp.path().join("result"), "vtk").unwrap(), None);
    }

    #[test]
    fn missing_program_is_recoverable_failure() {
        let tmp = TempDir::new().unwrap();
        let solver = CommandSolver::new(&SolverConfig {
            program: "definitely-not-a-solver-binary".to_string(),
            ..SolverConfig::default()
        });
        let outcome = solver.solve(Path::new("ex.py"), &options(&tmp));
        assert!(matches!(outcome, SolveOutcome::Failed(_)));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_recoverable_failure() {
        let tmp = TempDir::new().unwrap();
        let solver = CommandSolver::new(&SolverConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "echo boom >&2; exit 3".to_string()],
            output_format: "vtk".to_string(),
        });
        match solver.solve(Path::new("ex.py"), &options(&tmp)) {
            SolveOutcome::Failed(reason) => assert!(reason.contains("boom")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn sigint_exit_is_cancellation() {
        let tmp = TempDir::new().unwrap();
        let solver = CommandSolver::new(&SolverConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "exit 130".to_string()],
            output_format: "vtk".to_string(),
        });
        assert_eq!(
            solver.solve(Path::new("ex.py"), &options(&tmp)),
            SolveOutcome::Cancelled
        );
    }

    #[cfg(unix)]
    #[test]
    fn successful_command_with_output_is_solved() {
        let tmp = TempDir::new().unwrap();
        let solver = CommandSolver::new(&SolverConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "touch {trunk}.{format}".to_string()],
            output_format: "vtk".to_string(),
        });
        assert_eq!(
            solver.solve(Path::new("ex.py"), &options(&tmp)),
            SolveOutcome::Solved(Problem {
                time_stepping: None
            })
        );
    }

    #[cfg(unix)]
    #[test]
    fn successful_command_without_output_is_failure() {
        let tmp = TempDir::new().unwrap();
        let solver = CommandSolver::new(&SolverConfig {
            program: "true".to_string(),
            args: vec![],
            output_format: "vtk".to_string(),
        });
        assert!(matches!(
            solver.solve(Path::new("ex.py"), &options(&tmp)),
            SolveOutcome::Failed(_)
        ));
    }
}
