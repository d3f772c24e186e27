//! Driving the external solver.
//!
//! Each (scenario, board) unit is solved by one blocking run of the solver
//! binary, which writes its indexed artifacts into
//! `<results>/<preflop line>/<flop>_<turn>_<river>/`. Solver stdout is
//! forwarded to the logger line by line; progress chatter goes to `debug`.
//! When `solver.log_file` is set, every stdout line, chatter included, is
//! also appended there under a per-unit header.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::board::Board;
use crate::config::{PipelineConfig, SolverConfig};
use crate::dataset::files::has_artifacts;
use crate::dataset::Inputs;
use crate::error::{Error, Result};
use crate::scenario::{Scenario, ScenarioRecord, ScenarioResolver};

/// Stdout markers that are not worth an `info` line.
const NOISY_MARKERS: [&str; 2] = ["iteration", "Result and Action Saved"];

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long a killed run's stderr reader may take to drain the pipe.
const STDERR_GRACE: Duration = Duration::from_millis(500);

/// Whether a solver stdout line is progress noise.
pub fn is_noisy(line: &str) -> bool {
    NOISY_MARKERS.iter().any(|m| line.contains(m))
}

/// Everything one solver run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverRequest {
    /// Concatenated flop cards, `9c6d5d`.
    pub flop: String,
    pub turn: String,
    pub river: String,
    pub oop_range: String,
    pub ip_range: String,
    pub flop_bet_sizes: String,
    pub starting_pot: i64,
    pub effective_stack: i64,
    pub folder_path: PathBuf,
}

impl SolverRequest {
    /// Build the request for one unit.
    ///
    /// Range labels come from the scenario's row in the scenario list and are
    /// expanded to the combos played more often than `range_threshold`.
    pub fn build(
        scenario: &Scenario,
        record: &ScenarioRecord,
        board: &Board,
        inputs: &Inputs,
        range_threshold: f64,
        results_dir: &Path,
    ) -> Result<Self> {
        let range = |label: &Option<String>, side: &str| -> Result<String> {
            let label = label
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .ok_or_else(|| Error::lookup("scenario list", format!("{} {} range", record.line, side)))?;
            inputs.ranges.combos_above(label, range_threshold)
        };

        Ok(Self {
            flop: board.flop_str(),
            turn: board.turn.to_string(),
            river: board.river.to_string(),
            oop_range: range(&record.oop_range, "OOP")?,
            ip_range: range(&record.ip_range, "IP")?,
            flop_bet_sizes: inputs.bet_sizes.size_for(&board.texture)?.to_string(),
            starting_pot: scenario.pot,
            effective_stack: scenario.effective_stack,
            folder_path: results_dir
                .join(scenario.folder_name())
                .join(board.folder_name()),
        })
    }

    /// Solver arguments, in the order the solver documents them.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "--flop".into(),
            self.flop.clone(),
            "--turn".into(),
            self.turn.clone(),
            "--river".into(),
            self.river.clone(),
            "--oop-range".into(),
            self.oop_range.clone(),
            "--ip-range".into(),
            self.ip_range.clone(),
            "--flop-bet-sizes".into(),
            self.flop_bet_sizes.clone(),
            "--starting-pot".into(),
            self.starting_pot.to_string(),
            "--effective-stack".into(),
            self.effective_stack.to_string(),
            "--folder-path".into(),
            self.folder_path.display().to_string(),
        ]
    }

    /// Short label for logs: `UTG_2.0bb_CO_call/9c6d5d_Ts_2h`.
    pub fn unit_label(&self) -> String {
        let mut parts = self.folder_path.iter().rev().take(2).collect::<Vec<_>>();
        parts.reverse();
        parts
            .iter()
            .map(|p| p.to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Requests for every (scenario, board) unit of the configured window.
///
/// Scenarios that fail to resolve are logged and reported; the rest are
/// planned.
pub fn plan_requests(config: &PipelineConfig, inputs: &Inputs) -> (Vec<SolverRequest>, Vec<(String, Error)>) {
    let resolver = ScenarioResolver::new(&inputs.scenarios, config.accountant());
    let records = &inputs.scenarios.records()[config.scenario_window(inputs.scenarios.len())];

    let mut requests = Vec::new();
    let mut failures = Vec::new();
    for record in records {
        let scenario = match resolver.resolve(&record.line) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("skipping scenario {}: {}", record.line, e);
                failures.push((record.line.clone(), e));
                continue;
            }
        };
        for board in inputs.boards.boards() {
            match SolverRequest::build(
                &scenario,
                record,
                board,
                inputs,
                config.range_threshold,
                &config.results_dir,
            ) {
                Ok(request) => requests.push(request),
                Err(e) => {
                    let unit = format!("{}/{}", scenario.folder_name(), board.folder_name());
                    log::warn!("skipping {}: {}", unit, e);
                    failures.push((unit, e));
                }
            }
        }
    }
    (requests, failures)
}

/// Outcome of a batch of solver runs.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub solved: usize,
    /// Unit label and error of every failed run.
    pub failures: Vec<(String, Error)>,
}

/// Runs the external solver.
#[derive(Debug, Clone)]
pub struct SolverDriver {
    config: SolverConfig,
}

impl SolverDriver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// The full command for `request`.
    pub fn command(&self, request: &SolverRequest) -> Command {
        let mut command = Command::new(&self.config.program);
        command.args(&self.config.args).args(request.to_args());
        command
    }

    /// Solve one unit.
    ///
    /// Fails when the solver cannot be started, exits unsuccessfully, runs
    /// past the timeout, or leaves no actions artifact behind.
    pub fn run(&self, request: &SolverRequest) -> Result<()> {
        let folder = request.folder_path.display().to_string();
        fs::create_dir_all(&request.folder_path)
            .map_err(|e| Error::io(format!("create {}", folder), e))?;

        log::info!("solving {}", request.unit_label());
        let mut run_log = self.open_run_log(request)?;
        let mut child = self
            .command(request)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::io(format!("start {}", self.config.program), e))?;

        let stdout = child.stdout.take();
        let stdout_reader = thread::spawn(move || {
            if let Some(out) = stdout {
                for line in BufReader::new(out).lines().map_while(std::io::Result::ok) {
                    forward_line(&line);
                    if let Some(file) = run_log.as_mut() {
                        let _ = writeln!(file, "{}", line);
                    }
                }
            }
        });

        // Shared so a timed-out run still reports what it wrote.
        let captured = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&captured);
        let stderr = child.stderr.take();
        let stderr_reader = thread::spawn(move || {
            if let Some(err) = stderr {
                for line in BufReader::new(err).lines().map_while(std::io::Result::ok) {
                    if let Ok(mut buf) = sink.lock() {
                        buf.push_str(&line);
                        buf.push('\n');
                    }
                }
            }
        });
        let captured_stderr = || captured.lock().map(|s| s.clone()).unwrap_or_default();

        let Some(status) = self.wait(&mut child)? else {
            // Readers stay detached: a grandchild may still hold the pipes.
            let deadline = Instant::now() + STDERR_GRACE;
            while !stderr_reader.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(10));
            }
            return Err(Error::ExternalProcess {
                folder,
                reason: format!(
                    "timed out after {}s",
                    self.config.timeout_secs.unwrap_or_default()
                ),
                stderr: captured_stderr(),
            });
        };
        let _ = stdout_reader.join();
        let _ = stderr_reader.join();
        let stderr = captured_stderr();

        if !status.success() {
            return Err(Error::ExternalProcess {
                folder,
                reason: status.to_string(),
                stderr,
            });
        }
        if !has_artifacts(&request.folder_path) {
            return Err(Error::ExternalProcess {
                folder,
                reason: "no artifacts written".to_string(),
                stderr,
            });
        }
        Ok(())
    }

    /// Solve every request in order. A failed unit is logged and the batch
    /// moves on; `on_done` is called after each unit.
    pub fn run_batch<F: FnMut(&SolverRequest)>(&self, requests: &[SolverRequest], mut on_done: F) -> BatchReport {
        let mut report = BatchReport::default();
        for request in requests {
            match self.run(request) {
                Ok(()) => report.solved += 1,
                Err(e) => {
                    log::error!("{}: {}", request.unit_label(), e);
                    report.failures.push((request.unit_label(), e));
                }
            }
            on_done(request);
        }
        report
    }

    /// Open the run log for appending and write the unit header.
    fn open_run_log(&self, request: &SolverRequest) -> Result<Option<File>> {
        let Some(path) = &self.config.log_file else {
            return Ok(None);
        };
        let log_err = |e: std::io::Error| Error::io(format!("append to {}", path.display()), e);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(log_err)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(log_err)?;
        writeln!(file, "=== {} ===", request.unit_label()).map_err(log_err)?;
        writeln!(file, "{}", request.to_args().join(" ")).map_err(log_err)?;
        Ok(Some(file))
    }

    /// Wait for exit; `None` means the run was killed at the timeout.
    fn wait(&self, child: &mut Child) -> Result<Option<ExitStatus>> {
        let wait_err = |e: std::io::Error| Error::io(format!("wait for {}", self.config.program), e);
        let Some(secs) = self.config.timeout_secs else {
            return child.wait().map(Some).map_err(wait_err);
        };

        let deadline = Instant::now() + Duration::from_secs(secs);
        loop {
            if let Some(status) = child.try_wait().map_err(wait_err)? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn forward_line(line: &str) {
    if is_noisy(line) {
        log::debug!("solver: {}", line);
    } else {
        log::info!("solver: {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BetSizePolicy, BoardCatalog, BoardSample};
    use crate::scenario::{PreflopRanges, PotType, ScenarioTable};
    use crate::action::Side;
    use rustc_hash::FxHashMap;

    fn inputs() -> Inputs {
        let record = ScenarioRecord {
            line: "UTG/2.0bb/CO/call".into(),
            aggressor: "OOP".into(),
            oop_range: Some("UTG_RFI".into()),
            ip_range: Some("CO_vs_UTG".into()),
        };
        let sample = BoardSample {
            texture: "dynamic".into(),
            flop: "9c,6d,5d".into(),
            turn: "Ts".into(),
            river: "2h".into(),
            turn_texture: None,
        };
        let ranges: PreflopRanges =
            serde_json::from_str(r#"{"UTG_RFI": "AA:1.0,72o:0.1", "CO_vs_UTG": ["QQ:0.8,JTs:0.6"]}"#)
                .unwrap();
        let mut sizes = FxHashMap::default();
        sizes.insert("dynamic".to_string(), "33%".to_string());
        Inputs {
            scenarios: ScenarioTable::new(vec![record]),
            boards: BoardCatalog::from_samples(&[sample]).unwrap(),
            ranges,
            bet_sizes: BetSizePolicy::new(sizes),
        }
    }

    fn scenario() -> Scenario {
        Scenario {
            line: "UTG/2.0bb/CO/call".into(),
            aggressor: Side::OOP,
            pot_type: PotType::SingleRaised,
            pot: 5,
            effective_stack: 98,
        }
    }

    fn request(inputs: &Inputs, results: &Path) -> SolverRequest {
        SolverRequest::build(
            &scenario(),
            &inputs.scenarios.records()[0],
            &inputs.boards.boards()[0],
            inputs,
            0.5,
            results,
        )
        .unwrap()
    }

    #[test]
    fn test_noisy_lines() {
        assert!(is_noisy("iteration: 100 / 1000 (exploitability = 1.2e-1)"));
        assert!(is_noisy("Result and Action Saved to results/x"));
        assert!(!is_noisy("memory usage: 1.2GB"));
    }

    #[test]
    fn test_build_request() {
        let inputs = inputs();
        let req = request(&inputs, Path::new("results"));
        assert_eq!(req.flop, "9c6d5d");
        assert_eq!(req.oop_range, "AA");
        assert_eq!(req.ip_range, "QQ,JTs");
        assert_eq!(req.flop_bet_sizes, "33%");
        assert_eq!(
            req.folder_path,
            PathBuf::from("results/UTG_2.0bb_CO_call/9c6d5d_Ts_2h")
        );
        assert_eq!(req.unit_label(), "UTG_2.0bb_CO_call/9c6d5d_Ts_2h");
    }

    #[test]
    fn test_request_args() {
        let inputs = inputs();
        let args = request(&inputs, Path::new("results")).to_args();
        assert_eq!(args.len(), 18);
        assert_eq!(&args[0..2], ["--flop", "9c6d5d"]);
        assert_eq!(&args[12..16], ["--starting-pot", "5", "--effective-stack", "98"]);
        assert_eq!(args[17], "results/UTG_2.0bb_CO_call/9c6d5d_Ts_2h");
    }

    #[test]
    fn test_missing_range_label() {
        let mut inputs = inputs();
        let mut record = inputs.scenarios.records()[0].clone();
        record.ip_range = None;
        inputs.scenarios = ScenarioTable::new(vec![record.clone()]);
        let result = SolverRequest::build(
            &scenario(),
            &record,
            &inputs.boards.boards()[0],
            &inputs,
            0.5,
            Path::new("results"),
        );
        assert!(matches!(result, Err(Error::Lookup { .. })));
    }

    #[test]
    fn test_plan_requests_window() {
        let inputs = inputs();
        let config = PipelineConfig::default();
        let (requests, failures) = plan_requests(&config, &inputs);
        assert_eq!(requests.len(), 1);
        assert!(failures.is_empty());
        assert_eq!(requests[0].starting_pot, 5);

        let mut config = PipelineConfig::default();
        config.scenario_start = 1;
        let (requests, _) = plan_requests(&config, &inputs);
        assert!(requests.is_empty());
    }

    #[cfg(unix)]
    fn shell(script: &str, timeout_secs: Option<u64>) -> SolverDriver {
        SolverDriver::new(SolverConfig {
            program: "sh".into(),
            args: vec!["-c".into(), script.into(), "solver".into()],
            timeout_secs,
            log_file: None,
        })
    }

    // The folder path is the last argument.
    #[cfg(unix)]
    const WRITE_ARTIFACTS: &str =
        r#"for a; do last=$a; done; echo "iteration 1"; touch "$last/actions_0.json" "$last/strategy_0.json""#;

    #[cfg(unix)]
    #[test]
    fn test_run_success() {
        let dir = tempfile::TempDir::new().unwrap();
        let inputs = inputs();
        let req = request(&inputs, dir.path());
        shell(WRITE_ARTIFACTS, None).run(&req).unwrap();
        assert!(req.folder_path.join("actions_0.json").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_failure_captures_stderr() {
        let dir = tempfile::TempDir::new().unwrap();
        let inputs = inputs();
        let req = request(&inputs, dir.path());
        let err = shell("echo boom >&2; exit 3", None).run(&req).unwrap_err();
        match err {
            Error::ExternalProcess { stderr, .. } => assert!(stderr.contains("boom")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_without_artifacts_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let inputs = inputs();
        let req = request(&inputs, dir.path());
        let err = shell("exit 0", None).run(&req).unwrap_err();
        assert!(matches!(err, Error::ExternalProcess { ref reason, .. } if reason.contains("no artifacts")));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_timeout() {
        let dir = tempfile::TempDir::new().unwrap();
        let inputs = inputs();
        let req = request(&inputs, dir.path());
        let err = shell("echo warming up >&2; exec sleep 5", Some(1)).run(&req).unwrap_err();
        match err {
            Error::ExternalProcess { reason, stderr, .. } => {
                assert!(reason.contains("timed out"));
                assert!(stderr.contains("warming up"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_log_keeps_every_line() {
        let dir = tempfile::TempDir::new().unwrap();
        let inputs = inputs();
        let req = request(&inputs, &dir.path().join("results"));
        let log_path = dir.path().join("logs").join("solver.log");
        let mut driver = shell(WRITE_ARTIFACTS, None);
        driver.config.log_file = Some(log_path.clone());

        driver.run(&req).unwrap();
        driver.run(&req).unwrap();

        let log = fs::read_to_string(&log_path).unwrap();
        assert_eq!(log.matches("=== UTG_2.0bb_CO_call/9c6d5d_Ts_2h ===").count(), 2);
        assert_eq!(log.matches("iteration 1").count(), 2);
        assert!(log.contains("--flop 9c6d5d"));
    }

    #[cfg(unix)]
    #[test]
    fn test_batch_continues_after_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let inputs = inputs();
        let good = request(&inputs, dir.path());
        let mut bad = good.clone();
        bad.folder_path = dir.path().join("other").join("9c6d5d_Ts_2h");
        bad.flop = "fail".into();

        let driver = shell(
            r#"case "$2" in fail) exit 1;; esac; for a; do last=$a; done; touch "$last/actions_0.json""#,
            None,
        );
        let mut done = 0;
        let report = driver.run_batch(&[bad, good], |_| done += 1);
        assert_eq!(done, 2);
        assert_eq!(report.solved, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "other/9c6d5d_Ts_2h");
    }
}
