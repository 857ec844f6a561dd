use crossbeam_channel::{TryRecvError, bounded};
use hashwalker::engine::arg_parser::Cli;
use hashwalker::engine::{
    ExclusionMatcher, FileDigester, apply_cli_to_task, hash_file, resolve_task, split_patterns,
    to_hex,
};
use hashwalker::pipeline::{
    CompletionTracker, PipelineContext, ResultWriter, WalkOutcome, format_record, run_walk_loop,
};
use hashwalker::utils::{PackagePaths, QueueCaps, apply_file_to_task, parse_hashwalker_toml};
use hashwalker::{CancelFlag, Opts, TaskSpec, UnitFailure, WorkUnit};
use std::ffi::OsStr;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::thread;

const SHA1_HELLO: &str = "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d";
const SHA1_EMPTY: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
const SHA1_ABC: &str = "a9993e364706816aba3e25717850c26c9cd0d89d";

// --- ExclusionMatcher ---

fn matcher(patterns: &[&str]) -> ExclusionMatcher {
    ExclusionMatcher::new(patterns).unwrap()
}

#[test]
fn test_matcher_empty_set_matches_nothing() {
    let m = matcher(&[]);
    assert!(m.is_empty());
    assert!(!m.is_excluded(OsStr::new("a.txt")));
    assert!(!m.is_excluded(OsStr::new("")));
}

#[test]
fn test_matcher_star() {
    let m = matcher(&["*.jpg"]);
    assert!(m.is_excluded(OsStr::new("b.jpg")));
    assert!(m.is_excluded(OsStr::new(".jpg")));
    assert!(!m.is_excluded(OsStr::new("a.txt")));
    assert!(!m.is_excluded(OsStr::new("b.jpg.txt")));
}

#[test]
fn test_matcher_question_mark_and_classes() {
    let m = matcher(&["?.log", "[ab].txt", "data[0-9]"]);
    assert!(m.is_excluded(OsStr::new("x.log")));
    assert!(!m.is_excluded(OsStr::new("xy.log")));
    assert!(m.is_excluded(OsStr::new("a.txt")));
    assert!(m.is_excluded(OsStr::new("b.txt")));
    assert!(!m.is_excluded(OsStr::new("c.txt")));
    assert!(m.is_excluded(OsStr::new("data7")));
    assert!(!m.is_excluded(OsStr::new("datax")));
}

#[test]
fn test_matcher_negated_class() {
    let m = matcher(&["[!a].txt"]);
    assert!(!m.is_excluded(OsStr::new("a.txt")));
    assert!(m.is_excluded(OsStr::new("z.txt")));
}

#[test]
fn test_matcher_literal_name() {
    let m = matcher(&["node_modules"]);
    assert!(m.is_excluded(OsStr::new("node_modules")));
    assert!(!m.is_excluded(OsStr::new("node_module")));
}

#[test]
fn test_matcher_ignores_blank_patterns() {
    let m = matcher(&["", "  ", "*.tmp"]);
    assert_eq!(m.patterns(), &["*.tmp".to_string()]);
    assert!(!m.is_excluded(OsStr::new("a.txt")));
}

#[test]
fn test_matcher_invalid_pattern_is_error() {
    assert!(ExclusionMatcher::new(&["[abc"]).is_err());
}

#[test]
fn test_split_patterns_whitespace() {
    let values = vec!["*.jpg *.gif".to_string(), "*.png".to_string(), "".to_string()];
    assert_eq!(
        split_patterns(&values),
        vec!["*.jpg".to_string(), "*.gif".to_string(), "*.png".to_string()]
    );
}

// --- hashing ---

#[test]
fn test_to_hex_lowercase_padded() {
    assert_eq!(to_hex(&[0x00, 0x0f, 0xab, 0xff]), "000fabff");
    assert_eq!(to_hex(&[]), "");
}

#[test]
fn test_digest_reader_known_values() {
    let mut d = FileDigester::new();
    assert_eq!(to_hex(&d.digest_reader(&b"hello"[..]).unwrap()), SHA1_HELLO);
    assert_eq!(to_hex(&d.digest_reader(&b""[..]).unwrap()), SHA1_EMPTY);
    assert_eq!(to_hex(&d.digest_reader(&b"abc"[..]).unwrap()), SHA1_ABC);
}

#[test]
fn test_digester_reuse_does_not_leak_state() {
    let mut d = FileDigester::new();
    let first = d.digest_reader(&b"abc"[..]).unwrap();
    let _ = d.digest_reader(&b"something else entirely"[..]).unwrap();
    let again = d.digest_reader(&b"abc"[..]).unwrap();
    assert_eq!(first, again);
}

/// Yields some bytes, then fails.
struct FailingReader {
    served: bool,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.served {
            return Err(io::Error::other("disk went away"));
        }
        self.served = true;
        buf[..3].copy_from_slice(b"abc");
        Ok(3)
    }
}

#[test]
fn test_read_error_after_open_is_read_failure() {
    let mut d = FileDigester::new();
    let err = d.digest_reader(FailingReader { served: false }).unwrap_err();
    assert!(matches!(err, UnitFailure::Read(_)));
    // Next use starts from a clean accumulator.
    assert_eq!(to_hex(&d.digest_reader(&b"abc"[..]).unwrap()), SHA1_ABC);
}

#[test]
fn test_hash_file_missing_is_open_failure() {
    let dir = tempfile::tempdir().unwrap();
    let err = hash_file(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, UnitFailure::Open(_)));
}

#[test]
fn test_hash_file_streams_large_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.bin");
    // Larger than one read chunk so several reads feed the accumulator.
    let content = vec![b'a'; 1_000_000];
    std::fs::write(&path, &content).unwrap();
    let mut d = FileDigester::new();
    let from_file = hash_file(&path).unwrap();
    let from_memory = d.digest_reader(&content[..]).unwrap();
    assert_eq!(from_file, from_memory);
    assert_eq!(
        to_hex(&from_file),
        "34aa973cd4c4daa4f61eeb2bdbad27316534016f"
    );
}

#[test]
fn test_process_fills_digest_or_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    std::fs::write(&path, "hello").unwrap();
    let mut d = FileDigester::new();

    let mut ok = WorkUnit::new(path, 5);
    d.process(&mut ok);
    assert!(ok.failure.is_none());
    assert_eq!(to_hex(&ok.digest.unwrap()), SHA1_HELLO);

    let mut missing = WorkUnit::new(dir.path().join("gone.txt"), 1);
    d.process(&mut missing);
    assert!(missing.digest.is_none());
    assert!(matches!(missing.failure, Some(UnitFailure::Open(_))));
}

// --- writer ---

#[test]
fn test_format_record() {
    let digest = [0xaa_u8; 20];
    assert_eq!(
        format_record(Path::new("/r/a.txt"), &digest, 5),
        format!("/r/a.txt,{},5", "aa".repeat(20))
    );
}

#[test]
fn test_writer_drops_failed_units_and_reports_them() {
    let mut w = ResultWriter::new(Vec::new(), None);

    let mut ok = WorkUnit::new(PathBuf::from("/r/a.txt"), 5);
    ok.digest = Some([1u8; 20]);
    w.accept(ok).unwrap();

    let mut bad = WorkUnit::new(PathBuf::from("/r/locked"), 9);
    bad.failure = Some(UnitFailure::Open(io::Error::from(
        io::ErrorKind::PermissionDenied,
    )));
    w.accept(bad).unwrap();

    let outcome = w.finish().unwrap();
    let text = String::from_utf8(outcome.sink).unwrap();
    assert_eq!(text, format!("/r/a.txt,{},5\n", "01".repeat(20)));
    assert_eq!(outcome.written, 1);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].0, PathBuf::from("/r/locked"));
}

// --- completion tracker ---

#[test]
fn test_tracker_closes_only_after_last_lease() {
    let (tx, rx) = bounded::<u32>(8);
    let mut leases = CompletionTracker::leases(3, tx);
    assert_eq!(leases[0].tracker().remaining(), 3);

    leases[0].send(7).unwrap();
    let last = leases.pop().unwrap();
    drop(leases);
    assert_eq!(last.tracker().remaining(), 1);
    assert_eq!(rx.recv().unwrap(), 7);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    last.send(8).unwrap();
    drop(last);
    assert_eq!(rx.recv().unwrap(), 8);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
}

#[test]
fn test_tracker_zero_workers_still_gets_one_lease() {
    let (tx, rx) = bounded::<u32>(1);
    let leases = CompletionTracker::leases(0, tx);
    assert_eq!(leases.len(), 1);
    drop(leases);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
}

#[test]
fn test_tracker_concurrent_release_closes_once() {
    let (tx, rx) = bounded::<usize>(4);
    let leases = CompletionTracker::leases(16, tx);
    let handles: Vec<_> = leases
        .into_iter()
        .enumerate()
        .map(|(i, lease)| {
            thread::spawn(move || {
                lease.send(i).unwrap();
            })
        })
        .collect();
    let mut got: Vec<usize> = rx.iter().collect();
    for h in handles {
        h.join().unwrap();
    }
    got.sort_unstable();
    assert_eq!(got, (0..16).collect::<Vec<_>>());
}

#[test]
fn test_tracker_panicking_worker_still_counts_down() {
    let (tx, rx) = bounded::<u32>(1);
    let mut leases = CompletionTracker::leases(2, tx);
    let lease = leases.pop().unwrap();
    let h = thread::spawn(move || {
        let _lease = lease;
        panic!("worker blew up");
    });
    assert!(h.join().is_err());
    drop(leases);
    assert!(matches!(rx.recv(), Err(_)));
}

// --- walk loop ---

#[test]
fn test_walk_loop_records_errors_and_continues() {
    let (tx, rx) = bounded::<WorkUnit>(16);
    let ctx = PipelineContext::new(Path::new("/r"), ExclusionMatcher::default(), CancelFlag::new());
    let outcomes = vec![
        WalkOutcome::File {
            path: PathBuf::from("/r/a"),
            size: 1,
        },
        WalkOutcome::Err {
            msg: "permission denied".to_string(),
            path: Some(PathBuf::from("/r/locked")),
        },
        WalkOutcome::Err {
            msg: "io error".to_string(),
            path: None,
        },
        WalkOutcome::File {
            path: PathBuf::from("/r/b"),
            size: 2,
        },
    ];
    let summary = run_walk_loop(tx, &ctx, outcomes.into_iter());
    assert_eq!(summary.emitted, 2);
    assert_eq!(summary.skipped.len(), 2);
    assert_eq!(summary.skipped[0].0, PathBuf::from("/r/locked"));
    assert_eq!(summary.skipped[1].0, PathBuf::from("/r"));

    let units: Vec<WorkUnit> = rx.iter().collect();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].path, PathBuf::from("/r/a"));
    assert_eq!(units[1].size, 2);
}

#[test]
fn test_walk_loop_stops_when_no_workers() {
    let (tx, rx) = bounded::<WorkUnit>(1);
    drop(rx);
    let ctx = PipelineContext::new(Path::new("/r"), ExclusionMatcher::default(), CancelFlag::new());
    let outcomes = (0..10).map(|i| WalkOutcome::File {
        path: PathBuf::from(format!("/r/{i}")),
        size: 0,
    });
    let summary = run_walk_loop(tx, &ctx, outcomes);
    assert_eq!(summary.emitted, 0);
}

#[test]
fn test_walk_loop_stops_when_cancelled() {
    let (tx, rx) = bounded::<WorkUnit>(16);
    let cancel = CancelFlag::new();
    cancel.cancel();
    let ctx = PipelineContext::new(Path::new("/r"), ExclusionMatcher::default(), cancel);
    let outcomes = (0..10).map(|i| WalkOutcome::File {
        path: PathBuf::from(format!("/r/{i}")),
        size: 0,
    });
    let summary = run_walk_loop(tx, &ctx, outcomes);
    assert_eq!(summary.emitted, 0);
    assert!(rx.iter().next().is_none());
}

// --- config ---

#[test]
fn test_default_names() {
    assert_eq!(PackagePaths::get().output_filename(), "hashwalker_output.txt");
    assert_eq!(PackagePaths::get().config_filename(), ".hashwalker.toml");
    assert_eq!(TaskSpec::default().output, PathBuf::from("hashwalker_output.txt"));
    assert_eq!(QueueCaps::work_cap(4), 20);
    assert_eq!(QueueCaps::work_cap(0), 5);
}

#[test]
fn test_toml_settings_apply() {
    let file = parse_hashwalker_toml(
        r#"
[settings]
root = "/data"
output = "sums.txt"
exclude = ["*.jpg", ".git"]
workers = 3
verbose = true
"#,
    )
    .unwrap();
    let mut task = TaskSpec::default();
    let mut opts = Opts::default();
    apply_file_to_task(&file, &mut task, &mut opts);
    assert_eq!(task.root, PathBuf::from("/data"));
    assert_eq!(task.output, PathBuf::from("sums.txt"));
    assert_eq!(task.exclude, vec!["*.jpg".to_string(), ".git".to_string()]);
    assert_eq!(opts.num_workers, Some(3));
    assert!(opts.verbose);
}

#[test]
fn test_toml_partial_settings_keep_defaults() {
    let file = parse_hashwalker_toml("[settings]\nworkers = 2\n").unwrap();
    let mut task = TaskSpec::default();
    let mut opts = Opts::default();
    apply_file_to_task(&file, &mut task, &mut opts);
    assert_eq!(task.output, PathBuf::from("hashwalker_output.txt"));
    assert!(task.exclude.is_empty());
    assert_eq!(opts.num_workers, Some(2));
    assert!(!opts.verbose);
}

#[test]
fn test_toml_malformed_is_error() {
    assert!(parse_hashwalker_toml("[settings]\nworkers = \"many\"\n").is_err());
}

#[test]
fn test_cli_overrides_and_splits_excludes() {
    let cli = Cli {
        root: Some(PathBuf::from("/tree")),
        output: None,
        exclude: vec!["*.jpg *.gif".to_string()],
        workers: Some(4),
        verbose: None,
    };
    let mut task = TaskSpec {
        output: PathBuf::from("from_file.txt"),
        exclude: vec!["*.bak".to_string()],
        ..TaskSpec::default()
    };
    let mut opts = Opts::default();
    apply_cli_to_task(&cli, &mut task, &mut opts);
    assert_eq!(task.root, PathBuf::from("/tree"));
    assert_eq!(task.output, PathBuf::from("from_file.txt"));
    assert_eq!(task.exclude, vec!["*.jpg".to_string(), "*.gif".to_string()]);
    assert_eq!(opts.num_workers, Some(4));
}

#[test]
fn test_resolve_task_layers_file_then_flags() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".hashwalker.toml"),
        "[settings]\noutput = \"file_out.txt\"\nexclude = [\"*.log\"]\n",
    )
    .unwrap();

    let (task, _) = resolve_task(&Cli::default(), dir.path()).unwrap();
    assert_eq!(task.root, dir.path().to_path_buf());
    assert_eq!(task.output, PathBuf::from("file_out.txt"));
    assert_eq!(task.exclude, vec!["*.log".to_string()]);

    let cli = Cli {
        output: Some(PathBuf::from("flag_out.txt")),
        ..Cli::default()
    };
    let (task, _) = resolve_task(&cli, dir.path()).unwrap();
    assert_eq!(task.output, PathBuf::from("flag_out.txt"));
}

#[test]
fn test_resolve_task_without_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let (task, opts) = resolve_task(&Cli::default(), dir.path()).unwrap();
    assert_eq!(task.root, dir.path().to_path_buf());
    assert_eq!(task.output, PathBuf::from("hashwalker_output.txt"));
    assert!(task.exclude.is_empty());
    assert_eq!(opts.num_workers, None);
}
