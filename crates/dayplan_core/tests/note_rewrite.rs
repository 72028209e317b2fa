mod support;

use dayplan_core::{
    DayPlannerLineFormat, FileStore, FsVault, LineSerializer, NoteRewriter, ResolutionError,
    RewriteError, Task, TaskLocation, Timestamp,
};
use std::fs;
use std::sync::Arc;
use support::{task_at, RecordingFiles};

/// Serializer that always renders a fixed line.
struct FixedLine(&'static str);

impl LineSerializer for FixedLine {
    fn render(&self, _task: &Task, _timestamp: &Timestamp) -> String {
        self.0.to_string()
    }
}

#[test]
fn rewrites_only_the_recorded_line() {
    let files = RecordingFiles::with_file("daily.md", "a\nb\nc");
    let rewriter = NoteRewriter::new(files, FixedLine("B2"));
    let task = task_at("daily.md", 1, "b", "09:00", 30);

    rewriter
        .rewrite_task_line(&task, &Timestamp::new(600, 30).unwrap())
        .unwrap();

    assert_eq!(rewriter.files().contents("daily.md").unwrap(), "a\nB2\nc");
    assert_eq!(rewriter.files().write_count(), 1);
}

#[test]
fn directory_path_fails_with_resolution_error_and_never_writes() {
    let files = RecordingFiles::default().with_dir("daily");
    let rewriter = NoteRewriter::new(files, DayPlannerLineFormat::default());
    let task = task_at("daily", 0, "x", "09:00", 30);

    let err = rewriter
        .rewrite_task_line(&task, &Timestamp::new(600, 30).unwrap())
        .unwrap_err();

    assert!(matches!(
        err,
        RewriteError::Resolution(ResolutionError::NotAFile(_))
    ));
    assert_eq!(rewriter.files().read_count(), 0);
    assert_eq!(rewriter.files().write_count(), 0);
}

#[test]
fn out_of_range_line_fails_without_writing() {
    let files = RecordingFiles::with_file("daily.md", "only line");
    let rewriter = NoteRewriter::new(files, DayPlannerLineFormat::default());
    let task = task_at("daily.md", 4, "gone", "09:00", 30);

    let err = rewriter
        .rewrite_task_line(&task, &Timestamp::new(600, 30).unwrap())
        .unwrap_err();

    assert!(matches!(
        err,
        RewriteError::OutOfRange {
            line: 4,
            line_count: 1
        }
    ));
    assert_eq!(rewriter.files().contents("daily.md").unwrap(), "only line");
    assert_eq!(rewriter.files().write_count(), 0);
}

#[test]
fn write_failure_is_returned_as_io_error() {
    let mut files = RecordingFiles::with_file("daily.md", "- [ ] 09:00 - 09:30 Call");
    files.fail_writes = true;
    let rewriter = NoteRewriter::new(files, DayPlannerLineFormat::default());
    let task = task_at("daily.md", 0, "Call", "09:00", 30);

    let err = rewriter
        .rewrite_task_line(&task, &Timestamp::new(600, 30).unwrap())
        .unwrap_err();

    assert!(matches!(err, RewriteError::Io(_)));
}

#[test]
fn fs_vault_rewrites_note_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("daily")).unwrap();
    let note = dir.path().join("daily/2026-10-16.md");
    fs::write(
        &note,
        "# Day\n- [ ] 09:00 - 09:30 Standup\n- [ ] 10:00 - 11:00 Review\n",
    )
    .unwrap();

    let rewriter = NoteRewriter::new(FsVault::new(dir.path()), DayPlannerLineFormat::default());
    let task = task_at("daily/2026-10-16.md", 2, "Review", "10:00", 60);

    rewriter
        .rewrite_task_line(&task, &Timestamp::from_clock("13:15", 90).unwrap())
        .unwrap();

    assert_eq!(
        fs::read_to_string(&note).unwrap(),
        "# Day\n- [ ] 09:00 - 09:30 Standup\n- [ ] 13:15 - 14:45 Review\n"
    );
}

#[test]
fn fs_vault_resolution_errors() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("daily")).unwrap();
    let vault = FsVault::new(dir.path());

    assert!(matches!(
        vault.resolve("daily"),
        Err(ResolutionError::NotAFile(_))
    ));
    assert!(matches!(
        vault.resolve("daily/missing.md"),
        Err(ResolutionError::NotFound(_))
    ));
    assert!(matches!(
        vault.resolve("../outside.md"),
        Err(ResolutionError::InvalidPath(_))
    ));
}

#[cfg(unix)]
#[test]
fn fs_vault_rewrite_keeps_note_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let note = dir.path().join("today.md");
    fs::write(&note, "- 09:00 - 09:30 Focus\n").unwrap();
    fs::set_permissions(&note, fs::Permissions::from_mode(0o644)).unwrap();

    let rewriter = NoteRewriter::new(FsVault::new(dir.path()), DayPlannerLineFormat::default());
    let task = Task::new(
        TaskLocation::new("today.md", 0),
        "- ",
        "Focus",
        Timestamp::from_clock("09:00", 30).unwrap(),
    );
    rewriter
        .rewrite_task_line(&task, &Timestamp::from_clock("11:00", 30).unwrap())
        .unwrap();

    let mode = fs::metadata(&note).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
    assert_eq!(fs::read_to_string(&note).unwrap(), "- 11:00 - 11:30 Focus\n");
}

#[cfg(unix)]
#[test]
fn fs_vault_rewrite_through_symlink_updates_target() {
    let dir = tempfile::tempdir().unwrap();
    let real = dir.path().join("real.md");
    let link = dir.path().join("link.md");
    fs::write(&real, "- 09:00 - 09:30 Focus\n").unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let rewriter = NoteRewriter::new(FsVault::new(dir.path()), DayPlannerLineFormat::default());
    let task = Task::new(
        TaskLocation::new("link.md", 0),
        "- ",
        "Focus",
        Timestamp::from_clock("09:00", 30).unwrap(),
    );
    rewriter
        .rewrite_task_line(&task, &Timestamp::from_clock("14:00", 60).unwrap())
        .unwrap();

    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_to_string(&real).unwrap(), "- 14:00 - 15:00 Focus\n");
}

#[cfg(unix)]
#[test]
fn fs_vault_rejects_symlink_leaving_the_vault() {
    let outside = tempfile::tempdir().unwrap();
    let target = outside.path().join("elsewhere.md");
    fs::write(&target, "- 09:00 - 09:30 Focus\n").unwrap();

    let dir = tempfile::tempdir().unwrap();
    std::os::unix::fs::symlink(&target, dir.path().join("escape.md")).unwrap();
    let vault = FsVault::new(dir.path());

    assert!(matches!(
        vault.resolve("escape.md"),
        Err(ResolutionError::InvalidPath(_))
    ));
}

#[test]
fn read_failure_is_io_error_and_never_writes() {
    let mut files = RecordingFiles::with_file("daily.md", "- [ ] 09:00 - 09:30 Call");
    files.fail_reads = true;
    let rewriter = NoteRewriter::new(files, DayPlannerLineFormat::default());
    let task = task_at("daily.md", 0, "Call", "09:00", 30);

    let err = rewriter
        .rewrite_task_line(&task, &Timestamp::new(600, 30).unwrap())
        .unwrap_err();

    assert!(matches!(err, RewriteError::Io(_)));
    assert_eq!(rewriter.files().read_count(), 1);
    assert_eq!(rewriter.files().write_count(), 0);
}

#[test]
fn write_locks_are_released_after_rewrite() {
    let files = RecordingFiles::with_file("daily.md", "a\nb");
    let rewriter = NoteRewriter::new(files, FixedLine("B"));
    let task = task_at("daily.md", 1, "b", "09:00", 30);

    rewriter
        .rewrite_task_line(&task, &Timestamp::new(600, 30).unwrap())
        .unwrap();

    let locks = rewriter.write_locks().expect("serialized rewriter");
    assert!(locks.is_empty());
}

#[test]
fn concurrent_rewrites_of_one_note_keep_both_lines() {
    let dir = tempfile::tempdir().unwrap();
    let lines: Vec<String> = (0..16).map(|idx| format!("- [ ] 08:00 - 08:15 t{idx}")).collect();
    fs::write(dir.path().join("day.md"), lines.join("\n")).unwrap();

    let rewriter = Arc::new(NoteRewriter::new(
        FsVault::new(dir.path()),
        DayPlannerLineFormat::default(),
    ));

    std::thread::scope(|scope| {
        for idx in 0..16usize {
            let rewriter = Arc::clone(&rewriter);
            scope.spawn(move || {
                let task = Task::new(
                    TaskLocation::new("day.md", idx),
                    "- [ ] ",
                    format!("t{idx}"),
                    Timestamp::new(480, 15).unwrap(),
                );
                rewriter
                    .rewrite_task_line(&task, &Timestamp::new(600, 15).unwrap())
                    .unwrap();
            });
        }
    });

    assert!(rewriter.write_locks().expect("serialized rewriter").is_empty());
    let written = fs::read_to_string(dir.path().join("day.md")).unwrap();
    for (idx, line) in written.split('\n').enumerate() {
        assert_eq!(line, format!("- [ ] 10:00 - 10:15 t{idx}"));
    }
}
