use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use whence_platform::path::{SearchPath, Widen};
use whence_platform::state::{DefaultSource, DumpSource, FallbackSource, SpawnSource, StateSource};
use whence_resolve::{Inspector, Mechanism};

fn exe(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "#!/bin/sh\necho hi\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_dump_file_drives_resolution() {
    let tmp = tempfile::tempdir().unwrap();
    let dump = tmp.path().join("state.dump");
    fs::write(
        &dump,
        "@@posix\noff\n@@aliases\nalias ls='ls --color=auto'\n@@functions\nmkcd 4 /home/u/.bashrc\n\
         @@builtins\nenable cd\nenable -n test\n@@keywords\nif\n@@end\n",
    )
    .unwrap();

    let state = DumpSource::new(&dump).load().unwrap();
    let inspector = Inspector::new();

    let ls = inspector.inspect("ls", &state, &[]).unwrap();
    assert_eq!(ls.resolution.winner, Mechanism::Alias);
    assert_eq!(ls.resolution.alias.definition.as_deref(), Some("ls --color=auto"));

    let mkcd = inspector.inspect("mkcd", &state, &[]).unwrap();
    assert_eq!(mkcd.resolution.winner, Mechanism::Function);

    let test = inspector.inspect("test", &state, &[]).unwrap();
    assert_eq!(test.resolution.winner, Mechanism::NotFound);
    assert_eq!(test.resolution.builtin.enabled, Some(false));
}

#[test]
fn test_widened_path_finds_admin_tool() {
    let base = tempfile::tempdir().unwrap();
    let admin = tempfile::tempdir().unwrap();
    let tool = exe(admin.path(), "fdisk");

    let sp = SearchPath::new(vec![base.path().to_path_buf()]);
    let (effective, widened) = sp.widen_for("fdisk", &[admin.path().to_path_buf()], Widen::Auto);
    assert!(widened);

    let state = DefaultSource::new().load().unwrap();
    let report = Inspector::new().inspect("fdisk", &state, effective.dirs()).unwrap();
    assert_eq!(report.resolution.winner, Mechanism::Path);
    assert_eq!(report.resolution.path.resolved.as_deref(), Some(tool.as_path()));
    assert_eq!(report.path_entries.len(), 2);
    assert!(!report.path_entries[0].is_match());
}

#[test]
fn test_spawned_bash_or_fallback() {
    // Passes whether or not bash is installed.
    let source = FallbackSource::new(SpawnSource::default(), DefaultSource::new());
    let state = source.load().unwrap();
    assert!(state.keywords.contains("if"));
    assert!(state.is_special_builtin("eval"));
}
