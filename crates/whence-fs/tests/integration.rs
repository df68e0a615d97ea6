use std::fs;
use std::os::unix::fs::{PermissionsExt, symlink};
use std::path::PathBuf;

use tempfile::tempdir;
use whence_fs::{
    EntryKind, SymlinkChain, UsrMerge, canonical, elf_interpreter, find_alternative,
    probe_executable, shebang,
};

fn executable(path: &std::path::Path, body: &str) {
    fs::write(path, body).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_alternatives_layout_end_to_end() {
    let root = tempdir().unwrap();
    let bin = root.path().join("usr/bin");
    let alts = root.path().join("etc/alternatives");
    let provider = root.path().join("usr/share/editor");
    for d in [&bin, &alts, &provider] {
        fs::create_dir_all(d).unwrap();
    }

    let real = provider.join("vim.basic");
    executable(&real, "#!/bin/sh\nexec true\n");
    symlink(&real, alts.join("editor")).unwrap();
    symlink("../../etc/alternatives/editor", bin.join("editor")).unwrap();

    let candidate = bin.join("editor");
    assert_eq!(
        probe_executable(&candidate),
        Some(EntryKind::Symlink {
            target: "../../etc/alternatives/editor".to_string()
        })
    );

    let chain = SymlinkChain::walk(&candidate);
    assert_eq!(chain.hops.len(), 2);
    assert!(!chain.cycle_detected);

    let real_canonical = fs::canonicalize(&real).unwrap();
    assert_eq!(canonical(&candidate), Some(real_canonical.clone()));

    let alt = find_alternative(&chain, &[alts.clone()]).unwrap();
    assert_eq!(alt.link, alts.join("editor"));
    assert_eq!(alt.target, real_canonical);

    assert_eq!(shebang(&real).unwrap().as_deref(), Some("/bin/sh"));
    assert_eq!(elf_interpreter(&real).unwrap(), None);
}

#[test]
fn test_cycle_is_not_executable_and_walk_terminates() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    symlink(&b, &a).unwrap();
    symlink(&a, &b).unwrap();

    assert_eq!(probe_executable(&a), None);
    let chain = SymlinkChain::walk(&a);
    assert!(chain.cycle_detected);
    assert_eq!(canonical(&a), None);
}

#[test]
fn test_usr_merge_with_bind_like_layout() {
    let root = tempdir().unwrap();
    fs::create_dir_all(root.path().join("usr/lib")).unwrap();
    symlink(root.path().join("usr/lib"), root.path().join("lib")).unwrap();
    fs::create_dir_all(root.path().join("sbin")).unwrap();
    fs::create_dir_all(root.path().join("usr/sbin")).unwrap();

    let merge = UsrMerge::new(root.path());
    assert!(merge.is_merged(&root.path().join("lib")));
    assert!(!merge.is_merged(&root.path().join("sbin")));
    assert!(!merge.is_merged(&PathBuf::from("/nonexistent/bin")));
}
