use clap::Parser;
use duplicate_cleaner::cli::Cli;
use duplicate_cleaner::config::ConfigError;
use duplicate_cleaner::error::ExitCode;
use duplicate_cleaner::output::ListError;
use duplicate_cleaner::run_app;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// Parse `args` with an empty config file so user settings never leak in.
fn cli(dir: &TempDir, args: &[&str]) -> Cli {
    let config = dir.path().join("empty.toml");
    fs::write(&config, "").unwrap();

    let mut full = vec![
        "duplicate-cleaner".to_string(),
        "--quiet".to_string(),
        "--config".to_string(),
        config.display().to_string(),
    ];
    full.extend(args.iter().map(|a| a.to_string()));
    Cli::parse_from(full)
}

fn arg(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn test_list_mode_writes_list() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a"), b"twin").unwrap();
    fs::write(root.join("b"), b"twin").unwrap();
    let list = dir.path().join("out.txt");

    let code = run_app(cli(&dir, &["-l", "-o", &arg(&list), &arg(&root)])).unwrap();

    assert_eq!(code, ExitCode::Success);
    let text = fs::read_to_string(&list).unwrap();
    assert!(text.starts_with("--------\n"));
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn test_list_mode_no_duplicates() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a"), b"alone").unwrap();
    let list = dir.path().join("out.txt");

    let code = run_app(cli(&dir, &["-l", "-o", &arg(&list), &arg(&root)])).unwrap();

    assert_eq!(code, ExitCode::NoDuplicates);
    assert!(!list.exists());
}

#[test]
fn test_clean_mode_end_to_end() {
    let dir = tempdir().unwrap();
    let keep = dir.path().join("keep");
    let drop1 = dir.path().join("drop1");
    let drop2 = dir.path().join("drop2");
    for p in [&keep, &drop1, &drop2] {
        fs::write(p, b"x").unwrap();
    }
    let list = dir.path().join("edited.txt");
    fs::write(
        &list,
        format!("--------\n{}\t1B\tabc\n{}\n", drop1.display(), drop2.display()),
    )
    .unwrap();

    let code = run_app(cli(&dir, &["-c", &arg(&list)])).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(keep.exists());
    assert!(!drop1.exists());
    assert!(!drop2.exists());
}

#[test]
fn test_clean_mode_partial_failure() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("real");
    fs::write(&real, b"x").unwrap();
    let list = dir.path().join("edited.txt");
    fs::write(
        &list,
        format!("{}\n{}\n", dir.path().join("ghost").display(), real.display()),
    )
    .unwrap();

    let code = run_app(cli(&dir, &["-c", &arg(&list)])).unwrap();

    assert_eq!(code, ExitCode::PartialSuccess);
    assert!(!real.exists());
}

#[test]
fn test_clean_mode_malformed_list_deletes_nothing() {
    let dir = tempdir().unwrap();
    let victim = dir.path().join("victim");
    fs::write(&victim, b"x").unwrap();
    let list = dir.path().join("edited.txt");
    fs::write(&list, format!("{}\n\n", victim.display())).unwrap();

    let err = run_app(cli(&dir, &["-c", &arg(&list)])).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ListError>(),
        Some(ListError::EmptyLine { .. })
    ));
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(victim.exists());
}

#[test]
fn test_configuration_errors_before_work() {
    let dir = tempdir().unwrap();
    let list = dir.path().join("never.txt");

    let cases: [(&[&str], fn(&ConfigError) -> bool); 4] = [
        (&["/tmp"], |e| matches!(e, ConfigError::ModeSelection(_))),
        (&["-l", "-c", "/tmp"], |e| matches!(e, ConfigError::ModeSelection(_))),
        (&["-l", "-n", "0", "/tmp"], |e| matches!(e, ConfigError::InvalidConcurrency(0))),
        (&["-l"], |e| matches!(e, ConfigError::NoRoots)),
    ];

    let output = arg(&list);
    for (args, check) in cases {
        let mut args = args.to_vec();
        args.extend(["-o", output.as_str()]);
        let err = run_app(cli(&dir, &args)).unwrap_err();
        let config_err = err.downcast_ref::<ConfigError>().expect("config error");
        assert!(check(config_err), "{args:?}: {config_err}");
        assert!(!list.exists());
    }
}

#[test]
fn test_missing_root_is_skipped() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a"), b"twin").unwrap();
    fs::write(root.join("b"), b"twin").unwrap();
    let missing = dir.path().join("typo");
    let list = dir.path().join("out.txt");

    let (list_arg, root_arg, missing_arg) = (arg(&list), arg(&root), arg(&missing));
    let args: [&str; 5] = ["-l", "-o", &list_arg, &root_arg, &missing_arg];
    let code = run_app(cli(&dir, &args)).unwrap();

    assert_eq!(code, ExitCode::Success);
    let text = fs::read_to_string(&list).unwrap();
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn test_print_config_needs_no_mode() {
    let dir = tempdir().unwrap();
    let code = run_app(cli(&dir, &["--print-config", "-f", "sha1"])).unwrap();
    assert_eq!(code, ExitCode::Success);
}
