//! Integration tests for stepcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn stepcache() -> Command {
        cargo_bin_cmd!("stepcache")
    }

    #[test]
    fn help_displays() {
        stepcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("cross-process artifact cache"));
    }

    #[test]
    fn version_displays() {
        stepcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("stepcache"));
    }

    #[test]
    fn cache_path_uses_flag() {
        let temp = TempDir::new().unwrap();
        stepcache()
            .args(["cache", "path", "--cache-dir"])
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(temp.path().to_str().unwrap()));
    }

    #[test]
    fn cache_path_uses_env() {
        let temp = TempDir::new().unwrap();
        stepcache()
            .args(["cache", "path"])
            .env("STEPCACHE_CACHE_DIR", temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(temp.path().to_str().unwrap()));
    }

    #[test]
    fn cache_key_prints_entry_dir() {
        let temp = TempDir::new().unwrap();
        // sha256("abc")
        let expected = temp
            .path()
            .join("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
        stepcache()
            .args(["cache", "key", "abc", "--cache-dir"])
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(expected.to_str().unwrap()));
    }

    #[test]
    fn cache_list_empty() {
        let temp = TempDir::new().unwrap();
        stepcache()
            .args(["cache", "list", "--cache-dir"])
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache entries found"));
    }

    #[test]
    fn cache_list_json_empty() {
        let temp = TempDir::new().unwrap();
        stepcache()
            .args(["cache", "list", "--format", "json", "--cache-dir"])
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::diff("[]\n"));
    }

    #[test]
    fn cache_list_ignores_foreign_dirs() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("pip")).unwrap();
        stepcache()
            .args(["cache", "list", "--format", "plain", "--cache-dir"])
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }

    #[test]
    fn cache_clear_removes_incomplete_entry() {
        let temp = TempDir::new().unwrap();
        let entry = temp.path().join("a".repeat(64));
        fs::create_dir(&entry).unwrap();
        fs::write(entry.join(".lock"), "").unwrap();
        fs::write(entry.join("step.exe"), "partial").unwrap();

        stepcache()
            .args(["cache", "clear", "--incomplete", "--yes", "--cache-dir"])
            .arg(temp.path())
            .assert()
            .success()
            .stderr(predicate::str::contains("Removed 1 cache entry"));

        assert!(!entry.join("step.exe").exists());
        assert!(entry.join(".lock").exists());
    }

    #[test]
    fn config_path_uses_flag() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        stepcache()
            .args(["config", "path", "-c"])
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("custom.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let temp = TempDir::new().unwrap();
        stepcache()
            .args(["config", "show", "-c"])
            .arg(temp.path().join("missing.toml"))
            .assert()
            .success()
            .stdout(predicate::str::contains("[download]"))
            .stdout(predicate::str::contains("timeout_secs = 300"));
    }

    #[test]
    fn config_init_writes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        stepcache()
            .args(["config", "init", "-c"])
            .arg(&path)
            .assert()
            .success();
        assert!(path.exists());
    }

    #[test]
    fn invalid_config_reports_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[download]\ntimeout_secs = \"soon\"\n").unwrap();
        stepcache()
            .args(["cache", "path", "-c"])
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn download_unknown_placeholder_fails() {
        let temp = TempDir::new().unwrap();
        stepcache()
            .args(["download", "https://example.invalid/{{ flavor }}/step", "--cache-dir"])
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown placeholder 'flavor'"));
    }

    #[test]
    fn build_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        stepcache()
            .args(["build", "--source"])
            .arg(temp.path().join("nope"))
            .arg("--cache-dir")
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }
}

#[cfg(unix)]
mod fake_git_tests {
    use std::ffi::OsString;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::process::{Command, Output, Stdio};
    use tempfile::TempDir;

    /// Install a `git` on a private PATH dir that records each `init`,
    /// sleeps so concurrent callers overlap, and lays down a Bitrise step.
    fn install_fake_git(bin: &Path, counter: &Path) {
        let script = format!(
            r#"#!/bin/sh
if [ "$1" = "init" ]; then
    for last; do :; done
    echo init >> "{counter}"
    sleep 1
    mkdir -p "$last"
    echo "title: fake" > "$last/step.yml"
fi
exit 0
"#,
            counter = counter.display()
        );
        let path = bin.join("git");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn path_with(bin: &Path) -> OsString {
        let mut paths = vec![bin.to_path_buf()];
        if let Some(existing) = std::env::var_os("PATH") {
            paths.extend(std::env::split_paths(&existing));
        }
        std::env::join_paths(paths).unwrap()
    }

    fn clone_cmd(bin: &Path, cache: &Path, extra: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_stepcache"));
        cmd.args(["clone", "--repo", "https://example.invalid/step.git", "--ref", "main"])
            .args(extra)
            .arg("--cache-dir")
            .arg(cache)
            .env("PATH", path_with(bin))
            .env_remove("GITHUB_TOKEN");
        cmd
    }

    fn stdout_path(output: &Output) -> PathBuf {
        assert!(
            output.status.success(),
            "clone failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        PathBuf::from(String::from_utf8_lossy(&output.stdout).trim())
    }

    #[test]
    fn concurrent_processes_clone_once() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        let cache = temp.path().join("cache");
        fs::create_dir(&bin).unwrap();
        let counter = temp.path().join("inits");
        install_fake_git(&bin, &counter);

        let spawn = || {
            clone_cmd(&bin, &cache, &[])
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .unwrap()
        };
        let first = spawn();
        let second = spawn();
        let first = first.wait_with_output().unwrap();
        let second = second.wait_with_output().unwrap();

        let a = stdout_path(&first);
        let b = stdout_path(&second);
        assert_eq!(a, b);
        assert!(a.join("step.yml").is_file());
        assert!(a.parent().unwrap().join(".success").is_file());

        let inits = fs::read_to_string(&counter).unwrap();
        assert_eq!(inits.lines().count(), 1);
    }

    #[test]
    fn second_run_is_cached() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        let cache = temp.path().join("cache");
        fs::create_dir(&bin).unwrap();
        let counter = temp.path().join("inits");
        install_fake_git(&bin, &counter);

        let first = stdout_path(&clone_cmd(&bin, &cache, &[]).output().unwrap());
        let second = stdout_path(&clone_cmd(&bin, &cache, &[]).output().unwrap());
        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&counter).unwrap().lines().count(), 1);
    }

    #[test]
    fn clone_detect_prints_flavor() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        let cache = temp.path().join("cache");
        fs::create_dir(&bin).unwrap();
        install_fake_git(&bin, &temp.path().join("inits"));

        let output = clone_cmd(&bin, &cache, &["--detect"]).output().unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        let (flavor, path) = stdout.trim().split_once('\t').unwrap();
        assert_eq!(flavor, "bitrise");
        assert!(Path::new(path).join("step.yml").is_file());
    }
}
