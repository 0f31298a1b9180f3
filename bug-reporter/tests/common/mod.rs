use assert_cmd::Command;
use assert_cmd::assert::Assert;
use assert_fs::TempDir;
use assert_fs::prelude::PathCopy;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

const CLEARED_ENV: &[&str] = &[
    "BUG_REPORT_GITHUB_TOKEN",
    "BUG_REPORT_GITHUB_OWNER",
    "BUG_REPORT_GITHUB_REPO",
    "BUG_REPORT_RELAY_URL",
    "BUG_REPORT_CONFIG_DIR",
    "BUG_REPORT_DISABLE_DEFAULT_CONFIG",
];

fn setup_working_dir(dir_name: Option<&str>) -> TempDir {
    let temp = TempDir::new().unwrap();
    if let Some(dir_name) = dir_name {
        let file_path = PathBuf::from(format!(
            "{}/tests/test-cases/{}",
            env!("CARGO_MANIFEST_DIR"),
            dir_name
        ));
        temp.copy_from(file_path, &["*", "**/*"]).unwrap();
    }

    temp
}

pub struct BugReportTestHelper<'a> {
    pub work_dir: TempDir,
    home_dir: TempDir,
    name: &'a str,
    counter: AtomicUsize,
}

impl<'a> BugReportTestHelper<'a> {
    pub fn new(name: &'a str, test_dir: &'a str) -> Self {
        Self::build(name, Some(test_dir))
    }

    pub fn empty(name: &'a str) -> Self {
        Self::build(name, None)
    }

    fn build(name: &'a str, test_dir: Option<&'a str>) -> Self {
        Self {
            work_dir: setup_working_dir(test_dir),
            home_dir: TempDir::new().unwrap(),
            name,
            counter: AtomicUsize::new(0),
        }
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("bug-report").unwrap();
        for key in CLEARED_ENV {
            cmd.env_remove(key);
        }
        cmd.current_dir(self.work_dir.path())
            .env(
                "BUG_REPORT_RUN_ID",
                format!(
                    "{}-{}",
                    self.name,
                    self.counter.fetch_add(1, Ordering::Relaxed)
                ),
            )
            .env("BUG_REPORT_OUTPUT_PROGRESS", "plain")
            .env("NO_COLOR", "1")
            .env("HOME", self.home_dir.path())
            .env("XDG_CONFIG_HOME", self.home_dir.path().join(".config"));
        cmd
    }

    pub fn run_command(&self, args: &[&str]) -> Assert {
        self.command().args(args).assert()
    }

    pub fn clean_work_dir(self) {
        self.work_dir.close().unwrap();
        self.home_dir.close().unwrap();
    }
}
