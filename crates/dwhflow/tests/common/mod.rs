#![allow(deprecated)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const CONFIG: &str = r#"
aws { region "us-west-2" }
cluster {
    type "multi-node"; node-type "dc2.large"; nodes 4
    identifier "dwhCluster"
}
db { name "dwh"; user "dwhuser"; password "Passw0rd"; port 5439 }
iam-role { name "dwhRole"; arn "arn:aws:iam::123456789012:role/dwhRole" }
s3 {
    log-data "s3://udacity-dend/log_data"
    log-jsonpath "s3://udacity-dend/log_json_path.json"
    song-data "s3://udacity-dend/song_data"
}
"#;

/// Working directory isolated from the user's config and environment
pub struct TestProject {
    pub root: TempDir,
    global: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
            global: tempfile::tempdir().unwrap(),
        }
    }

    pub fn write_config(&self, content: &str) -> PathBuf {
        let path = self.root.path().join("dwh.kdl");
        fs::write(&path, content).unwrap();
        path
    }

    #[allow(dead_code)]
    pub fn write_state(&self, content: &str) {
        let dir = self.root.path().join(".dwhflow");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("state.json"), content).unwrap();
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn dwh(&self) -> Command {
        let mut cmd = Command::cargo_bin("dwh").unwrap();
        cmd.current_dir(self.path())
            .env_remove("DWH_CONFIG_PATH")
            .env("XDG_CONFIG_HOME", self.global.path())
            .env("NO_COLOR", "1");
        cmd
    }
}
