use std::env;
use std::process::Command;

/// Short commit of the checkout, marked `-dirty` when the tree has local
/// changes. Packaged builds without `.git` set GRIDSTATE_BUILD_COMMIT.
fn commit_id() -> String {
    if let Ok(commit) = env::var("GRIDSTATE_BUILD_COMMIT") {
        return commit;
    }

    let git = |args: &[&str]| {
        Command::new("git")
            .args(args)
            .output()
            .ok()
            .filter(|output| output.status.success())
            .and_then(|output| String::from_utf8(output.stdout).ok())
    };

    match git(&["rev-parse", "--short=7", "HEAD"]) {
        Some(hash) => {
            let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
                .is_some_and(|status| !status.trim().is_empty());
            format!("{}{}", hash.trim(), if dirty { "-dirty" } else { "" })
        }
        None => "unknown".to_string(),
    }
}

fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/index");
    println!("cargo:rerun-if-env-changed=GRIDSTATE_BUILD_COMMIT");

    println!("cargo:rustc-env=GIT_COMMIT_HASH={}", commit_id());
    println!(
        "cargo:rustc-env=TARGET={}",
        env::var("TARGET").unwrap_or_else(|_| "unknown".to_string())
    );
}
