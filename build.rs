use std::process::Command;

fn main() {
  embed_build_info();
  set_rerun_conditions();
}

fn embed_build_info() {
  // The hash is always exported so `env!("GIT_HASH")` compiles outside a checkout.
  let git_hash = Command::new("git")
    .args(["rev-parse", "--short", "HEAD"])
    .output()
    .ok()
    .filter(|output| output.status.success())
    .and_then(|output| String::from_utf8(output.stdout).ok())
    .map(|hash| hash.trim().to_string())
    .filter(|hash| !hash.is_empty())
    .unwrap_or_else(|| "unknown".to_string());
  println!("cargo:rustc-env=GIT_HASH={git_hash}");
}

fn set_rerun_conditions() {
  println!("cargo:rerun-if-changed=build.rs");
  println!("cargo:rerun-if-changed=.git/HEAD");
}
