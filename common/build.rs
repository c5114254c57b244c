// Executed before the build: derive the build version from the git commit
// and expose it to the crate as BUILD_VERSION.

use std::process::Command;

fn main() {
    let commit_hash = match option_env!("RANDAO_COMMIT_HASH") {
        Some(hash) if hash.len() >= 7 => hash[0..7].to_string(),
        _ => match Command::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .output()
        {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            }
            // Not a git checkout
            _ => "unknown".to_string(),
        },
    };

    let build_version = format!("{}-{}", env!("CARGO_PKG_VERSION"), commit_hash);
    println!("cargo:rerun-if-env-changed=RANDAO_COMMIT_HASH");
    println!("cargo:rustc-env=BUILD_VERSION={build_version}");
}
