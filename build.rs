#![allow(missing_docs)]

use std::{env, error::Error};
use vergen::{BuildBuilder, CargoBuilder, Emitter};
use vergen_git2::Git2Builder;

/// Reads a variable emitted by vergen, falling back to `unknown` when it could not be computed,
/// e.g. when building outside of a git checkout.
fn vergen_var(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| "unknown".to_string())
}

fn main() -> Result<(), Box<dyn Error>> {
    let build = BuildBuilder::default().build_timestamp(true).build()?;
    let cargo = CargoBuilder::default().features(true).target_triple(true).build()?;
    let gitcl =
        Git2Builder::default().sha(false).dirty(true).describe(false, true, None).build()?;

    Emitter::default()
        .add_instructions(&build)?
        .add_instructions(&cargo)?
        .add_instructions(&gitcl)?
        .emit_and_set()?;

    let sha = vergen_var("VERGEN_GIT_SHA");
    let sha_short: String = sha.chars().take(7).collect();

    let is_dirty = vergen_var("VERGEN_GIT_DIRTY") == "true";
    // > git describe --always --tags
    // if not on a tag: v0.2.0-beta.3-82-g1939939b
    // if on a tag: v0.2.0-beta.3
    let not_on_tag = vergen_var("VERGEN_GIT_DESCRIBE").ends_with(&format!("-g{sha_short}"));
    let version_suffix = if is_dirty || not_on_tag { "-dev" } else { "" };
    println!("cargo:rustc-env=FUSE_EXPORTER_VERSION_SUFFIX={version_suffix}");

    // Set the build profile
    let out_dir = env::var("OUT_DIR")?;
    let profile = out_dir.rsplit(std::path::MAIN_SEPARATOR).nth(3).unwrap_or("unknown");
    println!("cargo:rustc-env=FUSE_EXPORTER_BUILD_PROFILE={profile}");

    let pkg_version = env!("CARGO_PKG_VERSION");

    // Example: 0.1.0 (defa64b)
    println!(
        "cargo:rustc-env=FUSE_EXPORTER_SHORT_VERSION={pkg_version}{version_suffix} ({sha_short})"
    );

    // Example:
    //
    // ```text
    // Version: 0.1.0
    // Commit SHA: defa64b2
    // Build Timestamp: 2023-05-19T01:47:19.815651705Z
    // Build Features: default
    // Build Profile: release
    // ```
    println!("cargo:rustc-env=FUSE_EXPORTER_LONG_VERSION_0=Version: {pkg_version}{version_suffix}");
    println!("cargo:rustc-env=FUSE_EXPORTER_LONG_VERSION_1=Commit SHA: {sha}");
    println!(
        "cargo:rustc-env=FUSE_EXPORTER_LONG_VERSION_2=Build Timestamp: {}",
        vergen_var("VERGEN_BUILD_TIMESTAMP")
    );
    println!(
        "cargo:rustc-env=FUSE_EXPORTER_LONG_VERSION_3=Build Features: {}",
        vergen_var("VERGEN_CARGO_FEATURES")
    );
    println!("cargo:rustc-env=FUSE_EXPORTER_LONG_VERSION_4=Build Profile: {profile}");

    Ok(())
}
