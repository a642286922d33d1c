//! ---
//! thalos_section: "14-versioning"
//! thalos_subsection: "build"
//! thalos_type: "source"
//! thalos_scope: "build"
//! thalos_description: "Emits build and git metadata consumed by VersionInfo."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
use vergen::EmitBuilder;

// Without fail_on_error, builds outside a git checkout get placeholder values.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    EmitBuilder::builder()
        .all_build()
        .all_cargo()
        .git_sha(true)
        .emit()?;

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=THALOS_GIT_SHA");
    Ok(())
}
