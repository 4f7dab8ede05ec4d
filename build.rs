fn main() {
    // Rebuild when the build script changes
    println!("cargo:rerun-if-changed=build.rs");

    // Package name, version and build time for the startup banner
    built::write_built_file()
        .expect("Failed to acquire build-time information");
}
