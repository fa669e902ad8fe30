fn main() {
    // Writes built.rs into OUT_DIR: rustc version and the Cargo.lock packages
    built::write_built_file().expect("failed to acquire build-time information");
}
