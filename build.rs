fn main() {
    // ESP-IDF toolchain environment is only needed for the firmware build.
    // Host builds (unit + integration tests) skip it entirely.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
