pub mod entities;

/// Automatically initialize logging for all integration test binaries.
#[ctor::ctor]
fn init_test_logging() {
    test_tools::logging::init();
}
