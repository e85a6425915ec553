mod common;
mod dispatch_tests;
mod manifest_tests;
mod order_tests;
