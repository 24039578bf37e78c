//! # Host Test Suite
//!
//! End-to-end tests of the widget host against a stub fetch capability, plus
//! property tests of the pure core.

mod property_tests;
