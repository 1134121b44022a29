//! Tests for display formatting functions.

use factory_planner::display::{format_amount, format_compute_time};

#[test]
fn test_format_amount_integers() {
    assert_eq!(format_amount(60.0), "60");
    assert_eq!(format_amount(0.0), "0");
    assert_eq!(format_amount(1200.0), "1200");
}

#[test]
fn test_format_amount_fractions() {
    assert_eq!(format_amount(12.5), "12.5");
    assert_eq!(format_amount(0.125), "0.125");
    assert_eq!(format_amount(2.0 / 3.0), "0.667");
}

#[test]
fn test_format_amount_negative() {
    assert_eq!(format_amount(-31.5), "-31.5");
    assert_eq!(format_amount(-0.0001), "0");
}

#[test]
fn test_format_compute_time() {
    assert_eq!(format_compute_time(0.0), "0.0ms");
    assert_eq!(format_compute_time(12.34), "12.3ms");
    assert_eq!(format_compute_time(999.0), "999.0ms");
    assert_eq!(format_compute_time(1500.0), "1.50s");
}
