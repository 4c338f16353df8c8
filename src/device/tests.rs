//! Tests for the host arena

use super::*;

#[test]
fn test_allocate_zero_initialized() {
    let arena = HostArena::new();
    let buf = arena.allocate(8).unwrap();

    assert_eq!(buf.len(), 8);
    assert!(!buf.is_empty());
    assert!(buf.as_slice().iter().all(|&v| v == 0.0));
}

#[test]
fn test_write_read_round_trip() {
    let arena = HostArena::new();
    let mut buf = arena.allocate(4).unwrap();

    buf.write(&[1.0, 2.0, 3.0, 4.0]).unwrap();

    let mut out = [0.0f32; 4];
    buf.read(&mut out).unwrap();
    assert_eq!(out, [1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_address_stable_across_writes() {
    let arena = HostArena::new();
    let mut buf = arena.allocate(3).unwrap();

    let before = buf.address();
    buf.write(&[1.0, 2.0, 3.0]).unwrap();
    buf.write(&[4.0, 5.0, 6.0]).unwrap();
    assert_eq!(buf.address(), before);
    assert_ne!(buf.address(), 0);
}

#[test]
fn test_distinct_buffers_have_distinct_addresses() {
    let arena = HostArena::new();
    let a = arena.allocate(4).unwrap();
    let b = arena.allocate(4).unwrap();
    assert_ne!(a.address(), b.address());
}

#[test]
fn test_length_mismatch_rejected() {
    let arena = HostArena::new();
    let mut buf = arena.allocate(4).unwrap();

    let err = buf.write(&[1.0, 2.0]).unwrap_err();
    assert!(matches!(
        err,
        DeviceError::LengthMismatch { expected: 4, actual: 2 }
    ));

    let mut out = [0.0f32; 3];
    let err = buf.read(&mut out).unwrap_err();
    assert!(matches!(
        err,
        DeviceError::LengthMismatch { expected: 4, actual: 3 }
    ));
}
