//! Integration tests for skein-types.

use skein_types::constants::{DEFAULT_CG_TOLERANCE, FACE_WIND_SCALE, FLUID_FACTOR, MAX_HAIR_GRID_RES};
use skein_types::{SkeinError, SkeinResult};

// ─── Constant Tests ───────────────────────────────────────────

#[test]
fn constants_are_sane() {
    assert!(DEFAULT_CG_TOLERANCE > 0.0 && DEFAULT_CG_TOLERANCE < 1.0);
    assert!((FACE_WIND_SCALE - 0.02).abs() < 1e-9);
    assert!(FLUID_FACTOR > 0.0 && FLUID_FACTOR <= 1.0);
    assert_eq!(MAX_HAIR_GRID_RES, 64);
}

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn error_display() {
    let err = SkeinError::InvalidBody("vertex 3 has zero mass".into());
    assert!(err.to_string().contains("zero mass"));
}

#[test]
fn io_error_converts() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "scene.toml");
    let err: SkeinError = io.into();
    assert!(err.to_string().starts_with("I/O error"));
}

#[test]
fn question_mark_propagates() {
    fn inner() -> SkeinResult<()> {
        Err(SkeinError::InvalidConfig("steps".into()))
    }
    fn outer() -> SkeinResult<u32> {
        inner()?;
        Ok(1)
    }
    assert!(matches!(outer(), Err(SkeinError::InvalidConfig(_))));
}
