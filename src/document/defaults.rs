//! `skip_serializing_if` predicates.
//!
//! A field equal to its schema default is left out of the payload.

#![allow(clippy::float_cmp)]

use glam::Vec3;

#[inline]
pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

#[inline]
pub(crate) fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

#[inline]
pub(crate) fn is_zero(value: &f32) -> bool {
    *value == 0.0
}

#[inline]
pub(crate) fn is_one(value: &f32) -> bool {
    *value == 1.0
}

#[inline]
pub(crate) fn is_zero_vec3(value: &Vec3) -> bool {
    *value == Vec3::ZERO
}

#[inline]
pub(crate) fn is_one_pair(value: &[f32; 2]) -> bool {
    *value == [1.0, 1.0]
}

#[inline]
pub(crate) fn is_zero_pair(value: &[f32; 2]) -> bool {
    *value == [0.0, 0.0]
}
