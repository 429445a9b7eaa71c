//! Byte views of field planes for the transport layer.
//!
//! Planes travel as the native in-memory representation of the scalar type;
//! every partition of a run shares one build, so no endianness conversion is
//! applied.

use bytemuck::Pod;

pub fn cast_slice<T: Pod>(v: &[T]) -> &[u8] {
    bytemuck::cast_slice(v)
}

pub fn cast_slice_mut<T: Pod>(v: &mut [T]) -> &mut [u8] {
    bytemuck::cast_slice_mut(v)
}
