//! NumPy-style broadcasting for the lunar model inputs.

use ndarray::{ArrayViewD, IxDyn};
use smallvec::{smallvec, SmallVec};

use crate::error::AtmosphereError;

/// Shape that all of `shapes` broadcast to.
///
/// Shapes are aligned on their trailing axes; an axis of length 1 stretches
/// to match the others.
pub(crate) fn broadcast_shape(
    shapes: &[&[usize]],
) -> Result<SmallVec<[usize; 4]>, AtmosphereError> {
    let ndim = shapes.iter().map(|shape| shape.len()).max().unwrap_or(0);
    let mut out: SmallVec<[usize; 4]> = smallvec![1; ndim];

    for shape in shapes {
        let offset = ndim - shape.len();
        for (axis, &len) in shape.iter().enumerate() {
            let target = &mut out[offset + axis];
            if *target == 1 {
                *target = len;
            } else if len != 1 && len != *target {
                return Err(AtmosphereError::IncompatibleShapes);
            }
        }
    }

    Ok(out)
}

/// Broadcast `array` to `shape`, which should come from [`broadcast_shape`].
pub(crate) fn broadcast_to<'a>(
    array: &'a ArrayViewD<'_, f64>,
    shape: &[usize],
) -> Result<ArrayViewD<'a, f64>, AtmosphereError> {
    array
        .broadcast(IxDyn(shape))
        .ok_or(AtmosphereError::IncompatibleShapes)
}
