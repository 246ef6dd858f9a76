//! Axis canonicalization: drop trivial axes, order by output stride, and fuse
//! axes that are contiguous in both tensors.

/// One axis of the permuted index space.
///
/// The axis is indexed in the output's axis order; `stride_a` is the stride
/// of the input axis mapped onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Axis {
    pub extent: usize,
    pub stride_a: isize,
    pub stride_b: isize,
}

impl Axis {
    pub fn new(extent: usize, stride_a: isize, stride_b: isize) -> Self {
        Self {
            extent,
            stride_a,
            stride_b,
        }
    }
}

/// Remove extent-1 axes. They contribute nothing to iteration but increase
/// loop depth.
pub fn drop_unit_axes(axes: &[Axis]) -> Vec<Axis> {
    axes.iter().copied().filter(|a| a.extent > 1).collect()
}

/// Order axes by ascending output stride (fastest varying output axis first).
///
/// This makes the canonical order independent of the major-order convention:
/// a row-major problem becomes the mirror image of its column-major twin.
pub fn sort_by_output_stride(axes: &mut [Axis]) {
    axes.sort_by_key(|a| a.stride_b);
}

/// Length of the leading run of axes whose strides equal the running
/// contiguous product on both sides.
///
/// A run of `k` axes means the first `k` axes together form one unit-stride
/// block shared by A and B.
pub fn shared_contiguous_run(axes: &[Axis]) -> usize {
    let mut expected = 1isize;
    let mut run = 0;
    for axis in axes {
        if axis.stride_a != expected || axis.stride_b != expected {
            break;
        }
        expected = expected.saturating_mul(axis.extent as isize);
        run += 1;
    }
    run
}

/// Bilateral dimension fusion.
///
/// Axes `i` and `i+1` are merged when `i+1` continues `i` contiguously in
/// BOTH the source and the destination.
pub fn fuse_bilateral(axes: &[Axis]) -> Vec<Axis> {
    let mut fused: Vec<Axis> = Vec::with_capacity(axes.len());
    for &axis in axes {
        match fused.last_mut() {
            Some(last)
                if axis.stride_a == last.stride_a * last.extent as isize
                    && axis.stride_b == last.stride_b * last.extent as isize =>
            {
                last.extent *= axis.extent;
            }
            _ => fused.push(axis),
        }
    }
    fused
}

/// Full canonicalization pipeline: drop → sort → fuse.
///
/// Returns the canonical axes together with the shared contiguous run
/// measured before fusion.
pub fn canonicalize(axes: &[Axis]) -> (Vec<Axis>, usize) {
    let mut kept = drop_unit_axes(axes);
    sort_by_output_stride(&mut kept);
    let run = shared_contiguous_run(&kept);
    (fuse_bilateral(&kept), run)
}
