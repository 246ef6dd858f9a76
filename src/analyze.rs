//! Execution-mode and loop-order selection over canonical axes.

use crate::fuse::Axis;

/// How the innermost part of the loop nest is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// No axis with extent > 1 remains: a single element.
    Scalar,
    /// A and B have their smallest stride on the same axis: a linear
    /// (possibly strided) copy along `inner`.
    Linear {
        /// The shared fastest axis.
        inner: usize,
    },
    /// A and B have their smallest stride on different axes: a 2D tile
    /// transpose over `dim_a` × `dim_b`.
    Transpose {
        /// Axis with the smallest A stride.
        dim_a: usize,
        /// Axis with the smallest B stride.
        dim_b: usize,
    },
}

impl ExecMode {
    /// Axes consumed by the tile kernel, innermost first.
    pub fn kernel_axes(&self) -> Vec<usize> {
        match *self {
            ExecMode::Scalar => vec![],
            ExecMode::Linear { inner } => vec![inner],
            ExecMode::Transpose { dim_a, dim_b } => vec![dim_a, dim_b],
        }
    }
}

/// Mode plus macro loop order (outermost first) for a set of canonical axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub mode: ExecMode,
    pub loop_order: Vec<usize>,
}

/// Choose the execution mode and the order of the macro loops.
///
/// `axes` must already be canonical (no extent-1 axes, fused).
pub fn analyze(axes: &[Axis]) -> Analysis {
    if axes.is_empty() {
        return Analysis {
            mode: ExecMode::Scalar,
            loop_order: vec![],
        };
    }

    let dim_a = find_stride1_axis(axes, |a| a.stride_a);
    let dim_b = find_stride1_axis(axes, |a| a.stride_b);

    if dim_a == dim_b {
        Analysis {
            mode: ExecMode::Linear { inner: dim_a },
            loop_order: loop_order_linear(axes, dim_a),
        }
    } else {
        Analysis {
            mode: ExecMode::Transpose { dim_a, dim_b },
            loop_order: loop_order_transpose(axes, dim_a, dim_b),
        }
    }
}

/// Index of the axis with the smallest absolute stride on one side.
fn find_stride1_axis(axes: &[Axis], stride: impl Fn(&Axis) -> isize) -> usize {
    axes.iter()
        .enumerate()
        .min_by_key(|(_, a)| stride(a).unsigned_abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Loop order for transpose mode.
///
/// Excludes the two kernel axes. Remaining axes are sorted by combined stride
/// cost descending (largest strides outermost).
fn loop_order_transpose(axes: &[Axis], dim_a: usize, dim_b: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..axes.len())
        .filter(|&d| d != dim_a && d != dim_b)
        .collect();
    order.sort_by(|&x, &y| {
        let cost = |d: usize| axes[d].stride_a.unsigned_abs() + axes[d].stride_b.unsigned_abs();
        cost(y).cmp(&cost(x))
    });
    order
}

/// Loop order for linear mode.
///
/// Largest B stride outermost, so consecutive leaf calls advance through B
/// by the smallest steps and writes stay sequential.
fn loop_order_linear(axes: &[Axis], inner: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..axes.len()).filter(|&d| d != inner).collect();
    order.sort_by(|&x, &y| {
        axes[y]
            .stride_b
            .unsigned_abs()
            .cmp(&axes[x].stride_b.unsigned_abs())
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar() {
        let a = analyze(&[]);
        assert_eq!(a.mode, ExecMode::Scalar);
        assert!(a.loop_order.is_empty());
        assert!(a.mode.kernel_axes().is_empty());
    }

    #[test]
    fn test_linear_single_axis() {
        let a = analyze(&[Axis::new(24, 1, 1)]);
        assert_eq!(a.mode, ExecMode::Linear { inner: 0 });
        assert!(a.loop_order.is_empty());
    }

    #[test]
    fn test_transpose_2d() {
        let a = analyze(&[Axis::new(5, 4, 1), Axis::new(4, 1, 5)]);
        assert_eq!(a.mode, ExecMode::Transpose { dim_a: 1, dim_b: 0 });
        assert_eq!(a.mode.kernel_axes(), vec![1, 0]);
    }

    #[test]
    fn test_loop_order_transpose() {
        let axes = [
            Axis::new(5, 4, 1),
            Axis::new(4, 1, 5),
            Axis::new(3, 100, 20),
            Axis::new(7, 300, 60),
        ];
        let a = analyze(&axes);
        assert_eq!(a.mode, ExecMode::Transpose { dim_a: 1, dim_b: 0 });
        // cost[2] = 120, cost[3] = 360
        assert_eq!(a.loop_order, vec![3, 2]);
    }

    #[test]
    fn test_loop_order_linear() {
        // shared stride-1 axis 0; B strides 8 and 40 → 40 outermost
        let axes = [
            Axis::new(8, 1, 1),
            Axis::new(5, 64, 8),
            Axis::new(3, 8, 40),
        ];
        let a = analyze(&axes);
        assert_eq!(a.mode, ExecMode::Linear { inner: 0 });
        assert_eq!(a.loop_order, vec![2, 1]);
    }
}
