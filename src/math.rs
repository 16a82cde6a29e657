use nalgebra as na;

/// True when any three of the four points are (nearly) collinear.
pub fn is_degenerate_quad(pts: &[na::Point2<f64>; 4]) -> bool {
    let extent = pts
        .iter()
        .flat_map(|p| pts.iter().map(move |q| na::distance(p, q)))
        .fold(0.0f64, f64::max);

    if extent <= f64::EPSILON {
        return true;
    }

    let tolerance = 1e-9 * extent * extent;
    let triples = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];

    triples.iter().any(|&(i, j, k)| {
        let (a, b) = (pts[j] - pts[i], pts[k] - pts[i]);

        (a.x * b.y - a.y * b.x).abs() <= tolerance
    })
}

/// Solves the direct linear transform for a plane-to-plane homography with
/// `h33` fixed to one. Each correspondence contributes two rows of the 8x8
/// system. Returns `None` for degenerate input (three collinear points on
/// either side) or a singular system.
pub fn homography_dlt(
    src: &[na::Point2<f64>; 4],
    dst: &[na::Point2<f64>; 4],
) -> Option<na::Matrix3<f64>> {
    if is_degenerate_quad(src) || is_degenerate_quad(dst) {
        return None;
    }

    let mut a = na::SMatrix::<f64, 8, 8>::zeros();
    let mut b = na::SVector::<f64, 8>::zeros();

    for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
        let (x, y, u, v) = (s.x, s.y, d.x, d.y);
        let r = 2 * i;

        a.row_mut(r)
            .copy_from_slice(&[x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y]);
        a.row_mut(r + 1)
            .copy_from_slice(&[0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y]);

        b[r] = u;
        b[r + 1] = v;
    }

    let h = a.lu().solve(&b)?;

    if h.iter().any(|v| !v.is_finite()) {
        return None;
    }

    Some(na::Matrix3::new(
        h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0,
    ))
}

#[inline]
pub fn round_to(value: f32, places: i32) -> f32 {
    let scale = 10f64.powi(places);

    ((value as f64 * scale).round() / scale) as f32
}
