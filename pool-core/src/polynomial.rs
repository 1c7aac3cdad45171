//! Closed-form polynomial root extraction up to degree four.
//!
//! Coefficients are always given **lowest degree first**:
//!
//! ```text
//! p = [p0, p1, p2, p3, p4]   <=>   p0 + p1·x + p2·x² + p3·x³ + p4·x⁴
//! ```
//!
//! which is the order the impact-time equations are assembled in (constant
//! separation term first, acceleration terms last).
//!
//! Every solver returns all roots as complex numbers; callers that only care
//! about real solutions filter them with [`real_roots`]. When the leading
//! coefficient is negligible relative to the rest, the polynomial is solved as
//! the next lower degree instead of dividing by a value close to zero.
//!
//! ## Quartic (Ferrari)
//!
//! ```text
//! x⁴ + a x³ + b x² + c x + d            (normalized)
//! x = y - a/4  ->  y⁴ + p y² + q y + r   (depressed)
//! resolvent:  m³ + p m² + (p²/4 - r) m - q²/8 = 0,  m > 0
//! y² ∓ √(2m)·y + (p/2 + m ± q / (2√(2m))) = 0
//! ```
//!
//! The two factor constants multiply to `r`, so the smaller one is taken as
//! `r` over the larger instead of from the cancelling sum. Roots whose
//! residual still exceeds [`RESIDUAL_TOLERANCE`] after polishing trigger a
//! fallback: the real roots are bracketed between the critical points and
//! refined by safeguarded Newton, then deflated out of the polynomial.

use num_complex::Complex64;

/// Leading coefficients smaller than this (relative to the largest
/// coefficient) are treated as zero.
pub const LEADING_COEFFICIENT_TOLERANCE: f64 = 1e-13;

/// Conjugate pairs whose imaginary part is below this (relative to the
/// root's magnitude) are clustered into a double real root.
pub const ROOT_CLUSTER_TOLERANCE: f64 = 1e-7;

/// Relative residual above which the closed-form roots are not trusted.
pub const RESIDUAL_TOLERANCE: f64 = 1e-8;

/// Newton iterations applied to each root after the closed-form pass.
const POLISH_ITERATIONS: usize = 3;

/// Newton iterations applied to the resolvent cubic's root.
const RESOLVENT_ITERATIONS: usize = 8;

/// Iteration cap for the bracketed real-root refinement.
const BRACKET_ITERATIONS: usize = 200;

/// Solve a polynomial of degree at most four.
///
/// Trailing (highest-degree) coefficients that are negligible are dropped
/// before dispatching to the matching closed form. A polynomial that
/// degenerates to a non-zero constant has no roots; the zero polynomial is
/// reported as having no roots too.
pub fn solve(p: &[f64]) -> Vec<Complex64> {
    let degree = effective_degree(p);
    if degree == 0 {
        return Vec::new();
    }
    let p = &p[..=degree];
    let roots: Vec<Complex64> = closed_form(p)
        .into_iter()
        .map(|z| polish(p, z))
        .collect();
    if roots.iter().all(|z| relative_residual(p, *z) <= RESIDUAL_TOLERANCE) {
        return roots;
    }

    // Bracket the real roots directly and solve what is left in closed form.
    let reals: Vec<f64> = isolate_real_roots(p)
        .into_iter()
        .map(|x| polish(p, Complex64::new(x, 0.0)).re)
        .collect();
    if reals.is_empty() {
        return roots;
    }
    let rest = reals.iter().fold(p.to_vec(), |q, &x| deflate(&q, x));
    let mut refined: Vec<Complex64> = reals.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    refined.extend(closed_form(&rest).into_iter().map(|z| polish(p, z)));
    refined
}

/// Real roots of `p` in ascending order, found by bracketing.
///
/// The critical points (roots of the derivative, found recursively) split the
/// line into monotone pieces bounded by the Cauchy bound. Each piece holding a
/// sign change is refined by Newton steps kept inside the bracket, falling
/// back to bisection. Slower than the closed forms but immune to their
/// cancellation.
pub fn isolate_real_roots(p: &[f64]) -> Vec<f64> {
    let degree = effective_degree(p);
    if degree == 0 {
        return Vec::new();
    }
    let p = &p[..=degree];
    if degree == 1 {
        return vec![-p[0] / p[1]];
    }

    let derivative: Vec<f64> = p.iter().enumerate().skip(1).map(|(k, &c)| k as f64 * c).collect();
    let bound = 1.0
        + p[..degree]
            .iter()
            .fold(0.0_f64, |m, c| m.max((c / p[degree]).abs()));
    let mut points = vec![-bound];
    points.extend(
        isolate_real_roots(&derivative)
            .into_iter()
            .filter(|x| x.abs() < bound),
    );
    points.push(bound);

    let mut roots: Vec<f64> = Vec::new();
    for piece in points.windows(2) {
        let (lo, hi) = (piece[0], piece[1]);
        let (f_lo, f_hi) = (eval(p, lo), eval(p, hi));
        if f_lo == 0.0 {
            if roots.last() != Some(&lo) {
                roots.push(lo);
            }
            continue;
        }
        if f_lo * f_hi > 0.0 {
            continue;
        }
        if f_hi == 0.0 {
            roots.push(hi);
            continue;
        }
        roots.push(refine_bracketed(p, lo, hi, f_lo < 0.0));
    }
    roots
}

/// Exact factor `p / (x - root)`, dropping the remainder.
fn deflate(p: &[f64], root: f64) -> Vec<f64> {
    let mut quotient = vec![0.0; p.len().saturating_sub(1)];
    let mut acc = 0.0;
    for k in (1..p.len()).rev() {
        acc = acc * root + p[k];
        quotient[k - 1] = acc;
    }
    quotient
}

fn refine_bracketed(p: &[f64], mut lo: f64, mut hi: f64, negative_at_lo: bool) -> f64 {
    let mut x = 0.5 * (lo + hi);
    for _ in 0..BRACKET_ITERATIONS {
        let fx = eval(p, x);
        if fx == 0.0 {
            break;
        }
        if (fx < 0.0) == negative_at_lo {
            lo = x;
        } else {
            hi = x;
        }
        let dx = eval_derivative(p, x);
        let newton = x - fx / dx;
        let next = if dx != 0.0 && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
        if next == x || hi - lo <= 4.0 * f64::EPSILON * x.abs().max(1.0) {
            x = next;
            break;
        }
        x = next;
    }
    x
}

/// Roots of `p0 + p1 x + p2 x²`.
pub fn quadratic_solve(p: &[f64; 3]) -> Vec<Complex64> {
    solve(p)
}

/// Roots of `p0 + p1 x + p2 x² + p3 x³`.
pub fn cubic_solve(p: &[f64; 4]) -> Vec<Complex64> {
    solve(p)
}

/// Roots of `p0 + p1 x + p2 x² + p3 x³ + p4 x⁴`.
///
/// Degrades to the cubic/quadratic/linear closed form when the leading
/// coefficients vanish.
pub fn quartic_solve(p: &[f64; 5]) -> Vec<Complex64> {
    solve(p)
}

/// Extract the real roots, clustering near-conjugate pairs.
///
/// A root whose imaginary part is within [`ROOT_CLUSTER_TOLERANCE`] of zero
/// (relative to its magnitude) is reported by its real part. Near-double real
/// roots therefore show up twice, which is what a grazing contact produces.
/// The result is sorted in ascending order.
pub fn real_roots(roots: &[Complex64]) -> Vec<f64> {
    let mut reals: Vec<f64> = roots
        .iter()
        .filter(|z| z.im.abs() <= ROOT_CLUSTER_TOLERANCE * z.re.abs().max(1.0))
        .map(|z| z.re)
        .filter(|x| x.is_finite())
        .collect();
    reals.sort_by(|a, b| a.total_cmp(b));
    reals
}

/// Evaluate `p` at `x` (Horner).
pub fn eval(p: &[f64], x: f64) -> f64 {
    p.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Evaluate the derivative of `p` at `x`.
pub fn eval_derivative(p: &[f64], x: f64) -> f64 {
    p.iter()
        .enumerate()
        .skip(1)
        .rev()
        .fold(0.0, |acc, (k, &c)| acc * x + k as f64 * c)
}

/// Relative residual `|p(x)| / Σ|p_k||x|^k`, the error measure the solvers
/// are held to.
pub fn relative_residual(p: &[f64], x: Complex64) -> f64 {
    let value = eval_complex(p, x).norm();
    let scale = p
        .iter()
        .enumerate()
        .map(|(k, c)| c.abs() * x.norm().powi(k as i32))
        .sum::<f64>();
    if scale == 0.0 {
        value
    } else {
        value / scale
    }
}

// =============================================================================
// Closed forms
// =============================================================================

fn closed_form(p: &[f64]) -> Vec<Complex64> {
    match p.len().saturating_sub(1) {
        0 => Vec::new(),
        1 => vec![Complex64::new(-p[0] / p[1], 0.0)],
        2 => quadratic_roots(p[0], p[1], p[2]),
        3 => cubic_roots(p[0], p[1], p[2], p[3]),
        4 => quartic_roots(p[0], p[1], p[2], p[3], p[4]),
        degree => {
            debug_assert!(false, "polynomial degree {} not supported", degree);
            Vec::new()
        }
    }
}

fn effective_degree(p: &[f64]) -> usize {
    let scale = p.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return 0;
    }
    let mut degree = p.len().saturating_sub(1);
    while degree > 0 && p[degree].abs() <= LEADING_COEFFICIENT_TOLERANCE * scale {
        degree -= 1;
    }
    degree
}

fn quadratic_roots(c: f64, b: f64, a: f64) -> Vec<Complex64> {
    let disc = b * b - 4.0 * a * c;
    if disc >= 0.0 {
        // Avoid cancellation between -b and the square root.
        let q = -0.5 * (b + b.signum() * disc.sqrt());
        if q == 0.0 {
            return vec![Complex64::new(0.0, 0.0), Complex64::new(0.0, 0.0)];
        }
        vec![Complex64::new(q / a, 0.0), Complex64::new(c / q, 0.0)]
    } else {
        let re = -b / (2.0 * a);
        let im = (-disc).sqrt() / (2.0 * a);
        vec![Complex64::new(re, im), Complex64::new(re, -im)]
    }
}

fn cubic_roots(d: f64, c: f64, b: f64, a: f64) -> Vec<Complex64> {
    let (a, b, c) = (b / a, c / a, d / a);
    // x³ + a x² + b x + c
    let q = (a * a - 3.0 * b) / 9.0;
    let r = (2.0 * a * a * a - 9.0 * a * b + 27.0 * c) / 54.0;
    let q3 = q * q * q;
    let shift = a / 3.0;

    if r * r < q3 {
        // Three distinct real roots.
        let theta = (r / q3.sqrt()).clamp(-1.0, 1.0).acos();
        let m = -2.0 * q.sqrt();
        let tau = 2.0 * std::f64::consts::PI;
        [theta, theta + tau, theta - tau]
            .iter()
            .map(|t| Complex64::new(m * (t / 3.0).cos() - shift, 0.0))
            .collect()
    } else {
        let big_a = -r.signum() * (r.abs() + (r * r - q3).sqrt()).cbrt();
        let big_b = if big_a == 0.0 { 0.0 } else { q / big_a };
        let real = big_a + big_b - shift;
        let re = -0.5 * (big_a + big_b) - shift;
        let im = 0.5 * 3.0_f64.sqrt() * (big_a - big_b);
        vec![
            Complex64::new(real, 0.0),
            Complex64::new(re, im),
            Complex64::new(re, -im),
        ]
    }
}

fn quartic_roots(e: f64, d: f64, c: f64, b: f64, a: f64) -> Vec<Complex64> {
    let (a, b, c, d) = (b / a, c / a, d / a, e / a);
    let a2 = a * a;
    let p = b - 3.0 * a2 / 8.0;
    let q = c - a * b / 2.0 + a2 * a / 8.0;
    let r = d - a * c / 4.0 + a2 * b / 16.0 - 3.0 * a2 * a2 / 256.0;
    let shift = Complex64::new(a / 4.0, 0.0);

    let scale = p.abs().max(r.abs().sqrt()).max(1e-300);
    if q.abs() <= 1e-14 * scale.powf(1.5) {
        return biquadratic_roots(p, r, shift);
    }
    let m = resolvent_root(p, q, r);
    if !(m > 0.0) {
        // The resolvent has a positive root whenever q != 0; rounding can
        // push it to zero for vanishing q, where the biquadratic form holds.
        return biquadratic_roots(p, r, shift);
    }
    let s = (2.0 * m).sqrt();
    let h = q / (2.0 * s);
    let (mut plus, mut minus) = (p / 2.0 + m + h, p / 2.0 + m - h);
    // plus · minus = r
    if plus.abs() >= minus.abs() {
        minus = if plus == 0.0 { 0.0 } else { r / plus };
    } else {
        plus = r / minus;
    }
    let mut ys = quadratic_roots(plus, -s, 1.0);
    ys.extend(quadratic_roots(minus, s, 1.0));
    ys.into_iter().map(|y| y - shift).collect()
}

/// Largest real root of the resolvent cubic, Newton-polished.
fn resolvent_root(p: f64, q: f64, r: f64) -> f64 {
    let resolvent = [-q * q / 8.0, p * p / 4.0 - r, p, 1.0];
    let mut m = cubic_roots(resolvent[0], resolvent[1], resolvent[2], resolvent[3])
        .into_iter()
        .filter(|z| z.im == 0.0)
        .map(|z| z.re)
        .fold(f64::NEG_INFINITY, f64::max);
    if !m.is_finite() {
        return m;
    }
    let mut value = eval(&resolvent, m);
    for _ in 0..RESOLVENT_ITERATIONS {
        let slope = eval_derivative(&resolvent, m);
        if value == 0.0 || slope == 0.0 {
            break;
        }
        let next = m - value / slope;
        let next_value = eval(&resolvent, next);
        if !(next_value.abs() < value.abs()) {
            break;
        }
        m = next;
        value = next_value;
    }
    m
}

/// `y⁴ + p y² + r`: solve for `z = y²`, then take both square roots.
fn biquadratic_roots(p: f64, r: f64, shift: Complex64) -> Vec<Complex64> {
    quadratic_roots(r, p, 1.0)
        .into_iter()
        .flat_map(|z| {
            let s = z.sqrt();
            [s - shift, -s - shift]
        })
        .collect()
}

fn eval_complex(p: &[f64], x: Complex64) -> Complex64 {
    p.iter()
        .rev()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * x + c)
}

fn eval_complex_derivative(p: &[f64], x: Complex64) -> Complex64 {
    p.iter()
        .enumerate()
        .skip(1)
        .rev()
        .fold(Complex64::new(0.0, 0.0), |acc, (k, &c)| acc * x + k as f64 * c)
}

/// Newton refinement that only keeps steps which reduce the residual.
fn polish(p: &[f64], mut z: Complex64) -> Complex64 {
    let mut residual = eval_complex(p, z).norm();
    for _ in 0..POLISH_ITERATIONS {
        if residual == 0.0 {
            break;
        }
        let dp = eval_complex_derivative(p, z);
        if dp.norm() == 0.0 {
            break;
        }
        let candidate = z - eval_complex(p, z) / dp;
        let candidate_residual = eval_complex(p, candidate).norm();
        if !(candidate_residual < residual) {
            break;
        }
        z = candidate;
        residual = candidate_residual;
    }
    z
}

// =============================================================================
// Tests
// =============================================================================
