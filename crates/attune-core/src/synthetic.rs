//! Analytical reference model and transform for validation.
//!
//! Production users plug in their own solver and digital-filter transform
//! behind the [`ForwardModel`] and [`TimeTransform`] traits. For tests and
//! the CLI demo this module provides collaborators with known closed forms:
//!
//! - [`DebyeRelaxation`]: a sum of first-order relaxation terms,
//!   $F(f) = \sum_k A_k / (1 + i f / f_k)$ — smooth, with the peaked
//!   imaginary part the adaptive selection is designed for, and an exact
//!   time-domain counterpart (a sum of decaying exponentials).
//! - [`QuadratureTransform`]: a piecewise-linear (Filon-type) sine/cosine
//!   transform. Good enough to validate the pipeline end to end; not a
//!   substitute for a production digital linear filter.

use num_complex::Complex64;

use crate::adaptive::{CollaboratorError, ForwardModel, TimeTransform};
use crate::types::SignalKind;

/// One first-order relaxation: amplitude and corner frequency.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct RelaxationTerm {
    /// Low-frequency amplitude $A_k$.
    pub amplitude: f64,
    /// Corner frequency $f_k$ (Hz); |Im F| of the term peaks here.
    pub frequency_hz: f64,
}

/// Sum-of-Debye-relaxations forward model.
#[derive(Debug, Clone)]
pub struct DebyeRelaxation {
    terms: Vec<RelaxationTerm>,
}

impl DebyeRelaxation {
    pub fn new(terms: Vec<RelaxationTerm>) -> Self {
        Self { terms }
    }

    /// A single unit relaxation at `frequency_hz`.
    pub fn single(frequency_hz: f64) -> Self {
        Self::new(vec![RelaxationTerm {
            amplitude: 1.0,
            frequency_hz,
        }])
    }

    /// The exact impulse response: $h(t) = \sum_k A_k \omega_k e^{-\omega_k t}$
    /// with $\omega_k = 2\pi f_k$, for $t \ge 0$.
    pub fn impulse_response(&self, t: f64) -> f64 {
        self.terms
            .iter()
            .map(|term| {
                let omega = 2.0 * std::f64::consts::PI * term.frequency_hz;
                term.amplitude * omega * (-omega * t).exp()
            })
            .sum()
    }

    /// The exact switch-on (step) response:
    /// $s(t) = \sum_k A_k (1 - e^{-\omega_k t})$ for $t \ge 0$.
    pub fn step_response(&self, t: f64) -> f64 {
        self.terms
            .iter()
            .map(|term| {
                let omega = 2.0 * std::f64::consts::PI * term.frequency_hz;
                term.amplitude * (1.0 - (-omega * t).exp())
            })
            .sum()
    }
}

impl ForwardModel for DebyeRelaxation {
    fn evaluate(&self, frequencies: &[f64]) -> Result<Vec<Complex64>, CollaboratorError> {
        Ok(frequencies
            .iter()
            .map(|&f| {
                self.terms
                    .iter()
                    .map(|term| {
                        Complex64::from(term.amplitude)
                            / Complex64::new(1.0, f / term.frequency_hz)
                    })
                    .sum()
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Debye relaxation model"
    }
}

/// Piecewise-linear (Filon-type) sine/cosine transform of a causal spectrum.
///
/// For a real causal response with spectrum $F(\omega)$:
///
/// - impulse:    $h(t) = -\frac{2}{\pi}\int_0^\infty \Im F \sin(\omega t)\,d\omega$
/// - switch-on:  $s(t) = \frac{2}{\pi}\int_0^\infty \frac{\Re F}{\omega}\sin(\omega t)\,d\omega$
/// - switch-off: $s(t) = -\frac{2}{\pi}\int_0^\infty \frac{\Im F}{\omega}\cos(\omega t)\,d\omega$
///
/// The smooth factor is taken linear on each grid panel and the
/// $\sin/\cos$ moments are integrated analytically, so unresolved
/// oscillations at large $\omega t$ do not wreck the quadrature the way a
/// plain trapezoid rule on a log grid would.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadratureTransform;

impl QuadratureTransform {
    /// $\int_a^b (g_a + s(\omega - a)) \sin(\omega t)\,d\omega$ for linear
    /// interpolation of $g$ between the panel ends.
    fn panel_sin(a: f64, b: f64, ga: f64, gb: f64, t: f64) -> f64 {
        let s = (gb - ga) / (b - a);
        // ∫ sin(ωt) dω and ∫ ω sin(ωt) dω over [a, b]
        let int_sin = ((a * t).cos() - (b * t).cos()) / t;
        let int_w_sin = (b * t).sin() / (t * t) - b * (b * t).cos() / t
            - ((a * t).sin() / (t * t) - a * (a * t).cos() / t);
        (ga - s * a) * int_sin + s * int_w_sin
    }

    /// $\int_a^b (g_a + s(\omega - a)) \cos(\omega t)\,d\omega$.
    fn panel_cos(a: f64, b: f64, ga: f64, gb: f64, t: f64) -> f64 {
        let s = (gb - ga) / (b - a);
        let int_cos = ((b * t).sin() - (a * t).sin()) / t;
        let int_w_cos = (b * t).cos() / (t * t) + b * (b * t).sin() / t
            - ((a * t).cos() / (t * t) + a * (a * t).sin() / t);
        (ga - s * a) * int_cos + s * int_w_cos
    }
}

impl TimeTransform for QuadratureTransform {
    fn to_time(
        &self,
        freq_grid: &[f64],
        spectrum: &[Complex64],
        time_grid: &[f64],
        signal: SignalKind,
    ) -> Result<Vec<f64>, CollaboratorError> {
        if freq_grid.len() != spectrum.len() {
            return Err(format!(
                "frequency grid ({}) and spectrum ({}) lengths differ",
                freq_grid.len(),
                spectrum.len()
            )
            .into());
        }
        if freq_grid.len() < 2 {
            return Err("frequency grid needs at least 2 points".into());
        }

        let two_pi = 2.0 * std::f64::consts::PI;
        let omegas: Vec<f64> = freq_grid.iter().map(|&f| two_pi * f).collect();

        // The slowly varying factor of the integrand, per signal kind.
        let smooth: Vec<f64> = omegas
            .iter()
            .zip(spectrum.iter())
            .map(|(&w, f)| match signal {
                SignalKind::Impulse => -f.im,
                SignalKind::SwitchOn => f.re / w,
                SignalKind::SwitchOff => -f.im / w,
            })
            .collect();

        let out = time_grid
            .iter()
            .map(|&t| {
                if t == 0.0 {
                    // sin(ωt) vanishes; cos(ωt) = 1 reduces to a plain
                    // trapezoid of the smooth factor.
                    return match signal {
                        SignalKind::SwitchOff => {
                            let mut acc = 0.0;
                            for i in 0..omegas.len() - 1 {
                                acc += 0.5
                                    * (smooth[i] + smooth[i + 1])
                                    * (omegas[i + 1] - omegas[i]);
                            }
                            acc * 2.0 / std::f64::consts::PI
                        }
                        _ => 0.0,
                    };
                }
                let mut acc = 0.0;
                for i in 0..omegas.len() - 1 {
                    let (a, b) = (omegas[i], omegas[i + 1]);
                    acc += match signal {
                        SignalKind::Impulse | SignalKind::SwitchOn => {
                            Self::panel_sin(a, b, smooth[i], smooth[i + 1], t)
                        }
                        SignalKind::SwitchOff => {
                            Self::panel_cos(a, b, smooth[i], smooth[i + 1], t)
                        }
                    };
                }
                acc * 2.0 / std::f64::consts::PI
            })
            .collect();
        Ok(out)
    }
}
