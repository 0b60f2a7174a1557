//! # Attune Core
//!
//! Adaptive frequency selection for time-domain electromagnetic modelling.
//!
//! Frequency-to-time transforms need the frequency-domain response on a dense
//! grid, but each forward-model evaluation is expensive. This crate grows a
//! small set of frequency samples one at a time: a leave-one-out interpolation
//! test scores how predictable each sample is from its neighbours, and a
//! refinement rule places exactly one new frequency per iteration until every
//! sample is reproducible within a relative tolerance. The converged set is
//! then interpolated onto the transform's required grid with a
//! shape-preserving cubic.
//!
//! ## Architecture
//!
//! The expensive collaborators are behind traits: the forward solver
//! ([`adaptive::ForwardModel`]) and the frequency-to-time transform
//! ([`adaptive::TimeTransform`]). The [`adaptive::AdaptiveLoop`] drives the
//! evaluate–interpolate–transform cycle; [`adaptive::adaptive_select`] is the
//! one-call entry point.
//!
//! ## Modules
//!
//! - [`types`] — Core data structures (samples, parameters, results).
//! - [`interpolate`] — Monotone (PCHIP) interpolation with anchor and
//!   boundary-ramp extensions.
//! - [`estimator`] — Leave-one-out error estimation.
//! - [`refine`] — The single-candidate refinement rule.
//! - [`seed`] — Initial frequency selection.
//! - [`adaptive`] — Collaborator traits and the adaptive loop.
//! - [`synthetic`] — Analytical reference model and transform for validation.

pub mod adaptive;
pub mod estimator;
pub mod interpolate;
pub mod refine;
pub mod seed;
pub mod synthetic;
pub mod types;
