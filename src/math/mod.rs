//! This module provides the numerical infrastructure and physical constants for the ionize library.
//!
//! It contains the constants shared by the solvent, species and solution models, a small dense
//! polynomial type used to assemble and solve the charge-balance equation, and the root finders
//! shared by the equilibrium, titration and displacement solvers.

/// Physical and empirical constants used throughout the library.
pub mod constants;

/// Real polynomials in ascending coefficient order, with convolution and positive root isolation.
pub mod polynomial;

/// Bracketed, unbracketed and multivariate root finders.
pub mod roots;
