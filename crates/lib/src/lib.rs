//! mumps-lib: build recipe for the MUMPS sparse direct solver
//!
//! This crate turns a set of feature toggles and dependency locations into a
//! Makefile-driven native build:
//! - `Toggles`: which optional features (MPI, Scotch, METIS, OpenBLAS) are on
//! - `Resolution`: the selected `Makefile.inc` template plus ordered make arguments
//! - `formula`: fetch, build, install and verify the library end to end

pub mod build;
pub mod compilers;
pub mod consts;
pub mod deps;
pub mod exec;
pub mod formula;
pub mod install;
pub mod platform;
pub mod resolve;
pub mod source;
pub mod toggles;
pub mod verify;

pub use compilers::Compilers;
pub use deps::{Dependency, DependencyLocation, DependencyTable};
pub use resolve::{BuildArgs, Resolution, ResolveError, ResolveInput, Template, resolve};
pub use toggles::{Feature, Toggle, Toggles};
