//! The student-admission provisioning pipeline.
//!
//! Drives a batch of [`AdmissionCandidate`]s through admission-record
//! creation in the admissions store and identity provisioning in the
//! institute store. The two stores share no transaction boundary; the
//! pipeline is built around that gap rather than pretending it away — see
//! [`AdmissionPipeline`] for the exact per-candidate step order and the
//! retry-forward recovery semantics.
//!
//! [`AdmissionCandidate`]: matric_core::admission::AdmissionCandidate

mod pipeline;

pub use pipeline::{AdmissionPipeline, ErrorPolicy, PipelineConfig};
