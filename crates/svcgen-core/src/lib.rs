//! svcgen Core Library
//!
//! This library turns declaratively annotated service-interface descriptions
//! into Rust client implementations that send their requests through a
//! pluggable `HttpPipeline` from the `svcgen-runtime` crate.

pub mod builder;
pub mod classify;
pub mod config;
pub mod emit;
pub mod error;
pub mod generate;
pub mod interface;
pub mod model;
pub mod resolver;
pub mod templates;
pub mod utils;

pub use crate::{
    builder::DescriptorBuilder,
    config::Config,
    emit::Emitter,
    error::{Error, Result},
    generate::{Diagnostic, GeneratedFile, GenerationReport, Generator, generate},
    interface::InterfaceDocument,
    model::{MethodDescriptor, ServiceModel},
    resolver::{ImportTable, Resolver},
    templates::{TemplateDir, TemplateManager},
};
