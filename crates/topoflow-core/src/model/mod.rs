//! Data model

mod image;
mod request;
mod service;

pub use image::ImageReference;
pub use request::{Cell, DeployRequest, DeployResponse, Graph, SERVICE_CELL_TYPE, ServiceEntry};
pub use service::{
    DEFAULT_PORT, DEFAULT_TAG, EnvValue, Service, ServiceConfig, logical_name, slugify,
};
