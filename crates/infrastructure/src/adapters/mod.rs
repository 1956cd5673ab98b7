//! Adapters implementing application ports

mod inference_adapter;

pub use inference_adapter::{DisabledInference, EngineInferenceAdapter, build_inference_port};
