//! Template lines and their classification

pub mod classifier;
pub mod line;

pub use classifier::TemplateClassifier;
pub use line::{Classification, TemplateLine};
