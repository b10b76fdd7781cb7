use askama::Template;

use crate::options::{ErrorCorrection, RenderOptions};
use crate::payload::Category;

pub struct CategoryOption {
    pub slug: &'static str,
    pub label: &'static str,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// The generator form, optionally with an inline error.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub categories: Vec<CategoryOption>,
    pub levels: Vec<&'static str>,
    pub module_size: u32,
    pub border: u32,
    pub fill_color: String,
    pub background_color: String,
    pub error: Option<String>,
}

impl IndexTemplate {
    pub fn new() -> Self {
        let defaults = RenderOptions::default();
        Self {
            categories: Category::ALL
                .into_iter()
                .map(|c| CategoryOption {
                    slug: c.slug(),
                    label: c.label(),
                })
                .collect(),
            levels: ErrorCorrection::ALL.into_iter().map(ErrorCorrection::letter).collect(),
            module_size: defaults.module_size,
            border: defaults.border_modules,
            fill_color: defaults.fill_color.to_string(),
            background_color: defaults.background_color.to_string(),
            error: None,
        }
    }

    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::new()
        }
    }
}

impl Default for IndexTemplate {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Template)]
#[template(path = "result.html")]
pub struct ResultTemplate {
    pub category: &'static str,
    pub payload: String,
    pub image_src: String,
    pub width: u32,
    pub height: u32,
    pub file_name: &'static str,
}

pub struct BulkRow {
    pub line: usize,
    pub payload: String,
    pub image_src: Option<String>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "bulk.html")]
pub struct BulkTemplate {
    pub rows: Vec<BulkRow>,
    pub succeeded: usize,
    pub failed: usize,
}
