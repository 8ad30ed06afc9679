//! Directory-backed template renderer
//!
//! Every `<name>.<extension>` file in the template directory becomes the
//! handlebars template `<name>` (e.g. `Reservation_short.txt`). Templates
//! see the bindings `{type, id, entity}`, so `{{entity.guest}}` reads a field.
//! Output is not HTML-escaped, and unknown paths render as empty text.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use entity_tools_application::ports::template::TemplateRenderer;
use handlebars::Handlebars;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Could not read template directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid template '{name}': {source}")]
    Template {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },
}

pub struct DirectoryTemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl DirectoryTemplateRenderer {
    /// Load every `*.{extension}` file in `dir`
    pub fn from_dir(dir: impl AsRef<Path>, extension: &str) -> Result<Self, TemplateError> {
        let dir = dir.as_ref();
        let io_error = |source| TemplateError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut templates = HashMap::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let body = std::fs::read_to_string(&path).map_err(|source| TemplateError::Io {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(template = name, path = %path.display(), "Loaded template");
            templates.insert(name.to_string(), body.trim_end().to_string());
        }

        let renderer = Self::from_map(templates)?;
        tracing::info!(
            dir = %dir.display(),
            templates = renderer.len(),
            "Template directory loaded"
        );
        Ok(renderer)
    }

    pub fn from_map(templates: HashMap<String, String>) -> Result<Self, TemplateError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_helper("json", Box::new(json_helper));

        for (name, body) in templates {
            handlebars
                .register_template_string(&name, body)
                .map_err(|source| TemplateError::Template {
                    name: name.clone(),
                    source: Box::new(source),
                })?;
        }
        Ok(Self { handlebars })
    }

    pub fn len(&self) -> usize {
        self.handlebars.get_templates().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }
}

impl TemplateRenderer for DirectoryTemplateRenderer {
    fn render(&self, name: &str, bindings: &Value) -> Option<String> {
        if !self.contains(name) {
            return None;
        }
        match self.handlebars.render(name, bindings) {
            Ok(rendered) => Some(rendered),
            Err(e) => {
                tracing::debug!(template = name, error = %e, "Template failed to render");
                None
            }
        }
    }
}

/// `{{json entity}}`: compact JSON of any bound value
fn json_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    if let Some(v) = h.param(0) {
        out.write(&serde_json::to_string(v.value()).unwrap_or_default())?;
    }
    Ok(())
}
