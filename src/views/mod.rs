//! View rendering module
//!
//! Handlebars registry holding the page templates. Templates are compiled
//! into the binary; a configured directory may override any of them with a
//! `<name>.hbs` file.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::logger;
use crate::middleware::FlashMessage;

/// Partials first: pages reference them by name
const PARTIALS: [(&str, &str); 2] = [
    ("layout", include_str!("../../templates/layout.hbs")),
    ("form_fields", include_str!("../../templates/form_fields.hbs")),
];

const PAGES: [(&str, &str); 5] = [
    ("index", include_str!("../../templates/index.hbs")),
    ("article", include_str!("../../templates/article.hbs")),
    ("add_article", include_str!("../../templates/add_article.hbs")),
    ("edit_article", include_str!("../../templates/edit_article.hbs")),
    ("error", include_str!("../../templates/error.hbs")),
];

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("template '{name}' failed to compile: {source}")]
    Template {
        name: String,
        #[source]
        source: Box<TemplateError>,
    },

    #[error("failed to read template override {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: Box<RenderError>,
    },
}

/// Common page envelope: every view gets `title` and the consumed flash
#[derive(Debug, Serialize)]
pub struct Page<'a, T: Serialize> {
    pub title: &'a str,
    pub flash: Option<FlashMessage>,
    #[serde(flatten)]
    pub data: T,
}

pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    /// Built-in templates only
    pub fn builtin() -> Result<Self, ViewError> {
        Self::load(None)
    }

    /// Built-in templates, replaced by `<dir>/<name>.hbs` where present
    pub fn load(override_dir: Option<&Path>) -> Result<Self, ViewError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);

        for (name, builtin) in PARTIALS {
            let source = Self::source_for(override_dir, name, builtin)?;
            registry
                .register_partial(name, source)
                .map_err(|e| ViewError::Template {
                    name: name.to_string(),
                    source: Box::new(e),
                })?;
        }

        for (name, builtin) in PAGES {
            let source = Self::source_for(override_dir, name, builtin)?;
            registry
                .register_template_string(name, source)
                .map_err(|e| ViewError::Template {
                    name: name.to_string(),
                    source: Box::new(e),
                })?;
        }

        Ok(Self { registry })
    }

    fn source_for(
        override_dir: Option<&Path>,
        name: &str,
        builtin: &'static str,
    ) -> Result<String, ViewError> {
        let Some(dir) = override_dir else {
            return Ok(builtin.to_string());
        };

        let path = dir.join(format!("{name}.hbs"));
        if !path.is_file() {
            return Ok(builtin.to_string());
        }

        logger::log_info(&format!("[Views] Using override {}", path.display()));
        std::fs::read_to_string(&path).map_err(|e| ViewError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String, ViewError> {
        self.registry
            .render(name, context)
            .map_err(|e| ViewError::Render {
                name: name.to_string(),
                source: Box::new(e),
            })
    }

    #[cfg(test)]
    pub fn has_view(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(title: &str, flash: Option<FlashMessage>, data: serde_json::Value) -> Page<'_, serde_json::Value> {
        Page { title, flash, data }
    }

    #[test]
    fn test_builtin_views_register() {
        let views = Views::builtin().unwrap();
        for (name, _) in PAGES {
            assert!(views.has_view(name), "missing view {name}");
        }
    }

    #[test]
    fn test_index_lists_articles_and_escapes() {
        let views = Views::builtin().unwrap();
        let html = views
            .render(
                "index",
                &page(
                    "Articles",
                    None,
                    json!({ "articles": [{ "id": "abc", "title": "<b>One</b>" }] }),
                ),
            )
            .unwrap();
        assert!(html.contains("<title>Articles | kbase</title>"));
        assert!(html.contains("href=\"/article/abc\""));
        assert!(html.contains("&lt;b&gt;One&lt;/b&gt;"));
    }

    #[test]
    fn test_empty_index() {
        let views = Views::builtin().unwrap();
        let html = views
            .render("index", &page("Articles", None, json!({ "articles": [] })))
            .unwrap();
        assert!(html.contains("No articles yet."));
    }

    #[test]
    fn test_flash_rendered_in_layout() {
        let views = Views::builtin().unwrap();
        let html = views
            .render(
                "index",
                &page(
                    "Articles",
                    Some(FlashMessage::success("Article Added")),
                    json!({ "articles": [] }),
                ),
            )
            .unwrap();
        assert!(html.contains("alert-success"));
        assert!(html.contains("Article Added"));
    }

    #[test]
    fn test_form_shows_errors_and_values() {
        let views = Views::builtin().unwrap();
        let html = views
            .render(
                "add_article",
                &page(
                    "Add Article",
                    None,
                    json!({
                        "form": { "title": "Kept", "author": "", "body": "" },
                        "errors": [{ "field": "author", "message": "Author is required" }]
                    }),
                ),
            )
            .unwrap();
        assert!(html.contains("value=\"Kept\""));
        assert!(html.contains("Author is required"));
        assert!(html.contains("action=\"/articles/add\""));
    }

    #[test]
    fn test_override_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("error.hbs"), "custom {{status}}").unwrap();
        let views = Views::load(Some(dir.path())).unwrap();
        let html = views
            .render("error", &page("Oops", None, json!({ "status": 404 })))
            .unwrap();
        assert_eq!(html, "custom 404");
    }

    #[test]
    fn test_broken_override_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.hbs"), "{{#each articles}}").unwrap();
        assert!(matches!(
            Views::load(Some(dir.path())),
            Err(ViewError::Template { .. })
        ));
    }
}
