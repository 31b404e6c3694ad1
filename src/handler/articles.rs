//! Article handlers
//!
//! One handler per route. Each performs at most one store call and turns
//! the outcome into a rendered page, a redirect or a short text body.

use hyper::StatusCode;
use serde::Serialize;

use super::router::RequestContext;
use crate::config::AppState;
use crate::http::{self, HttpResponse};
use crate::logger;
use crate::middleware::{ArticleForm, FieldError, FlashMessage, FormFields};
use crate::routing::Route;
use crate::store::{Article, StoreError};
use crate::views::Page;

const LIST_UNAVAILABLE: &str = "Articles could not be loaded right now. Please try again later.";

#[derive(Serialize)]
struct IndexView {
    articles: Vec<Article>,
}

#[derive(Serialize)]
struct ArticleView {
    article: Article,
}

#[derive(Serialize)]
struct FormView {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    form: ArticleForm,
    errors: Vec<FieldError>,
}

#[derive(Serialize)]
struct ErrorView<'a> {
    status: u16,
    message: &'a str,
}

/// Run the handler for a matched route
pub async fn dispatch(
    route: Route,
    fields: FormFields,
    ctx: &RequestContext,
    state: &AppState,
) -> HttpResponse {
    match route {
        Route::ListArticles => list_articles(ctx, state).await,
        Route::NewArticleForm => new_article_form(ctx, state).await,
        Route::CreateArticle => create_article(&fields, ctx, state).await,
        Route::ShowArticle(id) => show_article(&id, ctx, state).await,
        Route::EditArticleForm(id) => edit_article_form(&id, ctx, state).await,
        Route::UpdateArticle(id) => update_article(&id, &fields, ctx, state).await,
        Route::DeleteArticle(id) => delete_article(&id, state).await,
    }
}

async fn list_articles(ctx: &RequestContext, state: &AppState) -> HttpResponse {
    match state.store.list().await {
        Ok(articles) => {
            render_page(ctx, state, StatusCode::OK, "index", "Articles", IndexView { articles })
                .await
        }
        Err(e) => {
            log_store_failure("list", &e);
            // The session's own pending flash waits for the next page
            let view = IndexView {
                articles: Vec::new(),
            };
            render_view(
                ctx,
                state,
                StatusCode::SERVICE_UNAVAILABLE,
                "index",
                Page {
                    title: "Articles",
                    flash: Some(FlashMessage::danger(LIST_UNAVAILABLE)),
                    data: view,
                },
            )
        }
    }
}

async fn new_article_form(ctx: &RequestContext, state: &AppState) -> HttpResponse {
    let view = FormView {
        id: None,
        form: ArticleForm::default(),
        errors: Vec::new(),
    };
    render_page(ctx, state, StatusCode::OK, "add_article", "Add Article", view).await
}

async fn create_article(fields: &FormFields, ctx: &RequestContext, state: &AppState) -> HttpResponse {
    let form = ArticleForm::from_fields(fields);
    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            logger::log_debug(&format!("Rejected new article: {} invalid field(s)", errors.len()));
            let view = FormView {
                id: None,
                form,
                errors,
            };
            return render_page(ctx, state, StatusCode::BAD_REQUEST, "add_article", "Add Article", view)
                .await;
        }
    };

    match state.store.create(valid).await {
        Ok(article) => {
            logger::log_debug(&format!("Created article {}", article.id));
            state
                .flash
                .set(ctx.session.id, FlashMessage::success("Article Added"))
                .await;
            http::build_redirect_response("/")
        }
        Err(e) => store_error_page(ctx, state, "create", &e).await,
    }
}

async fn show_article(id: &str, ctx: &RequestContext, state: &AppState) -> HttpResponse {
    match state.store.get(id).await {
        Ok(article) => {
            let title = article.title.clone();
            render_page(ctx, state, StatusCode::OK, "article", &title, ArticleView { article })
                .await
        }
        Err(e) => store_error_page(ctx, state, "get", &e).await,
    }
}

async fn edit_article_form(id: &str, ctx: &RequestContext, state: &AppState) -> HttpResponse {
    match state.store.get(id).await {
        Ok(article) => {
            let view = FormView {
                id: Some(article.id.to_string()),
                form: ArticleForm {
                    title: article.title,
                    author: article.author,
                    body: article.body,
                },
                errors: Vec::new(),
            };
            render_page(ctx, state, StatusCode::OK, "edit_article", "Edit Article", view).await
        }
        Err(e) => store_error_page(ctx, state, "get", &e).await,
    }
}

async fn update_article(
    id: &str,
    fields: &FormFields,
    ctx: &RequestContext,
    state: &AppState,
) -> HttpResponse {
    let form = ArticleForm::from_fields(fields);
    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            let view = FormView {
                id: Some(id.to_string()),
                form,
                errors,
            };
            return render_page(ctx, state, StatusCode::BAD_REQUEST, "edit_article", "Edit Article", view)
                .await;
        }
    };

    match state.store.replace_fields(id, valid).await {
        Ok(article) => {
            logger::log_debug(&format!("Updated article {}", article.id));
            state
                .flash
                .set(ctx.session.id, FlashMessage::success("Article Updated"))
                .await;
            http::build_redirect_response("/")
        }
        Err(e) => store_error_page(ctx, state, "replace", &e).await,
    }
}

/// Answered to a script, so errors are plain text rather than pages
async fn delete_article(id: &str, state: &AppState) -> HttpResponse {
    match state.store.delete(id).await {
        Ok(removed) => {
            if !removed {
                logger::log_debug(&format!("Delete matched nothing: {id}"));
            }
            http::build_text_response(StatusCode::OK, "Success", false)
        }
        Err(e) => {
            log_store_failure("delete", &e);
            http::build_text_response(e.status(), &e.to_string(), false)
        }
    }
}

/// Render the error page for a status without touching the store
pub async fn error_page(
    ctx: &RequestContext,
    state: &AppState,
    status: StatusCode,
    message: &str,
) -> HttpResponse {
    let title = status.canonical_reason().unwrap_or("Error");
    let view = ErrorView {
        status: status.as_u16(),
        message,
    };
    render_page(ctx, state, status, "error", title, view).await
}

async fn store_error_page(
    ctx: &RequestContext,
    state: &AppState,
    action: &str,
    err: &StoreError,
) -> HttpResponse {
    log_store_failure(action, err);
    let message = match err {
        StoreError::NotFound(_) => "The article you are looking for does not exist.",
        StoreError::InvalidId(_) => "That is not a valid article id.",
        StoreError::Unavailable(_) | StoreError::InvalidConnection(_) => {
            "The article store is unavailable. Please try again later."
        }
    };
    error_page(ctx, state, err.status(), message).await
}

fn log_store_failure(action: &str, err: &StoreError) {
    match err {
        StoreError::Unavailable(_) | StoreError::InvalidConnection(_) => {
            logger::log_error(&format!("Store {action} failed: {err}"));
        }
        StoreError::NotFound(_) | StoreError::InvalidId(_) => {
            logger::log_debug(&format!("Store {action}: {err}"));
        }
    }
}

/// Render a view inside the layout, consuming the session's flash
///
/// HEAD requests leave the flash in place for the following GET.
async fn render_page<T: Serialize>(
    ctx: &RequestContext,
    state: &AppState,
    status: StatusCode,
    view: &str,
    title: &str,
    data: T,
) -> HttpResponse {
    let flash = if ctx.is_head {
        None
    } else {
        state.flash.take(ctx.session.id).await
    };
    render_view(ctx, state, status, view, Page { title, flash, data })
}

fn render_view<T: Serialize>(
    ctx: &RequestContext,
    state: &AppState,
    status: StatusCode,
    view: &str,
    page: Page<'_, T>,
) -> HttpResponse {
    match state.views.render(view, &page) {
        Ok(html) => http::build_html_response(status, html, ctx.is_head),
        Err(e) => {
            logger::log_error(&e.to_string());
            http::build_500_response()
        }
    }
}
