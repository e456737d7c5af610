use askama::Template;
use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use std::sync::Arc;

use crate::{
    auth::{CurrentUser, RequireUser},
    csrf::CsrfToken,
    db,
    forms::{FormErrors, PostForm},
    models::{post_url, profile_url},
    pagination::{PageQuery, Paginator},
    Error, Result,
};

use super::templates::{
    AboutAuthorTemplate, AboutTechTemplate, GroupTemplate, IndexTemplate, Layout,
    PostDetailTemplate, PostFormTemplate, ProfileTemplate,
};
use super::AppState;

pub(super) fn render<T: Template>(template: &T) -> Result<Response> {
    Ok(Html(template.render()?).into_response())
}

/// Post ids that are not integers cannot name a post.
fn parse_post_id(raw: &str) -> Result<i64> {
    raw.parse::<i64>().map_err(|_| Error::NotFound)
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    CurrentUser(viewer): CurrentUser,
    csrf: CsrfToken,
    Query(query): Query<PageQuery>,
) -> Result<Response> {
    let paginator = Paginator::new(db::posts::count(&state.db).await?, state.page_limit);
    let number = paginator.resolve(query.page.as_deref());
    let posts = db::posts::list(&state.db, paginator.limit(), paginator.offset(number)).await?;

    render(&IndexTemplate {
        layout: Layout::new(viewer, csrf),
        page: paginator.page(number, posts),
    })
}

pub async fn group_posts(
    State(state): State<Arc<AppState>>,
    CurrentUser(viewer): CurrentUser,
    csrf: CsrfToken,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response> {
    let group = db::groups::find_by_slug(&state.db, &slug)
        .await?
        .ok_or(Error::NotFound)?;

    let total = db::posts::count_by_group(&state.db, group.id).await?;
    let paginator = Paginator::new(total, state.page_limit);
    let number = paginator.resolve(query.page.as_deref());
    let posts = db::posts::list_by_group(
        &state.db,
        group.id,
        paginator.limit(),
        paginator.offset(number),
    )
    .await?;

    render(&GroupTemplate {
        layout: Layout::new(viewer, csrf),
        group,
        page: paginator.page(number, posts),
    })
}

pub async fn profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(viewer): CurrentUser,
    csrf: CsrfToken,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response> {
    let author = db::users::find_by_username(&state.db, &username)
        .await?
        .ok_or(Error::NotFound)?;

    let posts_count = db::posts::count_by_author(&state.db, author.id).await?;
    let paginator = Paginator::new(posts_count, state.page_limit);
    let number = paginator.resolve(query.page.as_deref());
    let posts = db::posts::list_by_author(
        &state.db,
        author.id,
        paginator.limit(),
        paginator.offset(number),
    )
    .await?;

    render(&ProfileTemplate {
        layout: Layout::new(viewer, csrf),
        author,
        posts_count,
        page: paginator.page(number, posts),
    })
}

pub async fn post_detail(
    State(state): State<Arc<AppState>>,
    CurrentUser(viewer): CurrentUser,
    csrf: CsrfToken,
    Path(post_id): Path<String>,
) -> Result<Response> {
    let post_id = parse_post_id(&post_id)?;
    let post = db::posts::find_card(&state.db, post_id)
        .await?
        .ok_or(Error::NotFound)?;

    let posts_count = db::posts::count_by_author(&state.db, post.author_id).await?;
    let can_edit = viewer.as_ref().is_some_and(|user| user.id == post.author_id);

    render(&PostDetailTemplate {
        layout: Layout::new(viewer, csrf),
        post,
        posts_count,
        can_edit,
    })
}

pub async fn post_create_form(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
    csrf: CsrfToken,
) -> Result<Response> {
    render(&PostFormTemplate {
        layout: Layout::new(Some(user), csrf),
        form: PostForm::default(),
        errors: FormErrors::default(),
        groups: db::groups::list(&state.db).await?,
        post_id: None,
    })
}

pub async fn post_create(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
    csrf: CsrfToken,
    Form(form): Form<PostForm>,
) -> Result<Response> {
    let groups = db::groups::list(&state.db).await?;

    match form.clean(&groups) {
        Ok(draft) => {
            db::posts::create(&state.db, user.id, &draft).await?;
            Ok(Redirect::to(&profile_url(&user.username)).into_response())
        }
        Err(errors) => {
            tracing::debug!(username = %user.username, "Rejected invalid post");
            render(&PostFormTemplate {
                layout: Layout::new(Some(user), csrf),
                form,
                errors,
                groups,
                post_id: None,
            })
        }
    }
}

pub async fn post_edit_form(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
    csrf: CsrfToken,
    Path(post_id): Path<String>,
) -> Result<Response> {
    let post_id = parse_post_id(&post_id)?;
    let post = db::posts::find(&state.db, post_id)
        .await?
        .ok_or(Error::NotFound)?;

    if !post.is_authored_by(&user) {
        return Ok(Redirect::to(&post_url(post_id)).into_response());
    }

    render(&PostFormTemplate {
        layout: Layout::new(Some(user), csrf),
        form: PostForm::from_post(&post),
        errors: FormErrors::default(),
        groups: db::groups::list(&state.db).await?,
        post_id: Some(post_id),
    })
}

pub async fn post_edit(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
    csrf: CsrfToken,
    Path(post_id): Path<String>,
    form: std::result::Result<Form<PostForm>, FormRejection>,
) -> Result<Response> {
    let post_id = parse_post_id(&post_id)?;
    let post = db::posts::find(&state.db, post_id)
        .await?
        .ok_or(Error::NotFound)?;

    if !post.is_authored_by(&user) {
        tracing::warn!(post_id, username = %user.username, "Edit attempted by non-author");
        return Ok(Redirect::to(&post_url(post_id)).into_response());
    }

    // The body is only bound once the viewer is known to own the post.
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let groups = db::groups::list(&state.db).await?;
    match form.clean(&groups) {
        Ok(draft) => {
            db::posts::update(&state.db, post_id, &draft).await?;
            Ok(Redirect::to(&post_url(post_id)).into_response())
        }
        Err(errors) => render(&PostFormTemplate {
            layout: Layout::new(Some(user), csrf),
            form,
            errors,
            groups,
            post_id: Some(post_id),
        }),
    }
}

pub async fn about_author(CurrentUser(viewer): CurrentUser, csrf: CsrfToken) -> Result<Response> {
    render(&AboutAuthorTemplate {
        layout: Layout::new(viewer, csrf),
    })
}

pub async fn about_tech(CurrentUser(viewer): CurrentUser, csrf: CsrfToken) -> Result<Response> {
    render(&AboutTechTemplate {
        layout: Layout::new(viewer, csrf),
    })
}

pub async fn not_found() -> Error {
    Error::NotFound
}

pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
