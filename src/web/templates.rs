use askama::Template;

use crate::{
    csrf::CsrfToken,
    forms::{FormErrors, LoginForm, PostForm, SignupForm},
    models::{Group, PostCard, User},
    pagination::Page,
};

/// Per-request data every page's header needs.
pub struct Layout {
    pub viewer: Option<User>,
    pub csrf_token: String,
}

impl Layout {
    pub fn new(viewer: Option<User>, CsrfToken(csrf_token): CsrfToken) -> Self {
        Self { viewer, csrf_token }
    }

    pub fn anonymous() -> Self {
        Self {
            viewer: None,
            csrf_token: String::new(),
        }
    }
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexTemplate {
    pub layout: Layout,
    pub page: Page<PostCard>,
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupTemplate {
    pub layout: Layout,
    pub group: Group,
    pub page: Page<PostCard>,
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub author: User,
    pub posts_count: i64,
    pub page: Page<PostCard>,
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailTemplate {
    pub layout: Layout,
    pub post: PostCard,
    pub posts_count: i64,
    pub can_edit: bool,
}

/// Shared by create and edit; `post_id` is set when editing.
#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct PostFormTemplate {
    pub layout: Layout,
    pub form: PostForm,
    pub errors: FormErrors,
    pub groups: Vec<Group>,
    pub post_id: Option<i64>,
}

impl PostFormTemplate {
    pub fn is_edit(&self) -> bool {
        self.post_id.is_some()
    }

    pub fn action(&self) -> String {
        match self.post_id {
            Some(id) => format!("/posts/{}/edit/", id),
            None => "/create/".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "users/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub form: LoginForm,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "users/signup.html")]
pub struct SignupTemplate {
    pub layout: Layout,
    pub form: SignupForm,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "about/author.html")]
pub struct AboutAuthorTemplate {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "about/tech.html")]
pub struct AboutTechTemplate {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "core/404.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
}
