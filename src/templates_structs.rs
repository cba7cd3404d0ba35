use actix_session::Session;
use askama::Template;

use crate::auth::csrf;
use crate::models::contact::Contact;

/// Common context for the rendered page. The token is embedded as a hidden
/// field in every mutating form; the flash is shown once above the form.
pub struct PageContext {
    pub csrf_token: String,
    pub flash: Option<String>,
}

impl PageContext {
    pub fn build(session: &Session, flash: Option<String>) -> Self {
        let csrf_token = csrf::get_or_create_token(session);
        Self { csrf_token, flash }
    }
}

/// Values shown in the contact form. With an id set the form posts an
/// update; otherwise a create. On a failed submission the fields echo the
/// user's input verbatim so it can be corrected and resubmitted.
pub struct ContactFormState {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl ContactFormState {
    pub fn blank() -> Self {
        Self {
            id: None,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
        }
    }

    pub fn from_contact(c: &Contact) -> Self {
        Self {
            id: Some(c.id),
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub ctx: PageContext,
    pub contacts: Vec<Contact>,
    pub form: ContactFormState,
    pub errors: Vec<String>,
}
