use actix_session::Session;
use actix_web::{HttpResponse, web};
use rusqlite::Connection;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::auth::csrf;
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::models::contact::{self, NewContact};
use crate::templates_structs::{ContactFormState, IndexTemplate, PageContext};

/// Query parameters for `GET /`.
#[derive(Deserialize)]
pub struct IndexQuery {
    pub action: Option<String>,
    pub id: Option<i64>,
    pub msg: Option<String>,
}

/// Query parameters for `POST /` — only the action selector.
#[derive(Deserialize)]
pub struct ActionQuery {
    pub action: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub token: String,
}

#[derive(Deserialize)]
pub struct UpdateForm {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub token: String,
}

#[derive(Deserialize)]
pub struct DeleteForm {
    pub id: i64,
    pub token: String,
}

/// `GET /` — list all contacts; with `action=edit&id=N`, pre-fill the form
/// from that row. An `edit` without a positive id falls through to the
/// plain list; an `edit` of a missing row terminates with 404.
pub async fn index(
    pool: web::Data<DbPool>,
    session: Session,
    query: web::Query<IndexQuery>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;

    let form = match query.action.as_deref() {
        Some("edit") => match query.id.filter(|&id| id > 0) {
            Some(id) => match contact::find_by_id(&conn, id)? {
                Some(c) => ContactFormState::from_contact(&c),
                None => return Err(AppError::NotFound),
            },
            None => ContactFormState::blank(),
        },
        _ => ContactFormState::blank(),
    };

    let flash = query
        .msg
        .as_deref()
        .and_then(flash_message)
        .map(String::from);

    render_page(&session, &conn, form, vec![], flash)
}

/// `POST /` — dispatch a mutating action. Each request resolves exactly one
/// action; anything unrecognized is a caller-contract violation.
pub async fn submit(
    pool: web::Data<DbPool>,
    session: Session,
    query: web::Query<ActionQuery>,
    body: String,
) -> Result<HttpResponse, AppError> {
    match query.action.as_deref() {
        Some("create") => create(&pool, &session, &body),
        Some("update") => update(&pool, &session, &body),
        Some("delete") => delete(&pool, &session, &body),
        _ => Err(AppError::BadRequest("Unknown action".to_string())),
    }
}

fn create(pool: &DbPool, session: &Session, body: &str) -> Result<HttpResponse, AppError> {
    let form: CreateForm = parse_form(body)?;
    csrf::validate_csrf(session, &form.token)?;

    let conn = pool.get()?;

    let errors = validate_contact(&form.name, &form.email);
    if !errors.is_empty() {
        let state = ContactFormState {
            id: None,
            name: form.name,
            email: form.email,
            phone: form.phone,
        };
        return render_page(session, &conn, state, errors, None);
    }

    let new = NewContact {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
    };
    let id = contact::create(&conn, &new)?;
    log::info!("Created contact {id}");

    Ok(see_list("created"))
}

fn update(pool: &DbPool, session: &Session, body: &str) -> Result<HttpResponse, AppError> {
    let form: UpdateForm = parse_form(body)?;
    csrf::validate_csrf(session, &form.token)?;

    if form.id <= 0 {
        return Err(AppError::BadRequest("Bad contact id".to_string()));
    }

    let conn = pool.get()?;

    let errors = validate_contact(&form.name, &form.email);
    if !errors.is_empty() {
        let state = ContactFormState {
            id: Some(form.id),
            name: form.name,
            email: form.email,
            phone: form.phone,
        };
        return render_page(session, &conn, state, errors, None);
    }

    let affected = contact::update(
        &conn,
        form.id,
        form.name.trim(),
        form.email.trim(),
        form.phone.trim(),
    )?;
    if affected == 0 {
        return Err(AppError::NotFound);
    }
    log::info!("Updated contact {}", form.id);

    Ok(see_list("updated"))
}

fn delete(pool: &DbPool, session: &Session, body: &str) -> Result<HttpResponse, AppError> {
    let form: DeleteForm = parse_form(body)?;
    csrf::validate_csrf(session, &form.token)?;

    if form.id <= 0 {
        return Err(AppError::BadRequest("Bad contact id".to_string()));
    }

    let conn = pool.get()?;

    let affected = contact::delete(&conn, form.id)?;
    if affected == 0 {
        return Err(AppError::NotFound);
    }
    log::info!("Deleted contact {}", form.id);

    Ok(see_list("deleted"))
}

/// Fetch the current row set and render the page.
fn render_page(
    session: &Session,
    conn: &Connection,
    form: ContactFormState,
    errors: Vec<String>,
    flash: Option<String>,
) -> Result<HttpResponse, AppError> {
    let contacts = contact::find_all(conn)?;
    let ctx = PageContext::build(session, flash);
    render(IndexTemplate {
        ctx,
        contacts,
        form,
        errors,
    })
}

fn parse_form<T: DeserializeOwned>(body: &str) -> Result<T, AppError> {
    serde_urlencoded::from_str(body)
        .map_err(|_| AppError::BadRequest("Malformed form body".to_string()))
}

fn validate_contact(name: &str, email: &str) -> Vec<String> {
    let mut errors = vec![];
    if name.trim().is_empty() {
        errors.push("Name is required".to_string());
    }
    if email.trim().is_empty() {
        errors.push("Email is required".to_string());
    }
    errors
}

/// Translate a redirect status code into the message shown once above the
/// form. Unknown codes display nothing.
fn flash_message(code: &str) -> Option<&'static str> {
    match code {
        "created" => Some("Contact created."),
        "updated" => Some("Contact updated."),
        "deleted" => Some("Contact deleted."),
        _ => None,
    }
}

fn see_list(msg: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header(("Location", format!("/?msg={msg}")))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_trimmed_nonempty_fields() {
        assert!(validate_contact("Ana Lee", "ana@example.com").is_empty());
        assert!(validate_contact("  Ana  ", " a@b ").is_empty());
    }

    #[test]
    fn validate_rejects_empty_or_whitespace_fields() {
        assert_eq!(validate_contact("", "a@b"), vec!["Name is required"]);
        assert_eq!(validate_contact("Ana", "   "), vec!["Email is required"]);
        assert_eq!(
            validate_contact(" ", ""),
            vec!["Name is required", "Email is required"]
        );
    }

    #[test]
    fn flash_message_maps_known_codes_only() {
        assert_eq!(flash_message("created"), Some("Contact created."));
        assert_eq!(flash_message("updated"), Some("Contact updated."));
        assert_eq!(flash_message("deleted"), Some("Contact deleted."));
        assert_eq!(flash_message("bogus"), None);
    }

    #[test]
    fn create_form_parses_with_optional_phone() {
        let form: CreateForm =
            parse_form("name=Ana+Lee&email=ana%40example.com&token=abc").unwrap();
        assert_eq!(form.name, "Ana Lee");
        assert_eq!(form.email, "ana@example.com");
        assert_eq!(form.phone, "");
        assert_eq!(form.token, "abc");
    }

    #[test]
    fn create_form_requires_name_and_email_fields() {
        assert!(parse_form::<CreateForm>("email=a%40b&token=t").is_err());
        assert!(parse_form::<CreateForm>("name=Ana&token=t").is_err());
    }

    #[test]
    fn update_form_requires_integer_id() {
        let form: UpdateForm =
            parse_form("id=7&name=Ana&email=a%40b&phone=555-1234&token=t").unwrap();
        assert_eq!(form.id, 7);
        assert_eq!(form.phone, "555-1234");
        assert!(parse_form::<UpdateForm>("id=abc&name=Ana&email=a%40b&token=t").is_err());
        assert!(parse_form::<UpdateForm>("name=Ana&email=a%40b&token=t").is_err());
    }

    #[test]
    fn delete_form_parses_id_and_token() {
        let form: DeleteForm = parse_form("id=3&token=t").unwrap();
        assert_eq!(form.id, 3);
        assert_eq!(form.token, "t");
        assert!(parse_form::<DeleteForm>("token=t").is_err());
    }
}
