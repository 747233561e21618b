use crate::{
    client::{Action, ClientState, Phase, StudentForm},
    data::student::{AGE_RANGE, GENDER_CHOICES, Student},
    error::RosterResult,
    maud_conveniences::{
        Alert, INPUT_CLASS, alert, form_element, render_table, simple_form_element, subtitle,
        title,
    },
    routes::{
        parse_id,
        students::{all_students, create_student, find_student, remove_student, update_student},
    },
    state::RosterState,
};
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

///everything that fires a request gets disabled while one is in flight
const ROSTER_BUTTONS: &str = "#roster button";

const CANCEL_SCRIPT: &str = "document.getElementById('student_form').replaceWith(document.getElementById('blank_student_form').content.cloneNode(true)); htmx.process(document.getElementById('student_form'));";
const SHOW_NETWORK_ERROR: &str = "document.getElementById('network_error').hidden = false;";
const HIDE_NETWORK_ERROR: &str =
    "if (event.detail.successful) document.getElementById('network_error').hidden = true;";

pub fn render_roster(client: &ClientState) -> Markup {
    let mut blank = client.clone();
    blank.cancel();

    html! {
        div id="roster" class="mx-auto bg-gray-800 p-8 rounded shadow-md max-w-5xl w-full flex flex-col space-y-4"
            hx-on:htmx:send-error=(SHOW_NETWORK_ERROR) hx-on:htmx:response-error=(SHOW_NETWORK_ERROR) hx-on:htmx:after-request=(HIDE_NETWORK_ERROR) {
            (title("Student Records"))
            (render_banner(client, false))
            div id="network_error" hidden {
                (alert(&Alert::Failure, "Could not reach the server"))
            }
            div class="flex flex-row space-x-4 text-sm text-gray-300" {
                @for action in Action::ALL {
                    span id={"busy_" (action.slug())} class="htmx-indicator" {(action.busy_message())}
                }
            }
            div class="flex flex-col md:flex-row md:space-x-8 space-y-4 md:space-y-0" {
                div class="md:w-1/3" {
                    (render_form(client))
                }
                div class="md:w-2/3" hx-get="/internal/students" hx-trigger="load" hx-target="#student_table" hx-swap="outerHTML"
                    hx-disabled-elt=(ROSTER_BUTTONS) hx-indicator={"#busy_" (Action::Load.slug())} {
                    (render_student_table(client, false))
                }
            }
            template id="blank_student_form" {
                (render_form(&blank))
            }
        }
    }
}

pub fn render_banner(client: &ClientState, oob: bool) -> Markup {
    html! {
        div id="status_banner" hx-swap-oob=[oob.then_some("true")] {
            @if let Some(message) = client.message() {
                @match client.phase() {
                    Phase::Failed(_) => { (alert(&Alert::Failure, message)) },
                    Phase::Succeeded(_) => { (alert(&Alert::Success, message)) },
                    Phase::Loading(_) | Phase::Idle => { (alert(&Alert::Status, message)) },
                }
            }
        }
    }
}

pub fn render_form(client: &ClientState) -> Markup {
    let form = client.form();
    let (heading, action) = match client.editing() {
        Some(_) => ("Edit Student", Action::Update),
        None => ("Add Student", Action::Create),
    };
    let free_form_gender = !form.gender.is_empty() && !GENDER_CHOICES.contains(&form.gender.as_str());

    html! {
        form id="student_form" class="p-4 bg-gray-700 rounded"
            hx-post=[client.editing().is_none().then_some("/internal/students")]
            hx-put=[client.editing().map(|id| format!("/internal/students/{id}"))]
            hx-target="this" hx-swap="outerHTML"
            hx-disabled-elt=(ROSTER_BUTTONS) hx-indicator={"#busy_" (action.slug())} {
            (subtitle(heading))
            (simple_form_element("name", "Name", "text", &form.name))
            (simple_form_element("email", "Email Address", "email", &form.email))
            (form_element("age", "Age", html! {
                input required type="number" min=(AGE_RANGE.start()) max=(AGE_RANGE.end()) id="age" name="age" value=(form.age) class=(INPUT_CLASS) {}
            }))
            (form_element("gender", "Gender", html! {
                select required id="gender" name="gender" class=(INPUT_CLASS) {
                    option value="" selected[form.gender.is_empty()] {"Select gender"}
                    @for choice in GENDER_CHOICES {
                        option value=(choice) selected[form.gender == choice] {(choice)}
                    }
                    // records made through the API can hold anything
                    @if free_form_gender {
                        option value=(form.gender) selected {(form.gender)}
                    }
                }
            }))
            div class="flex items-center justify-between space-x-2" {
                button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                    @if client.editing().is_some() { "Update Student" } @else { "Add Student" }
                }
                button type="button" hx-on:click=(CANCEL_SCRIPT) class="bg-gray-600 hover:bg-gray-800 font-bold py-2 px-4 rounded" {
                    "Cancel"
                }
            }
        }
    }
}

fn student_row(student: &Student) -> [Markup; 7] {
    let Student {
        id,
        name,
        email,
        age,
        gender,
        created_at,
    } = student;

    [
        html! {(id)},
        html! {(name)},
        html! { a href={"mailto:" (email)} class="text-blue-400" {(email)} },
        html! {(age)},
        html! {(gender)},
        html! {(created_at.format("%Y-%m-%d %H:%M").to_string())},
        html! {
            div class="flex flex-row space-x-2" {
                button class="bg-blue-600 hover:bg-blue-800 font-bold py-1 px-3 rounded"
                    hx-get={"/internal/students/" (id) "/edit"} hx-target="#student_form" hx-swap="outerHTML"
                    hx-disabled-elt=(ROSTER_BUTTONS) hx-indicator={"#busy_" (Action::Edit.slug())} {
                    "Edit"
                }
                button class="bg-red-600 hover:bg-red-800 font-bold py-1 px-3 rounded"
                    hx-delete={"/internal/students/" (id)} hx-confirm={"Delete " (name) "?"} hx-target="#student_table" hx-swap="outerHTML"
                    hx-disabled-elt=(ROSTER_BUTTONS) hx-indicator={"#busy_" (Action::Delete.slug())} {
                    "Delete"
                }
            }
        },
    ]
}

pub fn render_student_table(client: &ClientState, oob: bool) -> Markup {
    html! {
        div id="student_table" hx-swap-oob=[oob.then_some("true")] {
            @if client.is_busy() {
                p class="text-gray-400" {(Action::Load.busy_message())}
            } @else if client.students().is_empty() {
                p class="text-gray-400" {"No students yet."}
            } @else {
                (render_table(
                    ["ID", "Name", "Email", "Age", "Gender", "Created", ""],
                    client.students().iter().map(student_row).collect(),
                ))
            }
        }
    }
}

fn settle(client: &mut ClientState, outcome: RosterResult<Vec<Student>>) {
    match outcome {
        Ok(students) => client.succeed(students),
        Err(e) => {
            if e.status_code().is_server_error() {
                error!(?e, phase = ?client.phase(), "Page request failed");
            } else {
                warn!(%e, phase = ?client.phase(), "Page request rejected");
            }
            client.fail();
        }
    }
}

///a mutation is only finished once the list has been fetched again
async fn refetch_after(state: &RosterState, outcome: RosterResult<Student>) -> RosterResult<Vec<Student>> {
    outcome?;
    all_students(state).await
}

///on failure only the out-of-band banner lands, so whatever was on the page stays put
fn respond(client: &ClientState, markup: Markup) -> Response {
    if client.is_failed() {
        ([("HX-Reswap", "none")], markup).into_response()
    } else {
        markup.into_response()
    }
}

fn submitted(client: &ClientState) -> Response {
    respond(
        client,
        html! {
            (render_form(client))
            @if client.has_fresh_list() {
                (render_student_table(client, true))
            }
            (render_banner(client, true))
        },
    )
}

pub async fn internal_get_students(State(state): State<RosterState>) -> Response {
    let mut client = ClientState::default();
    client.begin(Action::Load);
    settle(&mut client, all_students(&state).await);

    respond(
        &client,
        html! {
            (render_student_table(&client, false))
            (render_banner(&client, true))
        },
    )
}

pub async fn internal_post_student(
    State(state): State<RosterState>,
    Form(form): Form<StudentForm>,
) -> Response {
    let mut client = ClientState::with_form(form.clone(), None);
    client.begin_submit();

    let outcome = create_student(&state, form.into()).await;
    settle(&mut client, refetch_after(&state, outcome).await);

    submitted(&client)
}

pub async fn internal_put_student(
    State(state): State<RosterState>,
    Path(id): Path<String>,
    Form(form): Form<StudentForm>,
) -> Response {
    let id = parse_id(&id);
    let mut client = ClientState::with_form(form.clone(), id.as_ref().ok().copied());
    client.begin(Action::Update);

    let outcome = match id {
        Ok(id) => update_student(&state, id, form.into()).await,
        Err(e) => Err(e),
    };
    settle(&mut client, refetch_after(&state, outcome).await);

    submitted(&client)
}

pub async fn internal_get_edit_form(
    State(state): State<RosterState>,
    Path(id): Path<String>,
) -> Response {
    let mut client = ClientState::default();
    client.begin(Action::Edit);

    let found = match parse_id(&id) {
        Ok(id) => find_student(&state, id).await,
        Err(e) => Err(e),
    };
    match found {
        Ok(student) => client.edit(&student),
        Err(e) => {
            warn!(%e, %id, "Couldn't open student for editing");
            client.fail();
        }
    }

    respond(
        &client,
        html! {
            (render_form(&client))
            (render_banner(&client, true))
        },
    )
}

pub async fn internal_delete_student(
    State(state): State<RosterState>,
    Path(id): Path<String>,
) -> Response {
    let mut client = ClientState::default();
    client.begin(Action::Delete);

    let outcome = match parse_id(&id) {
        Ok(id) => remove_student(&state, id).await,
        Err(e) => Err(e),
    };
    settle(&mut client, refetch_after(&state, outcome).await);

    respond(
        &client,
        html! {
            (render_student_table(&client, false))
            (render_banner(&client, true))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{router, test_utils::call};
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::Utc;
    use tower::ServiceExt;

    async fn send(app: &Router, method: &str, uri: &str, form: Option<&str>) -> (StatusCode, Option<String>, String) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match form {
            Some(form) => builder
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let reswap = response
            .headers()
            .get("HX-Reswap")
            .map(|value| value.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, reswap, String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn count(app: &Router) -> usize {
        let (_, list) = call(app, "GET", "/students", None).await;
        list.as_array().unwrap().len()
    }

    const ANA: &str = "name=Ana&email=a%40x.com&age=21&gender=Female";

    #[tokio::test]
    async fn page_shell_loads_the_list_once() {
        let app = router(RosterState::in_memory().await);
        let (status, _, page) = send(&app, "GET", "/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(page.contains("Student Records"));
        assert!(page.contains(r#"hx-get="/internal/students" hx-trigger="load""#));
        assert_eq!(page.matches(r##"hx-disabled-elt="#roster button""##).count(), 3);
        assert!(page.contains(r#"id="blank_student_form""#));
        assert!(page.contains("Loading students..."));
    }

    #[tokio::test]
    async fn adding_clears_the_form_and_refreshes_the_list() {
        let app = router(RosterState::in_memory().await);
        let (status, reswap, body) = send(&app, "POST", "/internal/students", Some(ANA)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(reswap, None);
        assert!(body.contains("Student added"));
        assert!(body.contains(r#"id="student_table" hx-swap-oob="true""#));
        assert!(body.contains("mailto:a@x.com"));
        assert!(body.contains(r#"hx-post="/internal/students""#));
        assert!(body.contains(r#"id="name" name="name" value="""#));
        assert_eq!(count(&app).await, 1);
    }

    #[tokio::test]
    async fn a_rejected_submit_only_shows_the_banner() {
        let app = router(RosterState::in_memory().await);
        let (status, reswap, body) =
            send(&app, "POST", "/internal/students", Some("name=Ana&email=&age=21&gender=Female")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(reswap.as_deref(), Some("none"));
        assert!(body.contains("Failed to add student"));
        assert_eq!(count(&app).await, 0);
    }

    #[tokio::test]
    async fn editing_binds_the_form_and_updating_releases_it() {
        let app = router(RosterState::in_memory().await);
        send(&app, "POST", "/internal/students", Some(ANA)).await;

        let (_, _, form) = send(&app, "GET", "/internal/students/1/edit", None).await;
        assert!(form.contains(r#"hx-put="/internal/students/1""#));
        assert!(form.contains(r#"value="Ana""#));
        assert!(form.contains("Update Student"));

        let (_, reswap, body) = send(
            &app,
            "PUT",
            "/internal/students/1",
            Some("name=Ana+B&email=a%40x.com&age=22&gender=Female"),
        )
        .await;
        assert_eq!(reswap, None);
        assert!(body.contains("Student updated"));
        assert!(body.contains("Ana B"));
        assert!(body.contains(r#"hx-post="/internal/students""#));

        let (_, student) = call(&app, "GET", "/students/1", None).await;
        assert_eq!(student["age"], 22);
    }

    #[tokio::test]
    async fn editing_a_missing_student_fails() {
        let app = router(RosterState::in_memory().await);
        let (_, reswap, body) = send(&app, "GET", "/internal/students/9/edit", None).await;

        assert_eq!(reswap.as_deref(), Some("none"));
        assert!(body.contains("Failed to open student for editing"));
    }

    #[tokio::test]
    async fn deleting_refreshes_the_table() {
        let app = router(RosterState::in_memory().await);
        send(&app, "POST", "/internal/students", Some(ANA)).await;

        let (_, reswap, body) = send(&app, "DELETE", "/internal/students/1", None).await;
        assert_eq!(reswap, None);
        assert!(body.contains("Student deleted"));
        assert!(body.contains("No students yet."));
        assert_eq!(count(&app).await, 0);

        let (_, reswap, body) = send(&app, "DELETE", "/internal/students/1", None).await;
        assert_eq!(reswap.as_deref(), Some("none"));
        assert!(body.contains("Failed to delete student"));
    }

    #[tokio::test]
    async fn every_request_disables_the_roster_buttons() {
        let app = router(RosterState::in_memory().await);
        let (_, _, body) = send(&app, "POST", "/internal/students", Some(ANA)).await;

        for needle in [
            r#"<form id="student_form""#,
            r#"hx-get="/internal/students/1/edit""#,
            r#"hx-delete="/internal/students/1""#,
        ] {
            let start = body.find(needle).unwrap();
            let tag = &body[start..start + body[start..].find('>').unwrap()];
            assert!(tag.contains(r##"hx-disabled-elt="#roster button""##), "{tag}");
        }
    }

    #[tokio::test]
    async fn non_numeric_ids_fail_like_missing_ones() {
        let app = router(RosterState::in_memory().await);

        let (status, reswap, body) = send(&app, "GET", "/internal/students/abc/edit", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reswap.as_deref(), Some("none"));
        assert!(body.contains("Failed to open student for editing"));

        let (status, reswap, body) = send(&app, "DELETE", "/internal/students/abc", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reswap.as_deref(), Some("none"));
        assert!(body.contains("Failed to delete student"));

        let (status, reswap, body) = send(&app, "PUT", "/internal/students/abc", Some(ANA)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reswap.as_deref(), Some("none"));
        assert!(body.contains("Failed to update student"));
        assert_eq!(count(&app).await, 0);
    }

    #[test]
    fn free_form_genders_stay_selected() {
        let mut client = ClientState::default();
        client.edit(&Student {
            id: 5,
            name: "Sam".into(),
            email: "s@x.com".into(),
            age: 40,
            gender: "Non-binary".into(),
            created_at: Utc::now(),
        });

        let form = render_form(&client).into_string();
        assert!(form.contains(r#"<option value="Non-binary" selected>Non-binary</option>"#));
        assert!(form.contains(r#"hx-put="/internal/students/5""#));
    }
}
