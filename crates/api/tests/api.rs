use api::auth::AuthTokens;
use api::state::AppState;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use types::TeacherId;

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(v) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, bytes)
}

async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, token, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn open_app() -> Router {
    api::router(AppState::new_default())
}

/// Creates class, teacher, room, two slots and a subject; returns their ids as
/// (class, teacher, subject).
async fn seed_catalog(app: &Router, token: Option<&str>) -> (String, String, String) {
    let (st, class) = send_json(
        app,
        Method::POST,
        "/v1/classes",
        token,
        Some(json!({"name": "7A", "section": "blue"})),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED);
    let class_id = class["id"].as_str().unwrap().to_string();

    let (_, teacher) = send_json(
        app,
        Method::POST,
        "/v1/teachers",
        token,
        Some(json!({"name": "Ada Lovelace"})),
    )
    .await;
    let teacher_id = teacher["id"].as_str().unwrap().to_string();

    let (st, _) = send_json(
        app,
        Method::POST,
        "/v1/rooms",
        token,
        Some(json!({"name": "101", "capacity": 30})),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED);

    for (label, start, end, order) in
        [("P1", "08:00", "08:45", 1), ("P2", "09:00", "09:45", 2)]
    {
        let (st, _) = send_json(
            app,
            Method::POST,
            "/v1/slots",
            token,
            Some(json!({"label": label, "start": start, "end": end, "order": order})),
        )
        .await;
        assert_eq!(st, StatusCode::CREATED);
    }

    let (st, subject) = send_json(
        app,
        Method::POST,
        "/v1/subjects",
        token,
        Some(json!({
            "name": "Maths",
            "classId": class_id,
            "teacherId": teacher_id,
        })),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED);
    let subject_id = subject["id"].as_str().unwrap().to_string();

    (class_id, teacher_id, subject_id)
}

#[tokio::test]
async fn health() {
    let app = open_app();
    let (status, body) = send(&app, Method::GET, "/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn crud_and_generation_flow() {
    let app = open_app();
    let (class_id, teacher_id, _) = seed_catalog(&app, None).await;

    let (st, report) = send_json(
        &app,
        Method::POST,
        "/v1/generate",
        None,
        Some(json!({"seed": 42})),
    )
    .await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(report["seed"], 42);
    assert_eq!(report["replaced"], 0);
    assert_eq!(report["created"], 5); // one subject, five days
    assert_eq!(report["entries"].as_array().unwrap().len(), 5);

    // Re-running replaces instead of accumulating.
    let (_, report2) = send_json(
        &app,
        Method::POST,
        "/v1/generate",
        None,
        Some(json!({"seed": 43})),
    )
    .await;
    assert_eq!(report2["replaced"], 5);

    let (st, entries) = send_json(
        &app,
        Method::GET,
        &format!("/v1/entries?classId={class_id}&day=mon"),
        None,
        None,
    )
    .await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(entries.as_array().unwrap().len(), 1);
    assert_eq!(entries[0]["teacherId"], teacher_id);

    // Unknown scope id is a 404, before anything gets deleted.
    let (st, _) = send_json(
        &app,
        Method::POST,
        "/v1/generate",
        None,
        Some(json!({"classId": "ghost"})),
    )
    .await;
    assert_eq!(st, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn generation_without_prerequisites_is_explained() {
    let app = open_app();
    let (st, body) = send_json(&app, Method::POST, "/v1/generate", None, Some(json!({}))).await;
    assert_eq!(st, StatusCode::UNPROCESSABLE_ENTITY);
    let msg = body["error"].as_str().unwrap();
    assert!(msg.contains("no time slots defined"));
    assert!(msg.contains("no rooms defined"));
    assert!(msg.contains("no subjects in scope"));
}

#[tokio::test]
async fn manual_assign_respects_conflicts() {
    let app = open_app();
    let (class_id, teacher_id, _) = seed_catalog(&app, None).await;

    // Second subject so Monday has two occupied cells.
    let (st, _) = send_json(
        &app,
        Method::POST,
        "/v1/subjects",
        None,
        Some(json!({"name": "Logic", "classId": class_id, "teacherId": teacher_id})),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED);

    let (_, _) = send_json(
        &app,
        Method::POST,
        "/v1/generate",
        None,
        Some(json!({"seed": 7})),
    )
    .await;

    let (_, entries) = send_json(
        &app,
        Method::GET,
        &format!("/v1/entries?classId={class_id}&day=mon"),
        None,
        None,
    )
    .await;
    let entries = entries.as_array().unwrap().clone();
    assert_eq!(entries.len(), 2);
    let first = entries[0]["id"].as_str().unwrap();
    let second_slot = entries[1]["slotId"].as_str().unwrap();

    // Moving the first entry onto the second entry's slot collides.
    let (st, body) = send_json(
        &app,
        Method::PUT,
        &format!("/v1/entries/{first}"),
        None,
        Some(json!({"slotId": second_slot})),
    )
    .await;
    assert_eq!(st, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already taken"));
}

#[tokio::test]
async fn cascading_delete_clears_entries() {
    let app = open_app();
    let (class_id, _, _) = seed_catalog(&app, None).await;
    let (_, _) = send_json(&app, Method::POST, "/v1/generate", None, Some(json!({}))).await;

    let (st, _) = send(
        &app,
        Method::DELETE,
        &format!("/v1/classes/{class_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(st, StatusCode::NO_CONTENT);

    let (_, entries) = send_json(&app, Method::GET, "/v1/entries", None, None).await;
    assert!(entries.as_array().unwrap().is_empty());
}

fn secured_app(teacher_a: &str, teacher_b: &str) -> Router {
    let auth = AuthTokens::new(
        Some("root".into()),
        vec![
            ("tkn-a".into(), TeacherId(teacher_a.into())),
            ("tkn-b".into(), TeacherId(teacher_b.into())),
        ],
        Some("pupil".into()),
    );
    api::router(AppState {
        store: store::Store::new(),
        auth,
    })
}

#[tokio::test]
async fn roles_gate_writes() {
    // Token table needs teacher ids before they exist; seed with fixed names
    // via the admin token, then check role refusals.
    let app = secured_app("whoever", "whoever2");

    let (st, _) = send_json(&app, Method::GET, "/v1/classes", None, None).await;
    assert_eq!(st, StatusCode::UNAUTHORIZED);

    let (st, _) = send_json(&app, Method::GET, "/v1/classes", Some("wrong"), None).await;
    assert_eq!(st, StatusCode::UNAUTHORIZED);

    let (st, _) = send_json(&app, Method::GET, "/v1/classes", Some("pupil"), None).await;
    assert_eq!(st, StatusCode::OK);

    let (st, _) = send_json(
        &app,
        Method::POST,
        "/v1/classes",
        Some("pupil"),
        Some(json!({"name": "7A"})),
    )
    .await;
    assert_eq!(st, StatusCode::FORBIDDEN);

    let (st, _) = send_json(
        &app,
        Method::POST,
        "/v1/classes",
        Some("tkn-a"),
        Some(json!({"name": "7A"})),
    )
    .await;
    assert_eq!(st, StatusCode::FORBIDDEN);

    let (st, _) = send_json(
        &app,
        Method::POST,
        "/v1/classes",
        Some("root"),
        Some(json!({"name": "7A"})),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED);
}

#[tokio::test]
async fn swap_request_round_trip() {
    // The token table must point at real teacher ids, so seed through an open
    // store first and wire tokens to the created teachers.
    let store = store::Store::new();
    let class = store.create_class(types::NewSchoolClass {
        name: "7A".into(),
        section: None,
    });
    let ta = store.create_teacher(types::NewTeacher {
        name: "Ada".into(),
        email: None,
    });
    let tb = store.create_teacher(types::NewTeacher {
        name: "Boole".into(),
        email: None,
    });
    let sa = store
        .create_subject(types::NewSubject {
            name: "Maths".into(),
            class_id: class.id.clone(),
            teacher_id: ta.id.clone(),
            multi_slot_allowed: false,
        })
        .unwrap();
    let sb = store
        .create_subject(types::NewSubject {
            name: "Logic".into(),
            class_id: class.id.clone(),
            teacher_id: tb.id.clone(),
            multi_slot_allowed: false,
        })
        .unwrap();
    let room = store
        .create_room(types::NewRoom {
            name: "101".into(),
            capacity: 30,
        })
        .unwrap();
    let s1 = store
        .create_slot(types::NewTimeSlot {
            label: "P1".into(),
            start: "08:00".into(),
            end: "08:45".into(),
            order: 1,
        })
        .unwrap();
    let s2 = store
        .create_slot(types::NewTimeSlot {
            label: "P2".into(),
            start: "09:00".into(),
            end: "09:45".into(),
            order: 2,
        })
        .unwrap();
    let make = |subject: &types::Subject, slot: &types::TimeSlot| types::TimetableEntry {
        id: types::EntryId(uuid_like(subject)),
        class_id: class.id.clone(),
        subject_id: subject.id.clone(),
        teacher_id: subject.teacher_id.clone(),
        room_id: room.id.clone(),
        slot_id: slot.id.clone(),
        day: types::DayOfWeek::Mon,
    };
    fn uuid_like(s: &types::Subject) -> String {
        format!("entry-{}", s.id.0)
    }
    let ea = make(&sa, &s1);
    let eb = make(&sb, &s2);
    store.replace_entries(None, None, vec![ea.clone(), eb.clone()]);

    let auth = AuthTokens::new(
        Some("root".into()),
        vec![
            ("tkn-a".into(), ta.id.clone()),
            ("tkn-b".into(), tb.id.clone()),
        ],
        Some("pupil".into()),
    );
    let app = api::router(AppState { store, auth });

    // Students cannot file requests.
    let (st, _) = send_json(
        &app,
        Method::POST,
        "/v1/swap-requests",
        Some("pupil"),
        Some(json!({"entryA": ea.id.0, "entryB": eb.id.0})),
    )
    .await;
    assert_eq!(st, StatusCode::FORBIDDEN);

    // A teacher naming somebody else as fromTeacher is refused outright.
    let (st, _) = send_json(
        &app,
        Method::POST,
        "/v1/swap-requests",
        Some("tkn-a"),
        Some(json!({"entryA": ea.id.0, "entryB": eb.id.0, "fromTeacher": tb.id.0})),
    )
    .await;
    assert_eq!(st, StatusCode::BAD_REQUEST);

    // Teacher A files against teacher B's entry.
    let (st, req) = send_json(
        &app,
        Method::POST,
        "/v1/swap-requests",
        Some("tkn-a"),
        Some(json!({"entryA": ea.id.0, "entryB": eb.id.0, "note": "trade"})),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED);
    assert_eq!(req["status"], "pending");
    assert_eq!(req["toTeacher"], tb.id.0);
    let req_id = req["id"].as_str().unwrap().to_string();

    // The requester cannot approve their own request.
    let (st, _) = send_json(
        &app,
        Method::POST,
        &format!("/v1/swap-requests/{req_id}/approve"),
        Some("tkn-a"),
        None,
    )
    .await;
    assert_eq!(st, StatusCode::FORBIDDEN);

    // The addressed teacher approves; the subjects change hands.
    let (st, decided) = send_json(
        &app,
        Method::POST,
        &format!("/v1/swap-requests/{req_id}/approve"),
        Some("tkn-b"),
        None,
    )
    .await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(decided["status"], "approved");

    let (_, entry) = send_json(
        &app,
        Method::GET,
        &format!("/v1/entries/{}", ea.id.0),
        Some("pupil"),
        None,
    )
    .await;
    assert_eq!(entry["subjectId"], sb.id.0);
    assert_eq!(entry["teacherId"], tb.id.0);

    // Approving twice conflicts.
    let (st, _) = send_json(
        &app,
        Method::POST,
        &format!("/v1/swap-requests/{req_id}/approve"),
        Some("root"),
        None,
    )
    .await;
    assert_eq!(st, StatusCode::CONFLICT);

    // Admin files on a teacher's behalf, naming them.
    let (st, _) = send_json(
        &app,
        Method::POST,
        "/v1/swap-requests",
        Some("root"),
        Some(json!({"entryA": ea.id.0, "entryB": eb.id.0})),
    )
    .await;
    assert_eq!(st, StatusCode::BAD_REQUEST);

    let (st, req2) = send_json(
        &app,
        Method::POST,
        "/v1/swap-requests",
        Some("root"),
        Some(json!({"entryA": ea.id.0, "entryB": eb.id.0, "fromTeacher": tb.id.0})),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED);

    // Rejection leaves entries alone.
    let req2_id = req2["id"].as_str().unwrap();
    let (st, rejected) = send_json(
        &app,
        Method::POST,
        &format!("/v1/swap-requests/{req2_id}/reject"),
        Some("root"),
        None,
    )
    .await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(rejected["status"], "rejected");
}

#[tokio::test]
async fn export_formats() {
    let app = open_app();
    seed_catalog(&app, None).await;
    let (_, _) = send_json(&app, Method::POST, "/v1/generate", None, Some(json!({}))).await;

    let req = Request::builder()
        .method(Method::GET)
        .uri("/v1/export/csv")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert!(resp.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("timetable.csv"));
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.starts_with("class,day,slot,start,end,subject,teacher,room"));
    assert!(text.contains("Maths"));

    let (st, body) = send(&app, Method::GET, "/v1/export/xlsx", None, None).await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(&body[..2], b"PK"); // zip container

    let (st, body) = send(&app, Method::GET, "/v1/export/pdf", None, None).await;
    assert_eq!(st, StatusCode::OK);
    assert!(body.starts_with(b"%PDF-1.4"));

    let (st, body) = send(&app, Method::GET, "/v1/export/html", None, None).await;
    assert_eq!(st, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("<table>"));

    let (st, _) = send_json(&app, Method::GET, "/v1/export/docx", None, None).await;
    assert_eq!(st, StatusCode::BAD_REQUEST);
}
