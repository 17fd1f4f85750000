//! Client against a live server on an ephemeral port

use events_client::pages::{
    CreateEventPage, EventDetailsPage, EventListPage, LoginPage, SignupPage, UpdateEventPage,
};
use events_client::{connect, ApiClient, ClientError, FormState, Route, SessionStore, REDIRECT_DELAY};
use events_common::{EventPatch, NewEvent, SignupRequest};
use server::{AppState, ServerConfig};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};

struct LiveServer {
    _dir: TempDir,
    url: String,
}

async fn start_server() -> LiveServer {
    let dir = TempDir::new().unwrap();
    let mut config = ServerConfig::with_base_dir(dir.path());
    config.bcrypt_cost = 4;
    let state = AppState::new(config).await.unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, state));

    LiveServer {
        _dir: dir,
        url: format!("http://{}", addr),
    }
}

#[tokio::test]
async fn test_event_pages_against_server() {
    let live = start_server().await;
    let api = ApiClient::new(&live.url).unwrap();

    let mut create = CreateEventPage::new();
    create.form.name = "Rust Meetup".into();
    create.form.date = "2025-09-12".into();
    create.form.location = "Library".into();
    let redirect = create.submit(&api).await.unwrap();
    assert_eq!(redirect.to, Route::Home);
    assert_eq!(redirect.after, REDIRECT_DELAY);
    assert_eq!(
        create.state,
        FormState::Success("Event created successfully!".into())
    );

    let mut list = EventListPage::new();
    list.load(&api).await;
    let events = list.state.ready().unwrap().clone();
    assert_eq!(events.len(), 1);
    let id = events[0].id.clone();

    let mut update = UpdateEventPage::new(&id);
    update.load(&api).await;
    assert_eq!(update.form.date, "2025-09-12");
    update.form.location = String::new();
    update.form.description = "Lightning talks".into();
    assert!(update.submit(&api).await.is_some());
    let updated = update.loaded.ready().unwrap();
    assert_eq!(updated.location, None);
    assert_eq!(updated.description.as_deref(), Some("Lightning talks"));

    list.search(&api, "lightning").await;
    assert_eq!(list.state.ready().unwrap().len(), 1);

    let mut details = EventDetailsPage::new(&id);
    details.load(&api).await;
    details
        .add_attendee(&api, "Ada", "ada@example.com")
        .await;
    assert_eq!(details.state.ready().unwrap().attendees.len(), 1);

    details
        .add_attendee(&api, "Ada again", "ADA@example.com")
        .await;
    assert!(matches!(details.action, FormState::Error(_)));

    let summary = details.send_reminder(&api).await.unwrap();
    assert_eq!((summary.attempted, summary.sent), (1, 1));

    let redirect = details.delete(&api).await.unwrap();
    assert_eq!(redirect.to, Route::Home);

    let mut gone = EventDetailsPage::new(&id);
    gone.load(&api).await;
    assert!(gone.state.error().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_update_without_date_keeps_time_of_day() {
    let live = start_server().await;
    let api = ApiClient::new(&live.url).unwrap();

    let created = assert_ok!(
        api.create_event(&NewEvent {
            name: Some("Evening talk".into()),
            date: Some("2025-09-12T18:30:00Z".into()),
            ..Default::default()
        })
        .await
    );

    let mut update = UpdateEventPage::new(&created.id);
    update.load(&api).await;
    update.apply(EventPatch {
        location: Some("Main hall".into()),
        ..Default::default()
    });
    assert!(update.submit(&api).await.is_some());

    let stored = assert_ok!(api.get_event(&created.id).await);
    assert_eq!(stored.date, created.date);
    assert_eq!(stored.location.as_deref(), Some("Main hall"));
}

#[tokio::test]
async fn test_server_message_reaches_user() {
    let live = start_server().await;
    let api = ApiClient::new(&live.url).unwrap();

    let err = assert_err!(
        api.create_event(&NewEvent {
            name: Some("No date".into()),
            ..Default::default()
        })
        .await
    );
    assert_eq!(err.status(), Some(400));
    assert!(!err.to_string().starts_with("Failed to create event"));

    let err = assert_err!(api.get_event("missing").await);
    assert!(matches!(err, ClientError::Api { status: 404, .. }));
}

#[tokio::test]
async fn test_signup_login_logout_session() {
    let live = start_server().await;
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    let mut api = connect(&live.url, &store).unwrap();
    assert_eq!(api.token(), None);

    let mut signup = SignupPage {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        password: "hunter22".into(),
        ..Default::default()
    };
    let redirect = signup.submit(&mut api, &store).await.unwrap();
    assert_eq!(redirect.to, Route::Home);
    assert!(redirect.after.is_zero());
    assert!(store.is_authenticated());

    let me = assert_ok!(api.me().await);
    assert_eq!(me.email, "ada@example.com");

    let duplicate = api
        .signup(&SignupRequest {
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            password: Some("other".into()),
        })
        .await;
    assert_eq!(assert_err!(duplicate).status(), Some(409));

    events_client::pages::logout(&mut api, &store);
    assert!(!store.is_authenticated());
    assert_eq!(assert_err!(api.me().await).status(), Some(401));

    let mut login = LoginPage {
        email: "ada@example.com".into(),
        password: "wrong".into(),
        ..Default::default()
    };
    assert!(login.submit(&mut api, &store).await.is_none());
    assert_eq!(login.state.message(), Some("Invalid email or password"));

    login.password = "hunter22".into();
    assert!(login.submit(&mut api, &store).await.is_some());

    // A fresh client picks the cached token back up
    let api = connect(&live.url, &store).unwrap();
    assert_eq!(assert_ok!(api.me().await).id, me.id);
}
