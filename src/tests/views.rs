use axum::http::StatusCode;
use uuid::Uuid;

use crate::tests::helper;

#[tokio::test]
async fn test_all_notes() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::sign_up(&mut app, "someone@example.com").await;

    let (status_code, view, _) = helper::view(&mut app, &access_token, "all").await;
    assert_eq!(StatusCode::OK, status_code);
    let view = view.unwrap();
    assert_eq!("All Notes".to_string(), view.title);
    assert!(view.notes.is_empty());

    let first = helper::create_note(&mut app, &access_token, "First", "# Heading\n*bold*").await;
    let second = helper::create_note(&mut app, &access_token, "Second", &"a".repeat(120)).await;

    let (_, view, _) = helper::view(&mut app, &access_token, "all").await;
    let view = view.unwrap();
    assert_eq!(
        vec![second.id, first.id],
        view.notes.iter().map(|note| note.id).collect::<Vec<Uuid>>()
    );
    assert_eq!(format!("{}...", "a".repeat(100)), view.notes[0].preview);
    assert_eq!(" Heading\nbold".to_string(), view.notes[1].preview);

    // saving moves a note to the top
    let (status_code, _, _) = helper::maybe_update_note(
        &mut app,
        &access_token,
        &first.id,
        "First, again",
        "",
        None,
        &[],
    )
    .await;
    assert_eq!(StatusCode::OK, status_code);

    let (_, view, _) = helper::view(&mut app, &access_token, "all").await;
    assert_eq!(first.id, view.unwrap().notes[0].id);
}

#[tokio::test]
async fn test_folder_view() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::sign_up(&mut app, "someone@example.com").await;

    let home = helper::create_named(&mut app, &access_token, "folders", "Home").await;

    let (_, note, _) = helper::maybe_create_note(
        &mut app,
        &access_token,
        "Groceries",
        "",
        Some(&home.id),
        &[],
    )
    .await;
    let note = note.unwrap();
    helper::create_note(&mut app, &access_token, "Elsewhere", "").await;

    let (status_code, view, _) =
        helper::view(&mut app, &access_token, &format!("folders/{}", home.id)).await;
    assert_eq!(StatusCode::OK, status_code);
    let view = view.unwrap();
    assert_eq!("Folder: Home".to_string(), view.title);
    assert_eq!(
        vec![note.id],
        view.notes.iter().map(|note| note.id).collect::<Vec<Uuid>>()
    );

    let (status_code, _, error) =
        helper::view(&mut app, &access_token, &format!("folders/{}", Uuid::new_v4())).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("Folder not found".to_string()), error);
}

#[tokio::test]
async fn test_tag_view() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::sign_up(&mut app, "someone@example.com").await;

    let errand = helper::create_named(&mut app, &access_token, "tags", "errand").await;
    let unused = helper::create_named(&mut app, &access_token, "tags", "unused").await;

    let (_, note, _) = helper::maybe_create_note(
        &mut app,
        &access_token,
        "Groceries",
        "",
        None,
        &[errand.id],
    )
    .await;
    let note = note.unwrap();
    helper::create_note(&mut app, &access_token, "Untagged", "").await;

    let (status_code, view, _) =
        helper::view(&mut app, &access_token, &format!("tags/{}", errand.id)).await;
    assert_eq!(StatusCode::OK, status_code);
    let view = view.unwrap();
    assert_eq!("Tag: errand".to_string(), view.title);
    assert_eq!(
        vec![note.id],
        view.notes.iter().map(|note| note.id).collect::<Vec<Uuid>>()
    );

    let (status_code, view, _) =
        helper::view(&mut app, &access_token, &format!("tags/{}", unused.id)).await;
    assert_eq!(StatusCode::OK, status_code);
    assert!(view.unwrap().notes.is_empty());

    let (status_code, _, error) =
        helper::view(&mut app, &access_token, &format!("tags/{}", Uuid::new_v4())).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("Tag not found".to_string()), error);

    let (status_code, _, error) = helper::view(&mut app, &access_token, "tags/errand").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Invalid path parameter".to_string()), error);
}

#[tokio::test]
async fn test_search_view() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::sign_up(&mut app, "someone@example.com").await;

    let in_title = helper::create_note(&mut app, &access_token, "Milk run", "").await;
    let in_content = helper::create_note(&mut app, &access_token, "Groceries", "eggs, MILK").await;
    helper::create_note(&mut app, &access_token, "Chores", "laundry").await;

    let (status_code, view, _) = helper::view(&mut app, &access_token, "search?q=milk").await;
    assert_eq!(StatusCode::OK, status_code);
    let view = view.unwrap();
    assert_eq!("Search results for \"milk\"".to_string(), view.title);

    let mut found = view.notes.iter().map(|note| note.id).collect::<Vec<Uuid>>();
    found.sort();
    let mut expected = vec![in_title.id, in_content.id];
    expected.sort();
    assert_eq!(expected, found);

    // wildcards are taken literally
    let (_, view, _) = helper::view(&mut app, &access_token, "search?q=%25").await;
    assert!(view.unwrap().notes.is_empty());

    // a blank search is no search
    let (_, view, _) = helper::view(&mut app, &access_token, "search?q=%20%20").await;
    let view = view.unwrap();
    assert_eq!("All Notes".to_string(), view.title);
    assert_eq!(3, view.notes.len());

    let (_, view, _) = helper::view(&mut app, &access_token, "search").await;
    assert_eq!("All Notes".to_string(), view.unwrap().title);
}
