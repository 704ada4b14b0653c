mod helpers;

use std::io::Cursor;

use helpers::{load_app, memory_store, ADMIN};
use mindstream::config::ImageConfig;
use mindstream::journal::{App, View};
use mindstream::shell::{self, ShellOptions};
use mindstream::storage::KeyValueStore;
use serde_json::json;
use tempfile::TempDir;

fn options() -> ShellOptions {
    ShellOptions {
        images: ImageConfig::default(),
        color: false,
    }
}

async fn drive(app: &mut App, script: &str) -> String {
    let mut out = Vec::new();
    shell::run(app, &options(), Cursor::new(script.to_string()), &mut out)
        .await
        .unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn landing_requires_a_choice() {
    let mut app = load_app(memory_store()).await;
    let out = drive(&mut app, "list\n").await;

    assert!(out.starts_with("MindStream\nDocument your journey.\n"));
    assert!(out.contains("Log in, register, or continue as visitor first."));
    assert_eq!(app.view(), View::Landing);
}

#[tokio::test]
async fn visitor_sees_empty_state_and_cannot_author() {
    let mut app = load_app(memory_store()).await;
    let out = drive(&mut app, "visitor\nadd hello\n").await;

    assert!(out.contains("The author hasn't posted anything yet."));
    assert!(out.contains("Only the author can do that."));
    assert!(app.thoughts().is_empty());
}

#[tokio::test]
async fn author_session_round_trip() {
    let store = memory_store();
    let mut app = load_app(store.clone()).await;

    let script = format!("login {ADMIN}\nadd first entry\nadd second entry\nlist\n");
    let out = drive(&mut app, &script).await;

    assert!(out.contains("Welcome, Leslie."));
    assert!(out.contains("Nothing here yet. Log a thought to clear your mind."));
    assert_eq!(out.matches("Logged [").count(), 2);
    let first = out.find("  second entry").unwrap();
    let second = out.rfind("  first entry").unwrap();
    assert!(first < second);
    assert_eq!(app.thoughts().len(), 2);
    assert_eq!(store.get("user"), Some(json!(ADMIN)));
}

#[tokio::test]
async fn author_edits_and_deletes_by_prefix() {
    let mut app = load_app(memory_store()).await;
    drive(&mut app, &format!("login {ADMIN}\nadd original\n")).await;
    let id = app.thoughts()[0].short_id().to_string();

    let out = drive(&mut app, &format!("edit {id} changed\nedit {id}\n")).await;
    assert!(out.contains("Saved."));
    assert!(out.contains("Nothing saved: the new text is empty."));
    assert_eq!(app.thoughts()[0].content, "changed");

    let out = drive(&mut app, &format!("delete {id}\n")).await;
    assert!(out.contains(&format!("Deleted [{id}]")));
    assert!(app.thoughts().is_empty());
}

#[tokio::test]
async fn form_errors_are_printed() {
    let mut app = load_app(memory_store()).await;
    let out = drive(&mut app, "login Bob\nregister\nregister Bob\nregister bob\n").await;

    assert!(out.contains("User not registered."));
    assert!(out.contains("Please enter a name."));
    assert!(out.contains("Welcome, Bob."));
    assert!(out.contains("Username already taken."));
}

#[tokio::test]
async fn members_read_but_do_not_write() {
    let store = memory_store();
    store.set(
        "thoughts",
        json!([{"id": "abcdef12-0000", "content": "public entry", "timestamp": 1}]),
    );
    let mut app = load_app(store).await;

    let out = drive(&mut app, "register Alice\ndelete abcdef12\nwhoami\n").await;
    assert!(out.contains("  public entry"));
    // Ids are only shown to the author.
    assert!(!out.contains("[abcdef12"));
    assert!(out.contains("Only the author can do that."));
    assert!(out.contains("Alice (Member)"));
    assert_eq!(app.thoughts().len(), 1);
}

#[tokio::test]
async fn theme_toggles_and_logout_returns_to_landing() {
    let mut app = load_app(memory_store()).await;
    let out = drive(&mut app, "theme\nvisitor\nlogout\nbogus\nquit\nlist\n").await;

    assert!(out.contains("Theme: light"));
    assert!(out.contains("Log in, register, or continue as visitor first."));
    assert_eq!(app.view(), View::Landing);
    assert!(!out.contains("Unknown command"));
}

#[tokio::test]
async fn unknown_commands_are_reported_after_login() {
    let mut app = load_app(memory_store()).await;
    let out = drive(&mut app, "visitor\nfrobnicate\n").await;
    assert!(out.contains("Unknown command: frobnicate. Type help."));
}

fn write_png(dir: &TempDir) -> String {
    let path = dir.path().join("photo.png");
    image::RgbImage::from_pixel(64, 32, image::Rgb([200, 120, 40]))
        .save(&path)
        .unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn attached_image_goes_to_the_next_thought_only() {
    let tmp = TempDir::new().unwrap();
    let png = write_png(&tmp);
    let mut app = load_app(memory_store()).await;

    let script = format!("login {ADMIN}\nattach {png}\nadd with pic\nadd no pic\n");
    let out = drive(&mut app, &script).await;

    assert!(out.contains("Image attached to the next thought."));
    assert_eq!(out.matches("Logged [").count(), 2);

    let thoughts = app.thoughts();
    assert_eq!(thoughts[1].content, "with pic");
    assert!(thoughts[1]
        .image
        .as_deref()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
    assert_eq!(thoughts[0].content, "no pic");
    assert!(thoughts[0].image.is_none());
}

#[tokio::test]
async fn detach_clears_the_pending_image() {
    let tmp = TempDir::new().unwrap();
    let png = write_png(&tmp);
    let mut app = load_app(memory_store()).await;

    let script = format!("login {ADMIN}\nattach {png}\ndetach\nadd text only\n");
    let out = drive(&mut app, &script).await;

    assert!(out.contains("Image cleared."));
    assert_eq!(app.thoughts().len(), 1);
    assert!(app.thoughts()[0].image.is_none());
}

#[tokio::test]
async fn unreadable_attachment_is_reported_and_ignored() {
    let mut app = load_app(memory_store()).await;

    let script = format!("login {ADMIN}\nattach /nonexistent/photo.png\nadd after failure\n");
    let out = drive(&mut app, &script).await;

    assert!(out.contains("failed to read image /nonexistent/photo.png"));
    assert!(!out.contains("Image attached"));
    assert_eq!(app.thoughts().len(), 1);
    assert!(app.thoughts()[0].image.is_none());
}

#[tokio::test]
async fn only_the_author_can_attach() {
    let tmp = TempDir::new().unwrap();
    let png = write_png(&tmp);
    let mut app = load_app(memory_store()).await;

    let out = drive(&mut app, &format!("visitor\nattach {png}\n")).await;
    assert!(out.contains("Only the author can do that."));
    assert!(!out.contains("Image attached"));
}
