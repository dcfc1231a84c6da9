//! Integration tests for the template store and composer

use referral_mail::error::{ReferralError, ValidationError};
use referral_mail::templates::{NewTemplate, SqliteTemplateStore, TemplateComposer, TemplateStore};

/// Helper to create an in-memory store for testing
async fn setup_test_store() -> SqliteTemplateStore {
    SqliteTemplateStore::connect("sqlite::memory:").await.unwrap()
}

fn referral_template(name: &str) -> NewTemplate {
    NewTemplate::new(
        name,
        "Referral for {role}",
        "<p>Hi {HRname}, could you refer me for {role} at {company}?</p>",
    )
}

#[tokio::test]
async fn test_create_template() {
    let store = setup_test_store().await;

    let template = store.create(referral_template("Referral ask")).await.unwrap();

    assert!(!template.id.is_empty());
    assert_eq!(template.name, "Referral ask");
    assert_eq!(template.subject, "Referral for {role}");
    assert_eq!(template.created_at, template.updated_at);
}

#[tokio::test]
async fn test_list_in_creation_order() {
    let store = setup_test_store().await;

    let first = store.create(referral_template("First")).await.unwrap();
    let second = store.create(referral_template("Second")).await.unwrap();
    let third = store.create(referral_template("Third")).await.unwrap();

    let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
}

#[tokio::test]
async fn test_create_rejects_blank_fields() {
    let store = setup_test_store().await;

    for (template, field) in [
        (NewTemplate::new("", "S", "B"), "name"),
        (NewTemplate::new("N", "   ", "B"), "subject"),
        (NewTemplate::new("N", "S", ""), "body"),
    ] {
        let err = store.create(template).await.unwrap_err();
        assert!(matches!(
            err,
            ReferralError::Validation(ValidationError::EmptyField(f)) if f == field
        ));
    }

    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_template() {
    let store = setup_test_store().await;
    let kept = store.create(referral_template("Kept")).await.unwrap();
    let removed = store.create(referral_template("Removed")).await.unwrap();

    store.delete(&removed.id).await.unwrap();

    let remaining = store.list().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, kept.id);
    assert!(store.get(&removed.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_unknown_template_changes_nothing() {
    let store = setup_test_store().await;
    store.create(referral_template("Only")).await.unwrap();

    let err = store.delete("no-such-id").await.unwrap_err();

    assert!(matches!(err, ReferralError::NotFound(_)));
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_replace_template() {
    let store = setup_test_store().await;
    let created = store.create(referral_template("Draft")).await.unwrap();

    let replaced = store
        .replace(&created.id, NewTemplate::new("Final", "Hello {HRname}", "<p>Body</p>"))
        .await
        .unwrap();

    assert_eq!(replaced.id, created.id);
    assert_eq!(replaced.name, "Final");
    assert_eq!(replaced.created_at, created.created_at);
    assert!(replaced.updated_at >= created.updated_at);

    let fetched = store.get(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched, replaced);
}

#[tokio::test]
async fn test_templates_persist_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("referral.db").display());

    let created = {
        let store = SqliteTemplateStore::connect(&url).await.unwrap();
        store.create(referral_template("Persisted")).await.unwrap()
    };

    let store = SqliteTemplateStore::connect(&url).await.unwrap();
    let templates = store.list().await.unwrap();

    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].id, created.id);
}

#[tokio::test]
async fn test_composer_create_then_edit() {
    let store = setup_test_store().await;

    let mut composer = TemplateComposer::new();
    composer.set_name("  Referral ask  ");
    composer.set_subject("Referral for {role}");
    composer.set_body("<p>Hi {HRname}</p>");
    let created = composer.save(&store).await.unwrap();

    assert_eq!(created.name, "Referral ask");
    assert!(composer.name().is_empty());

    let mut editor = TemplateComposer::edit(&created);
    editor.set_body("<p>Hello {HRname}</p>");
    let edited = editor.save(&store).await.unwrap();

    assert_eq!(edited.id, created.id);
    assert_eq!(store.list().await.unwrap().len(), 1);
    assert_eq!(edited.body, "<p>Hello {HRname}</p>");
}

#[tokio::test]
async fn test_composer_rejects_empty_editor_document() {
    let store = setup_test_store().await;

    let mut composer = TemplateComposer::new();
    composer.set_name("Referral ask");
    composer.set_subject("Referral");
    composer.set_body("<p></p>");

    let err = composer.save(&store).await.unwrap_err();

    assert!(matches!(
        err,
        ReferralError::Validation(ValidationError::EmptyField("body"))
    ));
    assert!(store.list().await.unwrap().is_empty());
}
