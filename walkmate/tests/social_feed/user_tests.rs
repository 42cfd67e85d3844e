use super::support::*;

#[tokio::test]
async fn sign_up_creates_a_searchable_profile() {
    let world = World::new();
    let ann = world.walker("Ann").await;

    let user = world.service.resolve_user(Some(&ann)).await.expect("profile");
    assert_eq!(user.name, "Ann");
    assert_eq!(user.search_keywords, vec!["a", "an", "ann"]);
    assert!(!world.service.is_session_active());
}

#[tokio::test]
async fn resolve_user_defaults_to_the_session() {
    let world = World::new();
    let ann = world.walker("Ann").await;
    assert_eq!(world.service.resolve_user(None).await, None);

    world.sign_in("Ann").await;
    assert_eq!(world.service.current_user_id(), Some(ann.clone()));
    assert_eq!(world.service.resolve_user(None).await.map(|user| user.id), Some(ann));
    assert_eq!(world.service.resolve_user(Some("missing")).await, None);
}

#[tokio::test]
async fn duplicate_emails_are_rejected() {
    let world = World::new();
    world.walker("Ann").await;
    let again = world
        .service
        .create_user("ANN@example.com", PASSWORD, User::new("Ann Two"))
        .await;
    assert_eq!(again, None);
    assert_eq!(world.store.len(User::COLLECTION).await, 1);
}

#[tokio::test]
async fn wrong_passwords_do_not_open_a_session() {
    let world = World::new();
    world.walker("Ann").await;
    assert!(!world.service.authenticate(&email("Ann"), "not-the-password").await);
    assert!(!world.service.is_session_active());
}

#[tokio::test]
async fn log_out_ends_the_session() {
    let world = World::new();
    world.walker("Ann").await;
    world.sign_in("Ann").await;
    assert!(world.service.log_out().await);
    assert_eq!(world.service.current_user_id(), None);
}

#[tokio::test]
async fn search_matches_name_prefixes_case_insensitively() {
    let world = World::new();
    let ann = world.walker("Ann").await;
    let andy = world.walker("Andy").await;
    world.walker("Bob").await;
    world.walker("Dana").await;
    world.sign_in("Bob").await;

    let mut found: Vec<String> = world.service.search_users("AN").await.into_iter().map(|u| u.id).collect();
    found.sort();
    let mut expected = vec![ann, andy];
    expected.sort();
    assert_eq!(found, expected);

    assert!(world.service.search_users("").await.is_empty());
    assert!(world.service.search_users("zz").await.is_empty());
}

#[tokio::test]
async fn search_other_users_leaves_out_the_session_user() {
    let world = World::new();
    world.walker("Ann").await;
    let andy = world.walker("Andy").await;
    world.sign_in("Ann").await;

    let others: Vec<String> = world.service.search_other_users("an").await.into_iter().map(|u| u.id).collect();
    assert_eq!(others, vec![andy]);
}

#[tokio::test]
async fn saved_tokens_resume_in_a_new_process() {
    let world = World::new();
    let ann = world.walker("Ann").await;
    world.sign_in("Ann").await;
    let token = world.service.identity().session().token().map(str::to_string).expect("token");

    let later = Service::new(
        world.store.clone(),
        StoreIdentity::new(world.store.clone()),
        FeedSettings::default(),
    );
    assert_eq!(later.try_resume_session(&token).await.unwrap(), ann);
    assert!(later.is_session_active());
}
