use super::support::*;

#[tokio::test]
async fn created_posts_come_back_from_list_posts() {
    let world = World::new();
    let ann = world.walker("Ann").await;
    world.sign_in("Ann").await;

    let draft = Post::draft("Retiro loop", &ann, madrid());
    assert!(world.service.create_post(draft.clone()).await);

    let posts = world.service.list_posts(None).await.expect("posts");
    assert_eq!(posts.len(), 1);
    assert!(posts[0].same_content(&draft));
    assert!(!posts[0].id.is_empty());
}

#[tokio::test]
async fn creator_defaults_to_the_session_user() {
    let world = World::new();
    let ann = world.walker("Ann").await;
    world.sign_in("Ann").await;

    let post = world.share("untitled creator", 1).await;
    assert_eq!(post.creator_id, ann);
}

#[tokio::test]
async fn posts_for_someone_else_are_rejected() {
    let world = World::new();
    world.walker("Ann").await;
    let bob = world.walker("Bob").await;
    world.sign_in("Ann").await;

    let result = world.service.try_create_post(Post::draft("impostor", bob, madrid())).await;
    assert!(matches!(result, Err(WalkError::Forbidden { .. })));
}

#[tokio::test]
async fn invalid_posts_are_not_written() {
    let world = World::new();
    world.walker("Ann").await;
    world.sign_in("Ann").await;

    assert!(!world.service.create_post(Post::draft("  ", "", madrid())).await);
    assert!(!world.service.create_post(Post::draft("Pole", "", GeoPoint::new(91.0, 0.0))).await);
    assert_eq!(world.store.len(Post::COLLECTION).await, 0);
}

#[tokio::test]
async fn list_posts_is_newest_first_and_per_user() {
    let world = World::new();
    world.walker("Ann").await;
    let bob = world.walker("Bob").await;
    world.sign_in("Bob").await;
    world.share("first", 20).await;
    world.share("second", 10).await;
    world.sign_in("Ann").await;
    world.share("ann's", 5).await;

    let bobs = world.service.list_posts(Some(&bob)).await.unwrap();
    assert_eq!(titles(&bobs), vec!["second", "first"]);
    assert_eq!(titles(&world.service.list_posts(None).await.unwrap()), vec!["ann's"]);
}

#[tokio::test]
async fn deleted_posts_disappear() {
    let world = World::new();
    world.walker("Ann").await;
    world.sign_in("Ann").await;
    let keep = world.share("keep", 2).await;
    let remove = world.share("remove", 1).await;

    assert!(world.service.delete_post(&remove).await);
    assert_eq!(world.service.list_posts(None).await.unwrap(), vec![keep]);
    assert!(world.service.delete_post(&remove).await);
}

#[tokio::test]
async fn cannot_delete_someone_elses_post() {
    let world = World::new();
    world.walker("Ann").await;
    let bob = world.walker("Bob").await;
    world.sign_in("Bob").await;
    let post = world.share("bob's", 1).await;

    world.sign_in("Ann").await;
    assert!(!world.service.delete_post(&post).await);
    assert!(matches!(
        world.service.try_delete_post(&post).await,
        Err(WalkError::Forbidden { .. })
    ));
    assert_eq!(world.service.list_posts(Some(&bob)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn posts_need_a_session() {
    let world = World::new();
    let ann = world.walker("Ann").await;

    assert!(!world.service.create_post(Post::draft("walk", ann.clone(), madrid())).await);
    assert_eq!(world.service.list_posts(Some(&ann)).await, None);
}
