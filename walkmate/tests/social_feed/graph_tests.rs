use super::support::*;

#[tokio::test]
async fn follow_and_unfollow_are_idempotent() {
    let world = World::new();
    let ann = world.walker("Ann").await;
    let bob = world.walker("Bob").await;
    world.sign_in("Ann").await;

    assert!(!world.service.is_following(&bob).await);
    assert!(world.service.follow(&bob).await);
    assert!(world.service.follow(&bob).await);
    assert!(world.service.is_following(&bob).await);
    assert_eq!(world.service.count_following(Some(&ann)).await, 1);
    assert_eq!(world.service.count_followers(Some(&bob)).await, 1);

    assert!(world.service.unfollow(&bob).await);
    assert!(world.service.unfollow(&bob).await);
    assert!(!world.service.is_following(&bob).await);
    assert_eq!(world.service.count_followers(Some(&bob)).await, 0);
}

#[tokio::test]
async fn follow_edges_are_directed() {
    let world = World::new();
    let ann = world.walker("Ann").await;
    let bob = world.walker("Bob").await;
    world.sign_in("Ann").await;
    world.service.follow(&bob).await;

    world.sign_in("Bob").await;
    assert!(!world.service.is_following(&ann).await);
    assert_eq!(world.service.count_following(None).await, 0);
    assert_eq!(world.service.count_followers(None).await, 1);
}

#[tokio::test]
async fn counts_match_the_follow_graph() {
    let world = World::new();
    let ann = world.walker("Ann").await;
    let bob = world.walker("Bob").await;
    let cat = world.walker("Cat").await;

    world.sign_in("Ann").await;
    world.service.follow(&bob).await;
    world.service.follow(&cat).await;
    world.sign_in("Bob").await;
    world.service.follow(&cat).await;
    world.share("bob walk", 1).await;

    let ann_stats = world.service.user_stats(Some(&ann)).await;
    assert_eq!((ann_stats.followers, ann_stats.following, ann_stats.posts), (0, 2, 0));
    let cat_stats = world.service.user_stats(Some(&cat)).await;
    assert_eq!((cat_stats.followers, cat_stats.following), (2, 0));
    let bob_stats = world.service.user_stats(None).await;
    assert_eq!((bob_stats.followers, bob_stats.following, bob_stats.posts), (1, 1, 1));
}

#[tokio::test]
async fn cannot_follow_yourself() {
    let world = World::new();
    let ann = world.walker("Ann").await;
    world.sign_in("Ann").await;

    assert!(!world.service.follow(&ann).await);
    assert!(matches!(
        world.service.try_follow(&ann).await,
        Err(WalkError::ValidationFailed(_))
    ));
    assert_eq!(world.service.count_following(None).await, 0);
}

#[tokio::test]
async fn unfollowing_a_non_followed_user_succeeds() {
    let world = World::new();
    let ann = world.walker("Ann").await;
    let bob = world.walker("Bob").await;
    world.sign_in("Ann").await;

    assert!(!world.service.is_following(&ann).await);
    assert!(world.service.unfollow(&ann).await);
    assert!(!world.service.is_following(&ann).await);

    assert!(world.service.unfollow(&bob).await);
    assert!(!world.service.is_following(&bob).await);
    assert!(matches!(
        world.service.try_unfollow(" ").await,
        Err(WalkError::ValidationFailed(_))
    ));
}

#[tokio::test]
async fn graph_operations_need_a_session() {
    let world = World::new();
    let bob = world.walker("Bob").await;

    assert!(!world.service.follow(&bob).await);
    assert!(!world.service.unfollow(&bob).await);
    assert!(!world.service.is_following(&bob).await);
    assert_eq!(world.service.count_followers(Some(&bob)).await, 0);
    assert!(matches!(
        world.service.try_count_followers(Some(&bob)).await,
        Err(WalkError::NoActiveSession)
    ));
}

#[tokio::test]
async fn outage_maps_to_sentinels() {
    let world = World::new();
    world.walker("Ann").await;
    let bob = world.walker("Bob").await;
    world.sign_in("Ann").await;
    world.service.follow(&bob).await;

    world.store.set_available(false);
    assert!(!world.service.is_following(&bob).await);
    assert!(!world.service.unfollow(&bob).await);
    assert_eq!(world.service.count_following(None).await, 0);

    world.store.set_available(true);
    assert!(world.service.is_following(&bob).await);
}
